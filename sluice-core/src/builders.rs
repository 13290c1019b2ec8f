use crate::{
    AsValue, BuilderData, Capability, Command, CommandKind, DbContext, DbType, Entity,
    EntityFields, Paging, Parameter, Result, RowLabeled, Value, value_fields,
};
use std::marker::PhantomData;

/// Adds the top level value fields of `entity` through `add`, skipping the `ignore` ones.
fn auto_map(
    entity: &dyn EntityFields,
    ignore: &[&str],
    mut add: impl FnMut(&'static str, Value) -> Result<()>,
) -> Result<()> {
    for (name, value) in value_fields(entity) {
        if ignore.iter().any(|v| v.eq_ignore_ascii_case(name)) {
            continue;
        }
        add(name, value)?;
    }
    Ok(())
}

/// Select statement mapped into `T`.
///
/// ```rust,ignore
/// let products: Vec<Product> = context
///     .select::<Product>("p.*, c.Name as Category_Name")
///     .from("Product p inner join Category c on c.CategoryId = p.CategoryId")
///     .where_sql("p.CategoryId = @CategoryId")
///     .parameter("CategoryId", 1)?
///     .order_by("p.Name")
///     .paging(1, 10)
///     .query()?;
/// ```
pub struct SelectBuilder<'c, T> {
    context: &'c mut DbContext,
    data: BuilderData,
    entity: PhantomData<T>,
}

impl<'c, T: Entity> SelectBuilder<'c, T> {
    pub(crate) fn new(context: &'c mut DbContext, select: String) -> Self {
        Self {
            context,
            data: BuilderData {
                select,
                ..Default::default()
            },
            entity: PhantomData,
        }
    }
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.data.from = from.into();
        self
    }
    pub fn where_sql(mut self, condition: impl Into<String>) -> Self {
        self.data.where_sql = condition.into();
        self
    }
    pub fn group_by(mut self, group_by: impl Into<String>) -> Self {
        self.data.group_by = group_by.into();
        self
    }
    pub fn having(mut self, having: impl Into<String>) -> Self {
        self.data.having = having.into();
        self
    }
    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.data.order_by = order_by.into();
        self
    }
    /// One based page number.
    pub fn paging(mut self, current_page: u64, items_per_page: u64) -> Self {
        self.data.paging = Some(Paging::new(current_page, items_per_page));
        self
    }
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        self.data.parameters.push(Parameter::new(name, value))?;
        Ok(self)
    }
    pub fn parameters<I>(mut self, values: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        for value in values {
            self.data.parameters.push_unnamed(value.into())?;
        }
        Ok(self)
    }
    pub fn data(&self) -> &BuilderData {
        &self.data
    }
    pub fn into_command(self) -> Command<'c> {
        let mut sql = String::with_capacity(128);
        self.context.dialect().write_select(&mut sql, &self.data);
        Command::new(self.context, sql, CommandKind::Text, self.data.parameters)
    }
    pub fn query(self) -> Result<Vec<T>> {
        self.into_command().query_as()
    }
    pub fn query_single(self) -> Result<Option<T>> {
        self.into_command().query_single_as()
    }
    pub fn query_rows(self) -> Result<Vec<RowLabeled>> {
        self.into_command().query()
    }
}

pub struct InsertBuilder<'c> {
    context: &'c mut DbContext,
    data: BuilderData,
}

impl<'c> InsertBuilder<'c> {
    pub(crate) fn new(context: &'c mut DbContext, table: String) -> Self {
        Self {
            context,
            data: BuilderData::new(table),
        }
    }
    pub fn column(mut self, column: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        self.data.column(column, value.into())?;
        Ok(self)
    }
    /// Adds a column for each value field of `entity`, except the `ignore` ones.
    pub fn auto_map(mut self, entity: &dyn EntityFields, ignore: &[&str]) -> Result<Self> {
        auto_map(entity, ignore, |name, value| self.data.column(name, value))?;
        Ok(self)
    }
    pub fn data(&self) -> &BuilderData {
        &self.data
    }
    pub fn into_command(self) -> Command<'c> {
        let mut sql = String::with_capacity(128);
        self.context.dialect().write_insert(&mut sql, &self.data);
        Command::new(self.context, sql, CommandKind::Text, self.data.parameters)
    }
    pub fn execute(self) -> Result<u64> {
        self.into_command().execute()
    }
    pub fn execute_return_last_id<T: AsValue>(self, identity_column: Option<&str>) -> Result<T> {
        self.into_command().execute_return_last_id(identity_column)
    }
}

/// Update statement, the parameters are named after the columns so a column cannot be both set
/// and used in a predicate.
pub struct UpdateBuilder<'c> {
    context: &'c mut DbContext,
    data: BuilderData,
}

impl<'c> UpdateBuilder<'c> {
    pub(crate) fn new(context: &'c mut DbContext, table: String) -> Self {
        Self {
            context,
            data: BuilderData::new(table),
        }
    }
    pub fn column(mut self, column: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        self.data.column(column, value.into())?;
        Ok(self)
    }
    pub fn where_column(
        mut self,
        column: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self> {
        self.data.where_column(column, value.into())?;
        Ok(self)
    }
    pub fn auto_map(mut self, entity: &dyn EntityFields, ignore: &[&str]) -> Result<Self> {
        auto_map(entity, ignore, |name, value| self.data.column(name, value))?;
        Ok(self)
    }
    pub fn data(&self) -> &BuilderData {
        &self.data
    }
    pub fn into_command(self) -> Command<'c> {
        let mut sql = String::with_capacity(128);
        self.context.dialect().write_update(&mut sql, &self.data);
        Command::new(self.context, sql, CommandKind::Text, self.data.parameters)
    }
    pub fn execute(self) -> Result<u64> {
        self.into_command().execute()
    }
}

pub struct DeleteBuilder<'c> {
    context: &'c mut DbContext,
    data: BuilderData,
}

impl<'c> DeleteBuilder<'c> {
    pub(crate) fn new(context: &'c mut DbContext, table: String) -> Self {
        Self {
            context,
            data: BuilderData::new(table),
        }
    }
    pub fn where_column(
        mut self,
        column: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self> {
        self.data.where_column(column, value.into())?;
        Ok(self)
    }
    pub fn data(&self) -> &BuilderData {
        &self.data
    }
    pub fn into_command(self) -> Command<'c> {
        let mut sql = String::with_capacity(64);
        self.context.dialect().write_delete(&mut sql, &self.data);
        Command::new(self.context, sql, CommandKind::Text, self.data.parameters)
    }
    pub fn execute(self) -> Result<u64> {
        self.into_command().execute()
    }
}

/// Stored procedure call.
///
/// The command is returned by [`StoredProcedureBuilder::into_command`] when output parameters
/// need to be read after the execution.
pub struct StoredProcedureBuilder<'c> {
    context: &'c mut DbContext,
    data: BuilderData,
    multi_result: bool,
}

impl<'c> StoredProcedureBuilder<'c> {
    pub(crate) fn new(context: &'c mut DbContext, name: String) -> Self {
        Self {
            context,
            data: BuilderData::new(name),
            multi_result: false,
        }
    }
    pub(crate) fn multi_result(mut self) -> Self {
        self.multi_result = true;
        self
    }
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        self.data.parameters.push(Parameter::new(name, value))?;
        Ok(self)
    }
    pub fn parameter_out(
        mut self,
        name: impl Into<String>,
        db_type: DbType,
        size: Option<u32>,
    ) -> Result<Self> {
        self.data
            .parameters
            .push(Parameter::output(name, db_type, size))?;
        Ok(self)
    }
    /// Adds a parameter for each value field of `entity`, except the `ignore` ones.
    pub fn auto_map(mut self, entity: &dyn EntityFields, ignore: &[&str]) -> Result<Self> {
        auto_map(entity, ignore, |name, value| {
            self.data.parameters.push(Parameter::new(name, value))
        })?;
        Ok(self)
    }
    pub fn data(&self) -> &BuilderData {
        &self.data
    }
    pub fn into_command(self) -> Result<Command<'c>> {
        let dialect = self.context.dialect();
        if let Err(e) = dialect.require(Capability::StoredProcedures) {
            return Err(self.context.fail(e, &self.data.object_name, &[]));
        }
        let mut sql = String::with_capacity(64);
        let kind = dialect.write_stored_procedure(&mut sql, &self.data);
        let command = Command::new(self.context, sql, kind, self.data.parameters);
        Ok(if self.multi_result {
            command.multi_result()
        } else {
            command
        })
    }
    pub fn execute(self) -> Result<u64> {
        self.into_command()?.execute()
    }
    pub fn query(self) -> Result<Vec<RowLabeled>> {
        self.into_command()?.query()
    }
    pub fn query_as<T: Entity>(self) -> Result<Vec<T>> {
        self.into_command()?.query_as()
    }
}
