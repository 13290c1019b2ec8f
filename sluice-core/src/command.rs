use crate::{
    AsValue, Capability, ColumnMap, CommandKind, DbContext, DbType, Entity, Error,
    IdentityRetrieval, Parameter, Parameters, Result, ResultSet, RowLabeled, Statement, Value,
};
use std::collections::VecDeque;

/// Statement bound to a unit of work, ready to be executed.
///
/// ```rust,ignore
/// let product: Option<Product> = context
///     .sql("select * from Product where ProductId = @0")
///     .parameters(params![1])?
///     .query_single_as()?;
/// ```
pub struct Command<'c> {
    context: &'c mut DbContext,
    sql: String,
    kind: CommandKind,
    parameters: Parameters,
    multi_result: bool,
    /// Result sets not yet read, multi result commands only.
    pending: Option<VecDeque<ResultSet>>,
    /// Last executed statement, holds the output parameter values.
    last: Option<Statement>,
}

impl<'c> Command<'c> {
    pub(crate) fn new(
        context: &'c mut DbContext,
        sql: String,
        kind: CommandKind,
        parameters: Parameters,
    ) -> Self {
        Self {
            context,
            sql,
            kind,
            parameters,
            multi_result: false,
            pending: None,
            last: None,
        }
    }

    pub(crate) fn multi_result(mut self) -> Self {
        self.multi_result = true;
        self
    }

    pub fn sql_text(&self) -> &str {
        &self.sql
    }

    pub fn command_type(mut self, kind: CommandKind) -> Self {
        self.kind = kind;
        self
    }

    /// Adds the parameter referenced as `@name`.
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        self.parameters.push(Parameter::new(name, value))?;
        Ok(self)
    }

    /// Adds unnamed parameters, the first one ever added is referenced as `@0`.
    pub fn parameters<I>(mut self, values: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        for value in values {
            self.parameters.push_unnamed(value.into())?;
        }
        Ok(self)
    }

    pub fn parameter_out(
        mut self,
        name: impl Into<String>,
        db_type: DbType,
        size: Option<u32>,
    ) -> Result<Self> {
        self.parameters.push(Parameter::output(name, db_type, size))?;
        Ok(self)
    }

    /// Value of an output parameter, after the command was executed.
    pub fn parameter_value<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self
            .last
            .as_ref()
            .and_then(|v| v.parameter_value(name))
            .ok_or_else(|| {
                Error::conversion(format!(
                    "No value for the parameter `{name}`, was the command executed?"
                ))
            })?;
        T::try_from_value(value.clone())
    }

    /// Executes and returns the number of rows affected.
    pub fn execute(&mut self) -> Result<u64> {
        let (rows, statement) = self.context.run(
            &self.sql,
            self.kind,
            &self.parameters,
            |connection, statement| connection.execute_non_query(statement),
        )?;
        self.last = Some(statement);
        Ok(rows)
    }

    /// Executes an insert and returns the id it generated.
    ///
    /// Dialects that read the id from the inserted row (`RETURNING`) need `identity_column`.
    pub fn execute_return_last_id<T: AsValue>(
        &mut self,
        identity_column: Option<&str>,
    ) -> Result<T> {
        let provider = self.context.dialect();
        if identity_column.is_none() {
            if let Err(e) = provider.require(Capability::IdentityWithoutIdentityColumn) {
                return Err(self.context.fail(e, &self.sql, &[]));
            }
        }
        let mut sql = self
            .sql
            .trim_end()
            .trim_end_matches(';')
            .trim_end()
            .to_string();
        let retrieval = provider.write_last_insert_id(&mut sql, identity_column);
        let required = match retrieval {
            IdentityRetrieval::Batch => Some(Capability::MultipleQueries),
            IdentityRetrieval::Returning => None,
            IdentityRetrieval::OutputParameter(..) => Some(Capability::OutputParameters),
        };
        if let Some(Err(e)) = required.map(|v| provider.require(v)) {
            return Err(self.context.fail(e, &self.sql, &[]));
        }
        let value = match retrieval {
            IdentityRetrieval::Batch | IdentityRetrieval::Returning => {
                let (value, statement) =
                    self.context
                        .run(&sql, self.kind, &self.parameters, |connection, statement| {
                            connection.execute_scalar(statement)
                        })?;
                self.last = Some(statement);
                value
            }
            IdentityRetrieval::OutputParameter(name) => {
                let mut parameters = self.parameters.clone();
                if let Err(e) = parameters.push(Parameter::output(name, DbType::Int64, None)) {
                    return Err(self.context.fail(e, &sql, &[]));
                }
                let ((), statement) =
                    self.context
                        .run(&sql, self.kind, &parameters, |connection, statement| {
                            connection.execute_non_query(statement).map(|_| ())
                        })?;
                let value = statement.parameter_value(name).cloned().unwrap_or_default();
                self.last = Some(statement);
                value
            }
        };
        self.mapped(|| T::try_from_value(value))
    }

    /// Next result set: the only one of a regular command, or the next unread one of a multi
    /// result command.
    fn read(&mut self) -> Result<ResultSet> {
        if !self.multi_result {
            let (sets, statement) = self.context.run(
                &self.sql,
                self.kind,
                &self.parameters,
                |connection, statement| connection.execute_reader(statement),
            )?;
            self.last = Some(statement);
            return Ok(sets.into_iter().next().unwrap_or_default());
        }
        if self.pending.is_none() {
            if let Err(e) = self
                .context
                .dialect()
                .require(Capability::MultipleResultsets)
            {
                return Err(self.context.fail(e, &self.sql, &[]));
            }
            let (sets, statement) = self.context.run(
                &self.sql,
                self.kind,
                &self.parameters,
                |connection, statement| connection.execute_reader(statement),
            )?;
            self.last = Some(statement);
            self.pending = Some(sets.into());
        }
        Ok(self
            .pending
            .as_mut()
            .and_then(VecDeque::pop_front)
            .unwrap_or_default())
    }

    /// Runs a mapping step, errors get the statement attached and are notified.
    fn mapped<R>(&self, f: impl FnOnce() -> Result<R>) -> Result<R> {
        f().map_err(|e| match &self.last {
            Some(statement) => self
                .context
                .fail(e, &statement.text, &statement.parameters),
            None => self.context.fail(e, &self.sql, &[]),
        })
    }

    /// Rows as dynamic name to value records.
    pub fn query(&mut self) -> Result<Vec<RowLabeled>> {
        let set = self.read()?;
        Ok(set.labeled().collect())
    }

    pub fn query_single(&mut self) -> Result<Option<RowLabeled>> {
        let set = self.read()?;
        Ok(set.labeled().next())
    }

    /// Rows automatically mapped into `T`.
    pub fn query_as<T: Entity>(&mut self) -> Result<Vec<T>> {
        self.query_into::<T, Vec<T>>()
    }

    pub fn query_single_as<T: Entity>(&mut self) -> Result<Option<T>> {
        let mut set = self.read()?;
        set.rows.truncate(1);
        let result: Vec<T> = self.map_set(set, |_, _| Ok(()))?;
        Ok(result.into_iter().next())
    }

    /// Rows automatically mapped into `T`, collected into a custom collection.
    pub fn query_into<T: Entity, C: Default + Extend<T>>(&mut self) -> Result<C> {
        let set = self.read()?;
        self.map_set(set, |_, _| Ok(()))
    }

    /// Auto map then customize: `f` receives each row together with the entity automatically
    /// mapped from it.
    pub fn query_as_with<T: Entity>(
        &mut self,
        f: impl FnMut(&RowLabeled, &mut T) -> Result<()>,
    ) -> Result<Vec<T>> {
        let set = self.read()?;
        self.map_set(set, f)
    }

    /// No auto map: `f` builds each entity from the row by itself.
    pub fn query_no_auto_map<T>(
        &mut self,
        mut f: impl FnMut(&RowLabeled) -> Result<T>,
    ) -> Result<Vec<T>> {
        let set = self.read()?;
        self.mapped(|| set.labeled().map(|row| f(&row)).collect())
    }

    /// Hands every row to `f`, together with a collection it fills in any way it wants.
    pub fn query_complex<C>(
        &mut self,
        collection: &mut C,
        mut f: impl FnMut(&RowLabeled, &mut C) -> Result<()>,
    ) -> Result<()> {
        let set = self.read()?;
        self.mapped(|| set.labeled().try_for_each(|row| f(&row, collection)))
    }

    /// First column of the first row, the default of `T` when there are no rows.
    pub fn query_value<T: AsValue>(&mut self) -> Result<T> {
        let set = self.read()?;
        self.mapped(|| T::try_from_value(set.scalar()))
    }

    /// First column of every row.
    pub fn query_values<T: AsValue>(&mut self) -> Result<Vec<T>> {
        let set = self.read()?;
        self.mapped(|| {
            set.rows
                .into_iter()
                .map(|row| T::try_from_value(row.first().cloned().unwrap_or_default()))
                .collect()
        })
    }

    fn map_set<T: Entity, C: Default + Extend<T>>(
        &self,
        set: ResultSet,
        mut customize: impl FnMut(&RowLabeled, &mut T) -> Result<()>,
    ) -> Result<C> {
        let strict = self.context.config().throw_on_auto_map_failure;
        self.mapped(|| {
            let mut result = C::default();
            if set.rows.is_empty() {
                return Ok(result);
            }
            let map = ColumnMap::new::<T>(&set.labels, strict)?;
            for row in set.rows {
                let row = RowLabeled::new(set.labels.clone(), row);
                let mut entity: T = map.map(row.values.iter().cloned())?;
                customize(&row, &mut entity)?;
                result.extend(Some(entity));
            }
            Ok(result)
        })
    }
}
