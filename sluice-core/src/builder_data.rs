use crate::{Parameter, Parameters, Result, Value};

/// Page window of a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub items_per_page: u64,
    /// One based.
    pub current_page: u64,
}

impl Paging {
    pub fn new(current_page: u64, items_per_page: u64) -> Self {
        Self {
            items_per_page,
            current_page,
        }
    }
    pub fn is_paged(&self) -> bool {
        self.items_per_page > 0
    }
    fn page(&self) -> u64 {
        self.current_page.max(1)
    }
    /// One based index of the first row of the page.
    pub fn first_row(&self) -> u64 {
        self.offset().saturating_add(1)
    }
    /// One based index of the last row of the page.
    pub fn last_row(&self) -> u64 {
        self.page().saturating_mul(self.items_per_page)
    }
    /// Rows to skip. Saturates at `u64::MAX`, pages past it are empty.
    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.items_per_page)
    }
}

/// Column bound to a parameter, used by insert, update and delete statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderColumn {
    pub column: String,
    pub parameter: String,
}

/// Dialect neutral description of a statement.
///
/// Fragments (`select`, `from`, `where_sql`, ...) are raw SQL written by the caller, empty
/// fragments are omitted. Parameter markers are written `@name`, they are turned into the
/// dialect syntax when the statement gets prepared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuilderData {
    pub select: String,
    pub from: String,
    pub where_sql: String,
    pub group_by: String,
    pub having: String,
    pub order_by: String,
    pub paging: Option<Paging>,
    /// Table or stored procedure.
    pub object_name: String,
    pub columns: Vec<BuilderColumn>,
    pub where_columns: Vec<BuilderColumn>,
    pub parameters: Parameters,
}

impl BuilderData {
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            ..Default::default()
        }
    }
    pub fn is_paged(&self) -> bool {
        self.paging.is_some_and(|v| v.is_paged())
    }
    /// Adds a column value pair, the parameter is named after the column.
    pub fn column(&mut self, column: impl Into<String>, value: Value) -> Result<()> {
        let column = column.into();
        let parameter = parameter_name(&column);
        self.parameters.push(Parameter::new(parameter.clone(), value))?;
        self.columns.push(BuilderColumn { column, parameter });
        Ok(())
    }
    /// Adds an equality predicate on `column`.
    pub fn where_column(&mut self, column: impl Into<String>, value: Value) -> Result<()> {
        let column = column.into();
        let parameter = parameter_name(&column);
        self.parameters.push(Parameter::new(parameter.clone(), value))?;
        self.where_columns.push(BuilderColumn { column, parameter });
        Ok(())
    }
}

/// Marker friendly version of a column name.
fn parameter_name(column: &str) -> String {
    column
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
