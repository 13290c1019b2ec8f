use crate::{AsValue, Error, Result, Value};
use std::sync::Arc;

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
///
/// This is the dynamic row handed out when a query has no target entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    /// Case insensitive column lookup.
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .or_else(|| self.labels.iter().position(|v| v.eq_ignore_ascii_case(name)))
            .map(|i| &self.values[i])
    }
    /// Typed read of the column `name`.
    pub fn get<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get_column(name)
            .ok_or_else(|| Error::conversion(format!("The row has no column named `{name}`")))?;
        T::try_from_value(value.clone())
    }
    /// Typed read of the column at `index`.
    pub fn get_index<T: AsValue>(&self, index: usize) -> Result<T> {
        let value = self.values.get(index).ok_or_else(|| {
            Error::conversion(format!(
                "Column index {index} is out of range (the row has {} columns)",
                self.values.len()
            ))
        })?;
        T::try_from_value(value.clone())
    }
}

impl From<RowLabeled> for Row {
    fn from(value: RowLabeled) -> Self {
        value.values
    }
}

/// One result set of a command: labels shared by all its rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub labels: RowNames,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(labels: RowNames) -> Self {
        Self {
            labels,
            rows: Vec::new(),
        }
    }
    pub fn labeled(&self) -> impl Iterator<Item = RowLabeled> + '_ {
        self.rows
            .iter()
            .map(|row| RowLabeled::new(self.labels.clone(), row.clone()))
    }
    /// First value of the first row.
    pub fn scalar(&self) -> Value {
        self.rows
            .first()
            .and_then(|row| row.first())
            .cloned()
            .unwrap_or_default()
    }
}
