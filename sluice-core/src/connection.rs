use crate::{IsolationLevel, ResultSet, Statement, Value};

/// Open connection to a database, closed when dropped.
pub trait Connection: Send {
    /// Executes the statement and returns the number of rows affected.
    fn execute_non_query(&mut self, statement: &mut Statement) -> anyhow::Result<u64>;

    /// Executes the statement and returns every result set it produced, in order.
    fn execute_reader(&mut self, statement: &mut Statement) -> anyhow::Result<Vec<ResultSet>>;

    /// First value of the first row of the first result set, null when there are no rows.
    fn execute_scalar(&mut self, statement: &mut Statement) -> anyhow::Result<Value> {
        Ok(self
            .execute_reader(statement)?
            .first()
            .map(ResultSet::scalar)
            .unwrap_or_default())
    }

    fn begin(&mut self, isolation: IsolationLevel) -> anyhow::Result<()>;

    fn commit(&mut self) -> anyhow::Result<()>;

    fn rollback(&mut self) -> anyhow::Result<()>;
}
