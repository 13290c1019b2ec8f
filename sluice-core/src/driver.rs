use crate::{Connection, Provider};
use std::sync::Arc;

/// Entry point of a database backend.
pub trait Driver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Dialect of the backend.
    fn provider(&self) -> Arc<dyn Provider>;

    /// Opens a new connection.
    fn connect(&self, connection_string: &str) -> anyhow::Result<Box<dyn Connection>>;
}
