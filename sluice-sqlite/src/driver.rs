use crate::SqliteConnection;
use sluice_core::{Connection, Driver, Provider, SqliteProvider};
use std::sync::Arc;

/// Sqlite backend, connection strings look like `sqlite://path/to/file.db?mode=rwc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn provider(&self) -> Arc<dyn Provider> {
        Arc::new(SqliteProvider)
    }

    fn connect(&self, connection_string: &str) -> anyhow::Result<Box<dyn Connection>> {
        Ok(Box::new(SqliteConnection::connect(connection_string)?))
    }
}
