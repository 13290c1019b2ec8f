use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
    Snapshot,
}

impl IsolationLevel {
    pub fn to_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
            IsolationLevel::Snapshot => "SNAPSHOT",
        }
    }
}

/// Settings of a unit of work.
///
/// Every field has a default so that partial documents deserialize:
/// ```rust
/// use sluice_core::{ContextConfig, IsolationLevel};
/// let config: ContextConfig = serde_json::from_str(
///     r#"{ "connection_string": "sqlite://:memory:", "isolation_level": "serializable" }"#,
/// ).unwrap();
/// assert_eq!(config.isolation_level, IsolationLevel::Serializable);
/// assert!(!config.use_transaction);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub connection_string: String,
    pub use_transaction: bool,
    pub isolation_level: IsolationLevel,
    /// Fail on result columns that match no property, instead of skipping them.
    pub throw_on_auto_map_failure: bool,
    /// Seconds.
    pub command_timeout: Option<u64>,
}

impl ContextConfig {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            ..Default::default()
        }
    }
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout.map(Duration::from_secs)
    }
}
