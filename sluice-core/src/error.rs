use crate::{BoundParameter, Capability, Value, truncate_long};
use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

/// The category of an [`Error`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("The parameter `{0}` has a type that cannot be sent to the database")]
    UnsupportedParameterType(String),
    #[error("Could not map the column `{column}` into `{entity}`")]
    AutoMapFailure { column: String, entity: &'static str },
    #[error("The provider `{provider}` does not support {capability}")]
    UnsupportedOperation {
        provider: &'static str,
        capability: Capability,
    },
    #[error("There is no active transaction")]
    NoActiveTransaction,
    #[error("Error while executing the command")]
    ExecutionFailure,
    #[error("A parameter named `{0}` was already added to the command")]
    DuplicateParameterName(String),
    #[error("{0}")]
    Conversion(String),
}

/// Error produced by every fallible operation in sluice.
///
/// Errors raised while a command runs carry the SQL text and a snapshot of its parameters.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    sql: Option<String>,
    parameters: Vec<(String, Value)>,
    source: Option<anyhow::Error>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            sql: None,
            parameters: Vec::new(),
            source: None,
        }
    }
    /// Wraps a driver error.
    pub fn execution(source: anyhow::Error) -> Self {
        Self::new(ErrorKind::ExecutionFailure).with_source(source)
    }
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conversion(message.into()))
    }
    pub fn unsupported(provider: &'static str, capability: Capability) -> Self {
        Self::new(ErrorKind::UnsupportedOperation {
            provider,
            capability,
        })
    }
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }
    /// Attaches the statement being executed, unless one is already present.
    pub fn with_statement(mut self, sql: &str, parameters: &[BoundParameter]) -> Self {
        if self.sql.is_none() {
            self.sql = Some(sql.to_string());
            self.parameters = parameters
                .iter()
                .map(|p| (p.name.clone(), p.value.clone()))
                .collect();
        }
        self
    }
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
    pub fn sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }
    pub fn parameters(&self) -> &[(String, Value)] {
        &self.parameters
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(source) = &self.source {
            write!(f, ": {source:#}")?;
        }
        if let Some(sql) = &self.sql {
            write!(f, "\nSQL: {}", truncate_long!(sql))?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let source: &(dyn std::error::Error + 'static) = &**self.source.as_ref()?;
        Some(source)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}
