use crate::{
    BoundParameter, Capability, Command, CommandEvent, CommandKind, Connection, ContextConfig,
    DeleteBuilder, Driver, Entity, Error, ErrorKind, Events, InsertBuilder, IsolationLevel,
    Parameters, Provider, Result, SelectBuilder, Statement, StoredProcedureBuilder,
    UpdateBuilder, truncate_long,
};
use std::sync::Arc;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    #[default]
    NoTransaction,
    Open,
    Committed,
    RolledBack,
}

/// Connection used by one command.
enum Lease<'a> {
    /// The connection of the open transaction.
    Shared(&'a mut Box<dyn Connection>),
    /// Opened for the command, closed when dropped.
    Owned(Box<dyn Connection>),
}

impl Lease<'_> {
    fn connection(&mut self) -> &mut dyn Connection {
        match self {
            Lease::Shared(connection) => &mut ***connection,
            Lease::Owned(connection) => &mut **connection,
        }
    }
}

#[derive(Default)]
struct Session {
    connection: Option<Box<dyn Connection>>,
    state: TransactionState,
}

impl Session {
    fn lease(&mut self, driver: &dyn Driver, config: &ContextConfig) -> Result<Lease<'_>> {
        if !config.use_transaction {
            return Ok(Lease::Owned(connect(driver, config)?));
        }
        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => connect(driver, config)?,
        };
        let connection = self.connection.insert(connection);
        if self.state != TransactionState::Open {
            connection
                .begin(config.isolation_level)
                .map_err(Error::execution)?;
            self.state = TransactionState::Open;
        }
        Ok(Lease::Shared(connection))
    }
}

fn connect(driver: &dyn Driver, config: &ContextConfig) -> Result<Box<dyn Connection>> {
    driver
        .connect(&config.connection_string)
        .map_err(|e| {
            Error::execution(e.context(format!(
                "Could not connect to `{}` using the {} driver",
                truncate_long!(&config.connection_string),
                driver.name()
            )))
        })
}

/// Unit of work: configuration, provider, listeners and, while a transaction is open, the
/// connection every command runs on.
///
/// Outside a transaction each command opens and closes its own connection. With
/// `use_transaction` the first command opens a connection and begins a transaction that lasts
/// until [`DbContext::commit`] or [`DbContext::rollback`], dropping the context rolls it back.
pub struct DbContext {
    driver: Arc<dyn Driver>,
    provider: Arc<dyn Provider>,
    config: ContextConfig,
    session: Session,
    events: Events,
}

impl DbContext {
    pub fn new(driver: impl Driver + 'static, config: ContextConfig) -> Self {
        Self::with_driver(Arc::new(driver), config)
    }

    pub fn with_driver(driver: Arc<dyn Driver>, config: ContextConfig) -> Self {
        Self {
            provider: driver.provider(),
            driver,
            config,
            session: Default::default(),
            events: Default::default(),
        }
    }

    /// Overrides the dialect the driver comes with.
    pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn use_transaction(mut self, value: bool) -> Self {
        self.config.use_transaction = value;
        self
    }

    pub fn isolation_level(mut self, value: IsolationLevel) -> Self {
        self.config.isolation_level = value;
        self
    }

    pub fn throw_on_auto_map_failure(mut self, value: bool) -> Self {
        self.config.throw_on_auto_map_failure = value;
        self
    }

    pub fn command_timeout(mut self, seconds: u64) -> Self {
        self.config.command_timeout = Some(seconds);
        self
    }

    pub fn on_executing(mut self, f: impl Fn(&CommandEvent<'_>) + Send + Sync + 'static) -> Self {
        self.events.on_executing(Box::new(f));
        self
    }

    pub fn on_executed(mut self, f: impl Fn(&CommandEvent<'_>) + Send + Sync + 'static) -> Self {
        self.events.on_executed(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&CommandEvent<'_>) + Send + Sync + 'static) -> Self {
        self.events.on_error(Box::new(f));
        self
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn dialect(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    pub fn transaction_state(&self) -> TransactionState {
        self.session.state
    }

    /// Command running hand written SQL.
    pub fn sql(&mut self, sql: impl Into<String>) -> Command<'_> {
        Command::new(self, sql.into(), CommandKind::Text, Parameters::new())
    }

    /// Command returning several result sets, each query reads the next one.
    pub fn multi_result_sql(&mut self, sql: impl Into<String>) -> Command<'_> {
        self.sql(sql).multi_result()
    }

    pub fn select<T: Entity>(&mut self, select: impl Into<String>) -> SelectBuilder<'_, T> {
        SelectBuilder::new(self, select.into())
    }

    pub fn insert(&mut self, table: impl Into<String>) -> InsertBuilder<'_> {
        InsertBuilder::new(self, table.into())
    }

    pub fn update(&mut self, table: impl Into<String>) -> UpdateBuilder<'_> {
        UpdateBuilder::new(self, table.into())
    }

    pub fn delete(&mut self, table: impl Into<String>) -> DeleteBuilder<'_> {
        DeleteBuilder::new(self, table.into())
    }

    pub fn stored_procedure(&mut self, name: impl Into<String>) -> StoredProcedureBuilder<'_> {
        StoredProcedureBuilder::new(self, name.into())
    }

    pub fn multi_result_stored_procedure(
        &mut self,
        name: impl Into<String>,
    ) -> StoredProcedureBuilder<'_> {
        StoredProcedureBuilder::new(self, name.into()).multi_result()
    }

    pub fn commit(&mut self) -> Result<()> {
        self.end_transaction(true)
    }

    pub fn rollback(&mut self) -> Result<()> {
        self.end_transaction(false)
    }

    fn end_transaction(&mut self, commit: bool) -> Result<()> {
        if self.session.state != TransactionState::Open {
            return Err(Error::new(ErrorKind::NoActiveTransaction));
        }
        let Some(mut connection) = self.session.connection.take() else {
            self.session.state = TransactionState::NoTransaction;
            return Err(Error::new(ErrorKind::NoActiveTransaction));
        };
        let (result, state) = if commit {
            (connection.commit(), TransactionState::Committed)
        } else {
            (connection.rollback(), TransactionState::RolledBack)
        };
        self.session.state = match result {
            Ok(..) => state,
            Err(..) => TransactionState::RolledBack,
        };
        result.map_err(|e| {
            let e = Error::execution(e);
            log::error!("{e:#}");
            e
        })
    }

    fn check(&self, kind: CommandKind, parameters: &Parameters) -> Result<()> {
        if kind == CommandKind::StoredProcedure {
            self.provider.require(Capability::StoredProcedures)?;
        }
        if parameters.iter().any(|p| p.direction.is_output()) {
            self.provider.require(Capability::OutputParameters)?;
        }
        Ok(())
    }

    /// Executes `sql` through `exec`: checks the capabilities, prepares the statement, leases a
    /// connection and notifies the listeners.
    pub(crate) fn run<R>(
        &mut self,
        sql: &str,
        kind: CommandKind,
        parameters: &Parameters,
        exec: impl FnOnce(&mut dyn Connection, &mut Statement) -> anyhow::Result<R>,
    ) -> Result<(R, Statement)> {
        let mut statement = match self
            .check(kind, parameters)
            .and_then(|_| self.provider.prepare(sql, kind, parameters))
        {
            Ok(statement) => statement,
            Err(e) => return Err(self.fail(e, sql, &[])),
        };
        statement.timeout = self.config.command_timeout();
        let result = (|| {
            let mut lease = self.session.lease(self.driver.as_ref(), &self.config)?;
            self.events.executing(&CommandEvent {
                sql: &statement.text,
                parameters: &statement.parameters,
                error: None,
            });
            log::debug!("Executing:\n{}", truncate_long!(&statement.text));
            exec(lease.connection(), &mut statement).map_err(Error::execution)
        })();
        match result {
            Ok(value) => {
                self.events.executed(&CommandEvent {
                    sql: &statement.text,
                    parameters: &statement.parameters,
                    error: None,
                });
                Ok((value, statement))
            }
            Err(e) => Err(self.fail(e, &statement.text, &statement.parameters)),
        }
    }

    /// Attaches the statement to the error and notifies it.
    pub(crate) fn fail(&self, error: Error, sql: &str, parameters: &[BoundParameter]) -> Error {
        let error = error.with_statement(sql, parameters);
        log::error!("{error:#}");
        self.events.error(&CommandEvent {
            sql: error.sql().unwrap_or(sql),
            parameters,
            error: Some(&error),
        });
        error
    }
}

impl Drop for DbContext {
    fn drop(&mut self) {
        if self.session.state == TransactionState::Open {
            log::warn!("The unit of work was dropped with an open transaction, rolling it back");
            if let Err(e) = self.rollback() {
                log::error!("{e:#}");
            }
        }
    }
}
