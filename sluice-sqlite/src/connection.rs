use crate::convert::{Bind, extract_value};
use anyhow::{Context, bail};
use rusqlite::OpenFlags;
use sluice_core::{
    Connection, IsolationLevel, Provider, ResultSet, SqliteProvider, Statement, split_statements,
    truncate_long,
};
use std::{sync::Arc, time::Duration};

const PREFIX: &str = "sqlite://";

pub struct SqliteConnection {
    connection: rusqlite::Connection,
}

impl SqliteConnection {
    /// Opens `sqlite://{path}`, the path can carry the URI parameters of sqlite (`?mode=ro`).
    pub fn connect(url: &str) -> anyhow::Result<Self> {
        let Some(path) = url.strip_prefix(PREFIX) else {
            bail!("Expected sqlite connection url to start with `{PREFIX}`");
        };
        let connection = rusqlite::Connection::open_with_flags(
            format!("file:{path}"),
            OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Could not open the sqlite database `{url}`"))?;
        Ok(Self { connection })
    }

    /// Runs every statement of the batch, collecting the result sets of the ones returning
    /// rows. Returns the number of rows changed by the others.
    fn run(
        &mut self,
        statement: &Statement,
        mut result_sets: Option<&mut Vec<ResultSet>>,
    ) -> anyhow::Result<u64> {
        self.connection
            .busy_timeout(statement.timeout.unwrap_or(Duration::from_secs(5)))?;
        let mut changes = 0;
        for sql in split_statements(&statement.text) {
            let context = || format!("While executing the query:\n{}", truncate_long!(sql));
            let mut prepared = self.connection.prepare(sql).with_context(context)?;
            for parameter in &statement.parameters {
                if let Some(index) = prepared.parameter_index(&parameter.name)? {
                    prepared
                        .raw_bind_parameter(index, Bind(&parameter.value))
                        .with_context(|| {
                            format!("While binding the parameter `{}`", parameter.source)
                        })?;
                }
            }
            if prepared.column_count() == 0 {
                changes += prepared.raw_execute().with_context(context)? as u64;
                continue;
            }
            let labels = prepared
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect::<Arc<[_]>>();
            let count = labels.len();
            let mut set = ResultSet::new(labels);
            let mut rows = prepared.raw_query();
            while let Some(row) = rows.next().with_context(context)? {
                set.rows.push(
                    (0..count)
                        .map(|i| extract_value(row.get_ref(i)?))
                        .collect::<anyhow::Result<_>>()?,
                );
            }
            if let Some(result_sets) = result_sets.as_deref_mut() {
                result_sets.push(set);
            }
        }
        Ok(changes)
    }

    fn execute_batch(&mut self, sql: String) -> anyhow::Result<()> {
        log::debug!("{sql}");
        self.connection
            .execute_batch(&sql)
            .with_context(|| format!("While executing `{sql}`"))
    }
}

impl Connection for SqliteConnection {
    fn execute_non_query(&mut self, statement: &mut Statement) -> anyhow::Result<u64> {
        self.run(statement, None)
    }

    fn execute_reader(&mut self, statement: &mut Statement) -> anyhow::Result<Vec<ResultSet>> {
        let mut result = Vec::new();
        self.run(statement, Some(&mut result))?;
        Ok(result)
    }

    fn begin(&mut self, isolation: IsolationLevel) -> anyhow::Result<()> {
        let mut sql = String::new();
        SqliteProvider.write_transaction_begin(&mut sql, isolation);
        self.execute_batch(sql)
    }

    fn commit(&mut self) -> anyhow::Result<()> {
        let mut sql = String::new();
        SqliteProvider.write_transaction_commit(&mut sql);
        self.execute_batch(sql)
    }

    fn rollback(&mut self) -> anyhow::Result<()> {
        let mut sql = String::new();
        SqliteProvider.write_transaction_rollback(&mut sql);
        self.execute_batch(sql)
    }
}
