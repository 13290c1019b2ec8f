#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use sluice::{
        Capability, Connection, ContextConfig, DbContext, DbType, Direction, Driver, Entity,
        ErrorKind, IsolationLevel, MySqlProvider, OracleProvider, PostgresProvider, Provider,
        ResultSet, RowLabeled, SqlServerProvider, SqliteProvider, Statement, TransactionState,
        Value, params,
    };
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    /// What the fake database saw, shared between the driver and the test.
    #[derive(Default, Clone)]
    struct Journal {
        entries: Arc<Mutex<Vec<String>>>,
        results: Arc<Mutex<VecDeque<Vec<ResultSet>>>>,
    }

    impl Journal {
        fn push(&self, entry: impl Into<String>) {
            self.entries.lock().unwrap().push(entry.into());
        }
        fn entries(&self) -> Vec<String> {
            self.entries.lock().unwrap().clone()
        }
        fn count(&self, prefix: &str) -> usize {
            self.entries()
                .iter()
                .filter(|v| v.starts_with(prefix))
                .count()
        }
        fn enqueue(&self, sets: Vec<ResultSet>) {
            self.results.lock().unwrap().push_back(sets);
        }
    }

    struct FakeDriver {
        journal: Journal,
        provider: Arc<dyn Provider>,
    }

    impl Driver for FakeDriver {
        fn name(&self) -> &'static str {
            "fake"
        }
        fn provider(&self) -> Arc<dyn Provider> {
            self.provider.clone()
        }
        fn connect(&self, connection_string: &str) -> anyhow::Result<Box<dyn Connection>> {
            if connection_string == "unreachable" {
                return Err(anyhow!("connection refused"));
            }
            self.journal.push("connect");
            Ok(Box::new(FakeConnection {
                journal: self.journal.clone(),
            }))
        }
    }

    struct FakeConnection {
        journal: Journal,
    }

    impl FakeConnection {
        fn run(&mut self, statement: &mut Statement) -> anyhow::Result<()> {
            self.journal.push(format!("execute {}", statement.text));
            if statement.text.contains("broken") {
                return Err(anyhow!("syntax error near `broken`"));
            }
            for parameter in &mut statement.parameters {
                if parameter.direction == Direction::Output {
                    parameter.value = Value::Int64(Some(42));
                }
            }
            Ok(())
        }
    }

    impl Connection for FakeConnection {
        fn execute_non_query(&mut self, statement: &mut Statement) -> anyhow::Result<u64> {
            self.run(statement)?;
            Ok(1)
        }
        fn execute_reader(&mut self, statement: &mut Statement) -> anyhow::Result<Vec<ResultSet>> {
            self.run(statement)?;
            Ok(self
                .journal
                .results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default())
        }
        fn begin(&mut self, isolation: IsolationLevel) -> anyhow::Result<()> {
            self.journal.push(format!("begin {}", isolation.to_sql()));
            Ok(())
        }
        fn commit(&mut self) -> anyhow::Result<()> {
            self.journal.push("commit");
            Ok(())
        }
        fn rollback(&mut self) -> anyhow::Result<()> {
            self.journal.push("rollback");
            Ok(())
        }
    }

    impl Drop for FakeConnection {
        fn drop(&mut self) {
            self.journal.push("close");
        }
    }

    fn context(provider: impl Provider + 'static) -> (DbContext, Journal) {
        let journal = Journal::default();
        let context = DbContext::new(
            FakeDriver {
                journal: journal.clone(),
                provider: Arc::new(provider),
            },
            ContextConfig::new("fake://db"),
        );
        (context, journal)
    }

    fn set(labels: &[&str], rows: Vec<Vec<Value>>) -> ResultSet {
        ResultSet {
            labels: labels.iter().map(|v| v.to_string()).collect(),
            rows: rows.into_iter().map(Into::into).collect(),
        }
    }

    #[derive(Entity, Default, Debug, PartialEq)]
    struct Category {
        #[sluice(name = "CategoryId")]
        id: i32,
        #[sluice(name = "Name")]
        name: String,
    }

    #[test]
    fn connection_per_command() {
        let (mut context, journal) = context(SqlServerProvider);
        context.sql("delete from Category").execute().unwrap();
        context
            .sql("update Category set Name = @0")
            .parameters(params!["Books"])
            .unwrap()
            .execute()
            .unwrap();
        assert_eq!(
            journal.entries(),
            [
                "connect",
                "execute delete from Category",
                "close",
                "connect",
                "execute update Category set Name = @0",
                "close",
            ]
        );
        assert_eq!(context.transaction_state(), TransactionState::NoTransaction);
    }

    #[test]
    fn shared_connection_in_transaction() {
        let (context, journal) = context(SqlServerProvider);
        let mut context = context
            .use_transaction(true)
            .isolation_level(IsolationLevel::Serializable);
        context.sql("delete from Product").execute().unwrap();
        context.sql("delete from Category").execute().unwrap();
        assert_eq!(context.transaction_state(), TransactionState::Open);
        context.commit().unwrap();
        assert_eq!(context.transaction_state(), TransactionState::Committed);
        assert_eq!(
            journal.entries(),
            [
                "connect",
                "begin SERIALIZABLE",
                "execute delete from Product",
                "execute delete from Category",
                "commit",
                "close",
            ]
        );
        let error = context.commit().unwrap_err();
        assert_eq!(*error.kind(), ErrorKind::NoActiveTransaction);
        let error = context.rollback().unwrap_err();
        assert_eq!(*error.kind(), ErrorKind::NoActiveTransaction);
    }

    #[test]
    fn no_transaction_to_end() {
        let (mut context, journal) = context(SqliteProvider);
        assert_eq!(
            *context.rollback().unwrap_err().kind(),
            ErrorKind::NoActiveTransaction
        );
        let mut context = context.use_transaction(true);
        assert_eq!(
            *context.commit().unwrap_err().kind(),
            ErrorKind::NoActiveTransaction
        );
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn rollback_and_drop() {
        let (context, journal) = context(PostgresProvider);
        let mut context = context.use_transaction(true);
        context.sql("delete from Product").execute().unwrap();
        context.rollback().unwrap();
        assert_eq!(context.transaction_state(), TransactionState::RolledBack);
        assert_eq!(journal.count("rollback"), 1);

        context.sql("delete from Category").execute().unwrap();
        assert_eq!(context.transaction_state(), TransactionState::Open);
        assert_eq!(journal.count("begin"), 2);
        drop(context);
        assert_eq!(journal.count("rollback"), 2);
        assert_eq!(journal.count("commit"), 0);
        assert_eq!(journal.entries().last().map(String::as_str), Some("close"));
    }

    #[test]
    fn events() {
        let (context, journal) = context(PostgresProvider);
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let (executing, executed, failed) = (seen.clone(), seen.clone(), seen.clone());
        let mut context = context
            .on_executing(move |event| {
                executing.lock().unwrap().push(format!(
                    "executing {} {:?}",
                    event.sql,
                    event.parameters.iter().map(|v| &v.value).collect::<Vec<_>>()
                ))
            })
            .on_executed(move |event| {
                executed
                    .lock()
                    .unwrap()
                    .push(format!("executed {}", event.sql))
            })
            .on_error(move |event| {
                failed.lock().unwrap().push(format!(
                    "error {} {}",
                    event.sql,
                    event.error.is_some()
                ))
            });
        context
            .sql("update Product set Name = @Name")
            .parameter("Name", "Pen")
            .unwrap()
            .execute()
            .unwrap();
        let error = context
            .sql("select broken from Product where Id = @0")
            .parameters([7])
            .unwrap()
            .execute()
            .unwrap_err();
        assert_eq!(*error.kind(), ErrorKind::ExecutionFailure);
        assert_eq!(error.sql(), Some("select broken from Product where Id = $1"));
        assert_eq!(
            error.parameters(),
            [("$1".to_string(), Value::Int32(Some(7)))]
        );
        let message = error.to_string();
        assert!(message.contains("syntax error near `broken`"), "{message}");
        assert!(message.contains("SQL: select broken"), "{message}");
        assert_eq!(
            *seen.lock().unwrap(),
            [
                r#"executing update Product set Name = $1 [Varchar(Some("Pen"))]"#,
                "executed update Product set Name = $1",
                "executing select broken from Product where Id = $1 [Int32(Some(7))]",
                "error select broken from Product where Id = $1 true",
            ]
        );
        assert_eq!(journal.count("connect"), 2);
    }

    #[test]
    fn connection_failure() {
        let journal = Journal::default();
        let failed = Arc::new(Mutex::new(0));
        let counter = failed.clone();
        let mut context = DbContext::new(
            FakeDriver {
                journal,
                provider: Arc::new(SqliteProvider),
            },
            ContextConfig::new("unreachable"),
        )
        .on_error(move |_| *counter.lock().unwrap() += 1);
        let error = context.sql("select 1").query_value::<i32>().unwrap_err();
        assert_eq!(*error.kind(), ErrorKind::ExecutionFailure);
        assert!(error.to_string().contains("connection refused"));
        assert_eq!(*failed.lock().unwrap(), 1);
    }

    #[test]
    fn capabilities_checked_before_execution() {
        let (mut context, journal) = context(PostgresProvider);
        let error = context
            .insert("Category")
            .column("Name", "Books")
            .unwrap()
            .execute_return_last_id::<i64>(None)
            .unwrap_err();
        assert_eq!(
            *error.kind(),
            ErrorKind::UnsupportedOperation {
                provider: "postgres",
                capability: Capability::IdentityWithoutIdentityColumn,
            }
        );

        let (mut context, _) = self::context(SqliteProvider);
        let error = context.stored_procedure("ProductUpdate").execute().unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::UnsupportedOperation {
                capability: Capability::StoredProcedures,
                ..
            }
        ));

        let (mut context, _) = self::context(MySqlProvider);
        let error = context
            .sql("select @Count = count(*) from Product")
            .parameter_out("Count", DbType::Int32, None)
            .unwrap()
            .execute()
            .unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::UnsupportedOperation {
                capability: Capability::OutputParameters,
                ..
            }
        ));

        let (mut context, _) = self::context(OracleProvider);
        let error = context
            .multi_result_sql("select 1 from dual; select 2 from dual")
            .query()
            .unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::UnsupportedOperation {
                capability: Capability::MultipleResultsets,
                ..
            }
        ));
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn query_shapes() {
        let (mut context, journal) = context(SqlServerProvider);
        let categories = || {
            set(
                &["CategoryId", "Name"],
                vec![
                    vec![Value::Int32(Some(1)), "Books".into()],
                    vec![Value::Int32(Some(2)), "Movies".into()],
                ],
            )
        };

        journal.enqueue(vec![categories()]);
        let rows: Vec<RowLabeled> = context.sql("select * from Category").query().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get::<String>("name").unwrap(), "Movies");

        journal.enqueue(vec![categories()]);
        let result = context
            .sql("select * from Category")
            .query_as::<Category>()
            .unwrap();
        assert_eq!(
            result,
            [
                Category {
                    id: 1,
                    name: "Books".into()
                },
                Category {
                    id: 2,
                    name: "Movies".into()
                },
            ]
        );

        journal.enqueue(vec![categories()]);
        let result = context
            .sql("select * from Category")
            .query_into::<Category, VecDeque<_>>()
            .unwrap();
        assert_eq!(result.back().map(|v| v.id), Some(2));

        journal.enqueue(vec![categories()]);
        let result = context
            .sql("select * from Category")
            .query_as_with(|row, category: &mut Category| {
                category.name = format!("{} #{}", category.name, row.get::<i32>("CategoryId")?);
                Ok(())
            })
            .unwrap();
        assert_eq!(result[0].name, "Books #1");

        journal.enqueue(vec![categories()]);
        let result = context
            .sql("select * from Category")
            .query_no_auto_map(|row| row.get_index::<String>(1))
            .unwrap();
        assert_eq!(result, ["Books", "Movies"]);

        journal.enqueue(vec![categories()]);
        let mut names = String::new();
        context
            .sql("select * from Category")
            .query_complex(&mut names, |row, names| {
                names.push_str(&row.get::<String>("Name")?);
                Ok(())
            })
            .unwrap();
        assert_eq!(names, "BooksMovies");

        journal.enqueue(vec![categories()]);
        let single = context
            .sql("select * from Category")
            .query_single_as::<Category>()
            .unwrap();
        assert_eq!(single.map(|v| v.id), Some(1));

        journal.enqueue(vec![categories()]);
        let ids = context
            .sql("select * from Category")
            .query_values::<i64>()
            .unwrap();
        assert_eq!(ids, [1, 2]);

        let count = context
            .sql("select count(*) from Category where 1 = 0")
            .query_value::<i64>()
            .unwrap();
        assert_eq!(count, 0);
        let none = context
            .sql("select * from Category where 1 = 0")
            .query_single_as::<Category>()
            .unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn auto_map_failure_is_reported() {
        let (context, journal) = context(SqlServerProvider);
        let errors = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = errors.clone();
        let mut context = context
            .throw_on_auto_map_failure(true)
            .on_error(move |event| sink.lock().unwrap().push(event.sql.to_string()));
        journal.enqueue(vec![set(
            &["CategoryId", "Description"],
            vec![vec![Value::Int32(Some(1)), "Paper".into()]],
        )]);
        let error = context
            .sql("select * from Category")
            .query_as::<Category>()
            .unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::AutoMapFailure { column, .. } if column == "Description"));
        assert_eq!(error.sql(), Some("select * from Category"));
        assert_eq!(*errors.lock().unwrap(), ["select * from Category"]);
    }

    #[test]
    fn paged_row_number_is_not_mapped() {
        for provider in [
            Arc::new(SqlServerProvider) as Arc<dyn Provider>,
            Arc::new(OracleProvider),
        ] {
            let (context, journal) = context(SqlServerProvider);
            let mut context = context.provider(provider).throw_on_auto_map_failure(true);
            journal.enqueue(vec![set(
                &["CategoryId", "Name", "SLUICE_ROW_NUMBER"],
                vec![
                    vec![Value::Int32(Some(1)), "Books".into(), Value::Int64(Some(1))],
                    vec![Value::Int32(Some(2)), "Movies".into(), Value::Int64(Some(2))],
                ],
            )]);
            let result = context
                .select::<Category>("CategoryId, Name")
                .from("Category")
                .order_by("Name")
                .paging(1, 10)
                .query()
                .unwrap();
            assert_eq!(
                result,
                [
                    Category {
                        id: 1,
                        name: "Books".into(),
                    },
                    Category {
                        id: 2,
                        name: "Movies".into(),
                    },
                ]
            );
            assert!(
                journal
                    .entries()
                    .iter()
                    .any(|v| v.starts_with("execute") && v.contains("sluice_row_number"))
            );
        }
    }

    #[test]
    fn multiple_result_sets() {
        let (mut context, journal) = context(SqlServerProvider);
        journal.enqueue(vec![
            set(
                &["CategoryId", "Name"],
                vec![vec![Value::Int32(Some(1)), "Books".into()]],
            ),
            set(&["Total"], vec![vec![Value::Int64(Some(10))]]),
        ]);
        let mut command =
            context.multi_result_sql("select * from Category; select count(*) from Product");
        let categories = command.query_as::<Category>().unwrap();
        let total = command.query_value::<i64>().unwrap();
        let exhausted = command.query().unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(total, 10);
        assert!(exhausted.is_empty());
        assert_eq!(journal.count("execute"), 1);
    }

    #[test]
    fn builders() {
        let (mut context, journal) = context(PostgresProvider);
        journal.enqueue(vec![set(
            &["CategoryId", "Name"],
            vec![vec![Value::Int32(Some(3)), "Toys".into()]],
        )]);
        let result = context
            .select::<Category>("CategoryId, Name")
            .from("Category")
            .where_sql("Name LIKE @Name")
            .parameter("Name", "T%")
            .unwrap()
            .order_by("Name")
            .paging(2, 5)
            .query()
            .unwrap();
        assert_eq!(result[0].name, "Toys");

        let category = Category {
            id: 3,
            name: "Games".into(),
        };
        context
            .update("Category")
            .auto_map(&category, &["CategoryId"])
            .unwrap()
            .where_column("CategoryId", category.id)
            .unwrap()
            .execute()
            .unwrap();
        context
            .delete("Category")
            .where_column("CategoryId", 3)
            .unwrap()
            .execute()
            .unwrap();
        let executed = journal
            .entries()
            .into_iter()
            .filter(|v| v.starts_with("execute"))
            .collect::<Vec<_>>();
        assert_eq!(
            executed,
            [
                "execute SELECT CategoryId, Name\nFROM Category\nWHERE Name LIKE $1\nORDER BY Name\nLIMIT 5 OFFSET 5",
                "execute UPDATE Category\nSET \"Name\" = $1\nWHERE \"CategoryId\" = $2",
                "execute DELETE FROM Category\nWHERE \"CategoryId\" = $1",
            ]
        );

        let error = context
            .update("Category")
            .column("Name", "x")
            .unwrap()
            .where_column("Name", "y")
            .err()
            .map(|e| e.kind().clone());
        assert_eq!(
            error,
            Some(ErrorKind::DuplicateParameterName("Name".into()))
        );
    }

    #[test]
    fn last_insert_id() {
        let (mut context, journal) = context(SqlServerProvider);
        journal.enqueue(vec![set(&[""], vec![vec![Value::Int64(Some(17))]])]);
        let id = context
            .insert("Category")
            .column("Name", "Books")
            .unwrap()
            .execute_return_last_id::<i32>(None)
            .unwrap();
        assert_eq!(id, 17);
        assert_eq!(
            journal.entries()[1],
            "execute INSERT INTO Category ([Name])\nVALUES (@Name);\nSELECT CAST(SCOPE_IDENTITY() AS BIGINT)"
        );

        let (mut context, journal) = self::context(OracleProvider);
        let id = context
            .insert("Category")
            .column("Name", "Books")
            .unwrap()
            .execute_return_last_id::<i64>(Some("CategoryId"))
            .unwrap();
        assert_eq!(id, 42);
        assert_eq!(
            journal.entries()[1],
            "execute INSERT INTO Category (Name)\nVALUES (:Name)\nRETURNING CategoryId INTO :sluice_last_id"
        );
    }

    #[test]
    fn output_parameters() {
        let (mut context, _) = context(SqlServerProvider);
        let mut command = context
            .stored_procedure("ProductCount")
            .parameter("CategoryId", 1)
            .unwrap()
            .parameter_out("Count", DbType::Int32, None)
            .unwrap()
            .into_command()
            .unwrap();
        assert!(command.parameter_value::<i32>("Count").is_err());
        command.execute().unwrap();
        assert_eq!(command.parameter_value::<i32>("Count").unwrap(), 42);
        assert_eq!(command.parameter_value::<i32>("CategoryId").unwrap(), 1);
    }
}
