#[cfg(test)]
mod tests {
    use sluice_core::{
        CommandKind, DbType, Direction, ErrorKind, MySqlProvider, OracleProvider, Parameter,
        Parameters, PostgresProvider, Provider, SqlServerProvider, SqliteProvider, Value,
    };

    fn unnamed(values: impl IntoIterator<Item = Value>) -> Parameters {
        let mut result = Parameters::new();
        for value in values {
            result.push_unnamed(value).unwrap();
        }
        result
    }

    fn names(provider: &dyn Provider, sql: &str, parameters: &Parameters) -> (String, Vec<String>) {
        let statement = provider
            .prepare(sql, CommandKind::Text, parameters)
            .unwrap();
        (
            statement.text,
            statement.parameters.into_iter().map(|v| v.name).collect(),
        )
    }

    #[test]
    fn marker_styles() {
        let parameters = unnamed([1.into(), "Ten".into()]);
        let sql = "SELECT * FROM t WHERE a = @0 AND b = @1";
        assert_eq!(
            names(&SqlServerProvider, sql, &parameters),
            (sql.to_string(), vec!["@0".into(), "@1".into()])
        );
        assert_eq!(
            names(&SqliteProvider, sql, &parameters),
            (sql.to_string(), vec!["@0".into(), "@1".into()])
        );
        assert_eq!(
            names(&OracleProvider, sql, &parameters),
            (
                "SELECT * FROM t WHERE a = :0 AND b = :1".into(),
                vec![":0".into(), ":1".into()]
            )
        );
        assert_eq!(
            names(&PostgresProvider, sql, &parameters),
            (
                "SELECT * FROM t WHERE a = $1 AND b = $2".into(),
                vec!["$1".into(), "$2".into()]
            )
        );
        assert_eq!(
            names(&MySqlProvider, sql, &parameters),
            (
                "SELECT * FROM t WHERE a = ? AND b = ?".into(),
                vec!["?".into(), "?".into()]
            )
        );
    }

    #[test]
    fn unnamed_parameters_follow_insertion() {
        let mut parameters = unnamed([10.into(), 20.into()]);
        parameters.push_unnamed(30.into()).unwrap();
        let statement = PostgresProvider
            .prepare("SELECT @2, @0", CommandKind::Text, &parameters)
            .unwrap();
        assert_eq!(statement.text, "SELECT $1, $2");
        assert_eq!(statement.parameters[0].value, Value::Int32(Some(30)));
        assert_eq!(statement.parameters[0].source, "2");
        assert_eq!(statement.parameters[1].value, Value::Int32(Some(10)));
    }

    #[test]
    fn repeated_markers() {
        let mut parameters = Parameters::new();
        parameters.push(Parameter::new("Name", "a%")).unwrap();
        let sql = "SELECT * FROM t WHERE x LIKE @Name OR y LIKE @name";

        let statement = PostgresProvider
            .prepare(sql, CommandKind::Text, &parameters)
            .unwrap();
        assert_eq!(statement.text, "SELECT * FROM t WHERE x LIKE $1 OR y LIKE $1");
        assert_eq!(statement.parameters.len(), 1);

        let statement = MySqlProvider
            .prepare(sql, CommandKind::Text, &parameters)
            .unwrap();
        assert_eq!(statement.text, "SELECT * FROM t WHERE x LIKE ? OR y LIKE ?");
        assert_eq!(statement.parameters.len(), 2);
        assert!(statement.parameters.iter().all(|v| v.source == "Name"));

        let statement = SqlServerProvider
            .prepare(sql, CommandKind::Text, &parameters)
            .unwrap();
        assert_eq!(statement.text, "SELECT * FROM t WHERE x LIKE @Name OR y LIKE @Name");
        assert_eq!(statement.parameters.len(), 1);
    }

    #[test]
    fn unreferenced_parameters() {
        let mut parameters = Parameters::new();
        parameters.push(Parameter::new("Used", 1)).unwrap();
        parameters.push(Parameter::new("Unused", 2)).unwrap();
        let sql = "SELECT @Used";
        assert_eq!(
            names(&SqlServerProvider, sql, &parameters).1,
            ["@Used", "@Unused"]
        );
        assert_eq!(names(&MySqlProvider, sql, &parameters).1, ["?"]);
        assert_eq!(names(&PostgresProvider, sql, &parameters).1, ["$1"]);
    }

    #[test]
    fn list_expansion() {
        let mut parameters = Parameters::new();
        parameters
            .push(Parameter::new("ids", vec![1, 2, 3]))
            .unwrap();
        parameters.push(Parameter::new("name", "x")).unwrap();
        let sql = "SELECT * FROM t WHERE id IN (@ids) AND name = @name";

        let statement = SqlServerProvider
            .prepare(sql, CommandKind::Text, &parameters)
            .unwrap();
        assert_eq!(
            statement.text,
            "SELECT * FROM t WHERE id IN (@idsp0, @idsp1, @idsp2) AND name = @name"
        );
        assert_eq!(
            statement
                .parameters
                .iter()
                .map(|v| (v.source.as_str(), v.db_type))
                .collect::<Vec<_>>(),
            [
                ("idsp0", DbType::Int32),
                ("idsp1", DbType::Int32),
                ("idsp2", DbType::Int32),
                ("name", DbType::String),
            ]
        );

        let statement = PostgresProvider
            .prepare(sql, CommandKind::Text, &parameters)
            .unwrap();
        assert_eq!(
            statement.text,
            "SELECT * FROM t WHERE id IN ($1, $2, $3) AND name = $4"
        );
    }

    #[test]
    fn empty_list() {
        let mut parameters = Parameters::new();
        parameters
            .push(Parameter::new("ids", Vec::<i64>::new()))
            .unwrap();
        let statement = SqlServerProvider
            .prepare("SELECT * FROM t WHERE id IN (@ids)", CommandKind::Text, &parameters)
            .unwrap();
        assert_eq!(statement.text, "SELECT * FROM t WHERE id IN (NULL)");
        assert!(statement.parameters.is_empty());
    }

    #[test]
    fn unsupported_parameter_type() {
        let nested = Value::List(
            Some(vec![vec![1].into()]),
            Box::new(Value::List(None, Box::new(Value::Int32(None)))),
        );
        let mut parameters = Parameters::new();
        parameters.push(Parameter::new("nested", nested)).unwrap();
        let error = SqliteProvider
            .prepare("SELECT @nested", CommandKind::Text, &parameters)
            .unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::UnsupportedParameterType(name) if name == "nested"
        ));
    }

    #[test]
    fn duplicate_parameter_name() {
        let mut parameters = Parameters::new();
        parameters.push(Parameter::new("Id", 1)).unwrap();
        let error = parameters.push(Parameter::new("ID", 2)).unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::DuplicateParameterName(name) if name == "ID"
        ));
        assert_eq!(parameters.len(), 1);
    }

    #[test]
    fn resolved_types() {
        let mut parameters = Parameters::new();
        parameters.push(Parameter::new("flag", true)).unwrap();
        parameters.push(Parameter::new("missing", Value::Null)).unwrap();
        parameters
            .push(Parameter::new("id", uuid::Uuid::nil()))
            .unwrap();
        parameters
            .push(Parameter::output("total", DbType::Decimal, None))
            .unwrap();
        let sql = "SELECT @flag, @missing, @id, @total";

        let statement = SqlServerProvider
            .prepare(sql, CommandKind::Text, &parameters)
            .unwrap();
        assert_eq!(
            statement
                .parameters
                .iter()
                .map(|v| v.db_type)
                .collect::<Vec<_>>(),
            [DbType::Boolean, DbType::Null, DbType::Guid, DbType::Decimal]
        );
        assert_eq!(statement.parameters[3].direction, Direction::Output);

        let statement = OracleProvider
            .prepare(sql, CommandKind::Text, &parameters)
            .unwrap();
        assert_eq!(statement.parameters[0].db_type, DbType::Int16);
        assert_eq!(statement.parameters[2].db_type, DbType::Binary);

        let statement = MySqlProvider
            .prepare(sql, CommandKind::Text, &parameters)
            .unwrap();
        assert_eq!(statement.parameters[2].db_type, DbType::StringFixedLength);
    }

    #[test]
    fn stored_procedure() {
        let mut parameters = Parameters::new();
        parameters.push(Parameter::new("CategoryId", 1)).unwrap();
        parameters
            .push(Parameter::output("Count", DbType::Int32, None))
            .unwrap();
        let statement = SqlServerProvider
            .prepare("ProductsByCategory", CommandKind::StoredProcedure, &parameters)
            .unwrap();
        assert_eq!(statement.text, "ProductsByCategory");
        assert_eq!(statement.kind, CommandKind::StoredProcedure);
        assert_eq!(
            statement
                .parameters
                .iter()
                .map(|v| v.name.as_str())
                .collect::<Vec<_>>(),
            ["@CategoryId", "@Count"]
        );
        assert_eq!(statement.parameter_value("count"), Some(&Value::Null));
    }

    #[test]
    fn markers_left_alone() {
        let mut parameters = Parameters::new();
        parameters.push(Parameter::new("id", 5)).unwrap();
        let statement = PostgresProvider
            .prepare(
                "SELECT @@ROWCOUNT, '@id', @other, @id -- @id",
                CommandKind::Text,
                &parameters,
            )
            .unwrap();
        assert_eq!(statement.text, "SELECT @@ROWCOUNT, '@id', @other, $1 -- @id");
        assert_eq!(statement.parameters.len(), 1);
    }
}
