#[cfg(test)]
mod tests {
    use indoc::indoc;
    use sluice::{
        BuilderData, CommandKind, IdentityRetrieval, IsolationLevel, LAST_INSERTED_ID,
        MySqlProvider, OracleProvider, Paging, PostgresProvider, Provider, SqlServerProvider,
        SqliteProvider, Value,
    };

    fn select() -> BuilderData {
        BuilderData {
            select: "p.*, c.Name AS Category_Name".into(),
            from: "Product p\nINNER JOIN Category c ON c.CategoryId = p.CategoryId".into(),
            where_sql: "p.Price > @0".into(),
            order_by: "p.Name".into(),
            ..Default::default()
        }
    }

    fn render(provider: &dyn Provider, data: &BuilderData) -> String {
        let mut out = String::new();
        provider.write_select(&mut out, data);
        out
    }

    #[test]
    fn select_unpaged() {
        let data = BuilderData {
            select: "CategoryId, COUNT(*) AS Products".into(),
            from: "Product".into(),
            where_sql: "Price > 10".into(),
            group_by: "CategoryId".into(),
            having: "COUNT(*) > 1".into(),
            order_by: "Products DESC".into(),
            ..Default::default()
        };
        let expected = indoc! {"
            SELECT CategoryId, COUNT(*) AS Products
            FROM Product
            WHERE Price > 10
            GROUP BY CategoryId
            HAVING COUNT(*) > 1
            ORDER BY Products DESC
        "}
        .trim();
        for provider in [
            &SqlServerProvider as &dyn Provider,
            &OracleProvider,
            &PostgresProvider,
            &MySqlProvider,
            &SqliteProvider,
        ] {
            assert_eq!(render(provider, &data), expected, "{}", provider.name());
        }
    }

    #[test]
    fn select_omits_empty_clauses() {
        let data = BuilderData {
            select: "1".into(),
            ..Default::default()
        };
        assert_eq!(render(&PostgresProvider, &data), "SELECT 1");
        let data = BuilderData {
            select: "*".into(),
            from: "Product".into(),
            order_by: "Name".into(),
            ..Default::default()
        };
        assert_eq!(render(&SqliteProvider, &data), "SELECT *\nFROM Product\nORDER BY Name");
    }

    #[test]
    fn select_paged_row_number() {
        let mut data = select();
        data.paging = Some(Paging::new(2, 10));
        assert_eq!(
            render(&SqlServerProvider, &data),
            indoc! {"
                SELECT * FROM (
                SELECT p.*, c.Name AS Category_Name, ROW_NUMBER() OVER (ORDER BY p.Name) AS sluice_row_number
                FROM Product p
                INNER JOIN Category c ON c.CategoryId = p.CategoryId
                WHERE p.Price > @0
                ) AS sluice_page
                WHERE sluice_row_number BETWEEN 11 AND 20
                ORDER BY sluice_row_number
            "}
            .trim()
        );
        data.order_by.clear();
        data.paging = Some(Paging::new(1, 25));
        assert_eq!(
            render(&OracleProvider, &data),
            indoc! {"
                SELECT * FROM (
                SELECT p.*, c.Name AS Category_Name, ROW_NUMBER() OVER (ORDER BY NULL) AS sluice_row_number
                FROM Product p
                INNER JOIN Category c ON c.CategoryId = p.CategoryId
                WHERE p.Price > @0
                ) sluice_page
                WHERE sluice_row_number BETWEEN 1 AND 25
                ORDER BY sluice_row_number
            "}
            .trim()
        );
        assert!(render(&SqlServerProvider, &data).contains("OVER (ORDER BY (SELECT NULL))"));
    }

    #[test]
    fn select_paged_limit() {
        let mut data = select();
        data.paging = Some(Paging::new(3, 20));
        let unpaged = indoc! {"
            SELECT p.*, c.Name AS Category_Name
            FROM Product p
            INNER JOIN Category c ON c.CategoryId = p.CategoryId
            WHERE p.Price > @0
            ORDER BY p.Name
        "}
        .trim();
        assert_eq!(
            render(&PostgresProvider, &data),
            format!("{unpaged}\nLIMIT 20 OFFSET 40")
        );
        assert_eq!(
            render(&SqliteProvider, &data),
            format!("{unpaged}\nLIMIT 20 OFFSET 40")
        );
        assert_eq!(render(&MySqlProvider, &data), format!("{unpaged}\nLIMIT 40, 20"));
    }

    #[test]
    fn paging_window() {
        let paging = Paging::new(0, 10);
        assert_eq!((paging.first_row(), paging.last_row()), (1, 10));
        let paging = Paging::new(4, 5);
        assert_eq!((paging.first_row(), paging.last_row(), paging.offset()), (16, 20, 15));

        let mut data = select();
        data.paging = Some(Paging::new(2, 0));
        assert!(!data.is_paged());
        assert!(!render(&MySqlProvider, &data).contains("LIMIT"));
    }

    #[test]
    fn paging_window_saturates() {
        let paging = Paging::new(u64::MAX / 2, 10);
        assert_eq!(paging.last_row(), u64::MAX);
        assert_eq!(paging.offset(), u64::MAX);
        assert_eq!(paging.first_row(), u64::MAX);
        let paging = Paging::new(u64::MAX, u64::MAX);
        assert_eq!((paging.first_row(), paging.last_row()), (u64::MAX, u64::MAX));

        let mut data = select();
        data.paging = Some(Paging::new(u64::MAX / 2, 10));
        assert!(
            render(&SqliteProvider, &data).ends_with(&format!("LIMIT 10 OFFSET {}", u64::MAX))
        );
        assert!(render(&SqlServerProvider, &data).contains(&format!(
            "BETWEEN {0} AND {0}",
            u64::MAX
        )));
    }

    #[test]
    fn select_paged_star() {
        let data = BuilderData {
            select: "*".into(),
            from: "Product".into(),
            where_sql: "Price > @0".into(),
            order_by: "Name".into(),
            paging: Some(Paging::new(1, 10)),
            ..Default::default()
        };
        assert_eq!(
            render(&OracleProvider, &data),
            indoc! {"
                SELECT * FROM (
                SELECT sluice_source.*, ROW_NUMBER() OVER (ORDER BY Name) AS sluice_row_number
                FROM (
                SELECT *
                FROM Product
                WHERE Price > @0
                ) sluice_source
                ) sluice_page
                WHERE sluice_row_number BETWEEN 1 AND 10
                ORDER BY sluice_row_number
            "}
            .trim()
        );
        assert!(
            render(&SqlServerProvider, &data)
                .contains("SELECT *, ROW_NUMBER() OVER (ORDER BY Name) AS sluice_row_number")
        );
    }

    #[test]
    fn insert() {
        let mut data = BuilderData::new("Product");
        data.column("Name", "The Warren Buffet Way".into()).unwrap();
        data.column("Unit Price", 19.99.into()).unwrap();
        data.column("CategoryId", 1.into()).unwrap();
        let render = |provider: &dyn Provider| {
            let mut out = String::new();
            provider.write_insert(&mut out, &data);
            out
        };
        assert_eq!(
            render(&SqlServerProvider),
            indoc! {"
                INSERT INTO Product ([Name], [Unit Price], [CategoryId])
                VALUES (@Name, @Unit_Price, @CategoryId)
            "}
            .trim()
        );
        assert_eq!(
            render(&PostgresProvider),
            indoc! {r#"
                INSERT INTO Product ("Name", "Unit Price", "CategoryId")
                VALUES (@Name, @Unit_Price, @CategoryId)
            "#}
            .trim()
        );
        assert_eq!(
            render(&MySqlProvider),
            indoc! {"
                INSERT INTO Product (`Name`, `Unit Price`, `CategoryId`)
                VALUES (@Name, @Unit_Price, @CategoryId)
            "}
            .trim()
        );
        assert_eq!(
            render(&OracleProvider),
            indoc! {"
                INSERT INTO Product (Name, Unit Price, CategoryId)
                VALUES (@Name, @Unit_Price, @CategoryId)
            "}
            .trim()
        );

        let mut sql = String::new();
        PostgresProvider.write_insert(&mut sql, &data);
        let statement = PostgresProvider
            .prepare(&sql, CommandKind::Text, &data.parameters)
            .unwrap();
        assert_eq!(
            statement.text,
            indoc! {r#"
                INSERT INTO Product ("Name", "Unit Price", "CategoryId")
                VALUES ($1, $2, $3)
            "#}
            .trim()
        );
        assert_eq!(statement.parameters[1].value, Value::Float64(Some(19.99)));
    }

    #[test]
    fn update_and_delete() {
        let mut data = BuilderData::new("Product");
        data.column("Name", "Book".into()).unwrap();
        data.column("CategoryId", 2.into()).unwrap();
        data.where_column("ProductId", 1.into()).unwrap();
        data.where_column("Version", 7.into()).unwrap();
        let mut out = String::new();
        SqlServerProvider.write_update(&mut out, &data);
        assert_eq!(
            out,
            indoc! {"
                UPDATE Product
                SET [Name] = @Name, [CategoryId] = @CategoryId
                WHERE [ProductId] = @ProductId AND [Version] = @Version
            "}
            .trim()
        );

        let mut data = BuilderData::new("Product");
        data.where_column("ProductId", 1.into()).unwrap();
        let mut out = String::new();
        MySqlProvider.write_delete(&mut out, &data);
        assert_eq!(out, "DELETE FROM Product\nWHERE `ProductId` = @ProductId");

        let data = BuilderData::new("Product");
        let mut out = String::new();
        SqliteProvider.write_delete(&mut out, &data);
        assert_eq!(out, "DELETE FROM Product");
    }

    #[test]
    fn identifier_escaping() {
        let quoted = |provider: &dyn Provider, value: &str| {
            let mut out = String::new();
            provider.write_identifier_quoted(&mut out, value);
            out
        };
        assert_eq!(quoted(&SqlServerProvider, "odd]name"), "[odd]]name]");
        assert_eq!(quoted(&PostgresProvider, r#"say "hi""#), r#""say ""hi""""#);
        assert_eq!(quoted(&MySqlProvider, "a`b"), "`a``b`");
        assert_eq!(quoted(&OracleProvider, "Name"), "Name");
    }

    #[test]
    fn stored_procedure() {
        let mut data = BuilderData::new("ProductUpdate");
        data.parameters
            .push(sluice::Parameter::new("ProductId", 1))
            .unwrap();
        data.parameters
            .push(sluice::Parameter::new("Name", "Book"))
            .unwrap();
        let call = |provider: &dyn Provider| {
            let mut out = String::new();
            let kind = provider.write_stored_procedure(&mut out, &data);
            (out, kind)
        };
        assert_eq!(
            call(&SqlServerProvider),
            ("ProductUpdate".into(), CommandKind::StoredProcedure)
        );
        assert_eq!(
            call(&OracleProvider),
            ("ProductUpdate".into(), CommandKind::StoredProcedure)
        );
        assert_eq!(
            call(&PostgresProvider),
            (
                "CALL ProductUpdate(@ProductId, @Name)".into(),
                CommandKind::Text
            )
        );
        let (sql, kind) = call(&MySqlProvider);
        let statement = MySqlProvider.prepare(&sql, kind, &data.parameters).unwrap();
        assert_eq!(statement.text, "CALL ProductUpdate(?, ?)");
    }

    #[test]
    fn last_insert_id() {
        let append = |provider: &dyn Provider, column: Option<&str>| {
            let mut out = String::from("INSERT INTO Category (Name)\nVALUES (@Name)");
            let retrieval = provider.write_last_insert_id(&mut out, column);
            (out, retrieval)
        };
        assert_eq!(
            append(&SqlServerProvider, None),
            (
                indoc! {"
                    INSERT INTO Category (Name)
                    VALUES (@Name);
                    SELECT CAST(SCOPE_IDENTITY() AS BIGINT)
                "}
                .trim()
                .into(),
                IdentityRetrieval::Batch
            )
        );
        assert_eq!(
            append(&MySqlProvider, None).0,
            "INSERT INTO Category (Name)\nVALUES (@Name);\nSELECT LAST_INSERT_ID()"
        );
        assert_eq!(
            append(&SqliteProvider, None).0,
            "INSERT INTO Category (Name)\nVALUES (@Name);\nSELECT last_insert_rowid()"
        );
        assert_eq!(
            append(&PostgresProvider, Some("CategoryId")),
            (
                "INSERT INTO Category (Name)\nVALUES (@Name)\nRETURNING CategoryId".into(),
                IdentityRetrieval::Returning
            )
        );
        assert_eq!(
            append(&OracleProvider, Some("CategoryId")),
            (
                format!(
                    "INSERT INTO Category (Name)\nVALUES (@Name)\nRETURNING CategoryId INTO @{LAST_INSERTED_ID}"
                ),
                IdentityRetrieval::OutputParameter(LAST_INSERTED_ID)
            )
        );
    }

    #[test]
    fn transactions() {
        let begin = |provider: &dyn Provider, isolation: IsolationLevel| {
            let mut out = String::new();
            provider.write_transaction_begin(&mut out, isolation);
            out
        };
        assert_eq!(
            begin(&SqlServerProvider, IsolationLevel::Snapshot),
            "SET TRANSACTION ISOLATION LEVEL SNAPSHOT;\nBEGIN TRANSACTION"
        );
        assert_eq!(
            begin(&PostgresProvider, IsolationLevel::ReadCommitted),
            "BEGIN TRANSACTION ISOLATION LEVEL READ COMMITTED"
        );
        assert_eq!(
            begin(&PostgresProvider, IsolationLevel::Snapshot),
            "BEGIN TRANSACTION ISOLATION LEVEL REPEATABLE READ"
        );
        assert_eq!(
            begin(&MySqlProvider, IsolationLevel::Serializable),
            "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE;\nSTART TRANSACTION"
        );
        assert_eq!(
            begin(&OracleProvider, IsolationLevel::RepeatableRead),
            "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE"
        );
        assert_eq!(begin(&SqliteProvider, IsolationLevel::ReadUncommitted), "BEGIN");

        let mut out = String::new();
        SqlServerProvider.write_transaction_commit(&mut out);
        assert_eq!(out, "COMMIT TRANSACTION");
        let mut out = String::new();
        PostgresProvider.write_transaction_rollback(&mut out);
        assert_eq!(out, "ROLLBACK");
    }
}
