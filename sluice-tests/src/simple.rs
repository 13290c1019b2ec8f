use crate::catalog::setup;
use rust_decimal::Decimal;
use sluice::{DbContext, params};
use time::{Date, Month, PrimitiveDateTime, Time};
use uuid::Uuid;

pub fn simple(factory: &dyn Fn() -> DbContext) {
    let mut context = factory();
    setup(&mut context);

    // Scalars
    let count = context
        .sql("SELECT COUNT(*) FROM Product")
        .query_value::<i64>()
        .expect("Failed to count the products");
    assert_eq!(count, 3);
    let name = context
        .sql("SELECT Name FROM Product WHERE ProductId = @0")
        .parameters(params![2])
        .expect("Failed to add the parameters")
        .query_value::<String>()
        .expect("Failed to query the product name");
    assert_eq!(name, "Bill Gates Bio");
    let missing = context
        .sql("SELECT Name FROM Product WHERE ProductId = @0")
        .parameters(params![99])
        .expect("Failed to add the parameters")
        .query_value::<String>()
        .expect("Failed to query a missing product");
    assert_eq!(missing, "");
    let ids = context
        .sql("SELECT ProductId FROM Product ORDER BY ProductId DESC")
        .query_values::<i32>()
        .expect("Failed to query the product ids");
    assert_eq!(ids, [3, 2, 1]);

    // Dynamic rows
    let rows = context
        .sql("SELECT ProductId, Name, Price FROM Product WHERE CategoryId = @CategoryId ORDER BY ProductId")
        .parameter("CategoryId", 1)
        .expect("Failed to add the parameter")
        .query()
        .expect("Failed to query the products");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].names(), ["ProductId", "Name", "Price"]);
    assert_eq!(rows[0].get::<String>("name").unwrap(), "The Warren Buffet Way");
    assert_eq!(rows[1].get::<Decimal>("PRICE").unwrap(), Decimal::new(1250, 2));
    let row = context
        .sql("SELECT Price FROM Product WHERE ProductId = 3")
        .query_single()
        .expect("Failed to query a single row")
        .expect("The product 3 exists");
    assert_eq!(row.get::<Option<Decimal>>("Price").unwrap(), None);
    assert_eq!(row.get::<Decimal>("Price").unwrap(), Decimal::ZERO);

    // Repeated markers and lists
    let names = context
        .sql("SELECT Name FROM Product WHERE Name LIKE @pattern OR Name LIKE @pattern || '%' ORDER BY Name")
        .parameter("pattern", "The%")
        .expect("Failed to add the parameter")
        .query_values::<String>()
        .expect("Failed to query with a repeated parameter");
    assert_eq!(names, ["The Matrix", "The Warren Buffet Way"]);
    let names = context
        .sql("SELECT Name FROM Product WHERE ProductId IN (@ids) ORDER BY ProductId")
        .parameter("ids", vec![1, 3])
        .expect("Failed to add the list")
        .query_values::<String>()
        .expect("Failed to query with a list");
    assert_eq!(names, ["The Warren Buffet Way", "The Matrix"]);
    let none = context
        .sql("SELECT Name FROM Product WHERE ProductId IN (@ids)")
        .parameter("ids", Vec::<i32>::new())
        .expect("Failed to add the empty list")
        .query_values::<String>()
        .expect("Failed to query with an empty list");
    assert!(none.is_empty());

    // Literals are not parameters
    let literal = context
        .sql("SELECT '@0' || @0")
        .parameters(params!["!"])
        .expect("Failed to add the parameters")
        .query_value::<String>()
        .expect("Failed to query a literal");
    assert_eq!(literal, "@0!");

    // Types
    for sql in [
        "DROP TABLE IF EXISTS Types",
        "CREATE TABLE Types (
            Flag BOOLEAN,
            Small SMALLINT,
            Big BIGINT,
            Ratio DOUBLE PRECISION,
            Code CHAR(36),
            Day DATE,
            Moment TIME,
            Stamp TIMESTAMP,
            Payload BLOB
        )",
    ] {
        context
            .sql(sql)
            .execute()
            .expect("Failed to create the Types table");
    }
    let code = Uuid::new_v4();
    let day = Date::from_calendar_date(2024, Month::February, 29).unwrap();
    let moment = Time::from_hms_milli(13, 5, 9, 250).unwrap();
    let stamp = PrimitiveDateTime::new(day, moment);
    let inserted = context
        .insert("Types")
        .column("Flag", true)
        .and_then(|v| v.column("Small", -2i16))
        .and_then(|v| v.column("Big", 9_876_543_210i64))
        .and_then(|v| v.column("Ratio", 0.5f64))
        .and_then(|v| v.column("Code", code))
        .and_then(|v| v.column("Day", day))
        .and_then(|v| v.column("Moment", moment))
        .and_then(|v| v.column("Stamp", stamp))
        .and_then(|v| v.column("Payload", Box::<[u8]>::from([1u8, 2, 3])))
        .expect("Failed to add the columns")
        .execute()
        .expect("Failed to insert into Types");
    assert_eq!(inserted, 1);
    let row = context
        .sql("SELECT * FROM Types")
        .query_single()
        .expect("Failed to query Types")
        .expect("The Types row exists");
    assert!(row.get::<bool>("Flag").unwrap());
    assert_eq!(row.get::<i16>("Small").unwrap(), -2);
    assert_eq!(row.get::<i64>("Big").unwrap(), 9_876_543_210);
    assert_eq!(row.get::<f64>("Ratio").unwrap(), 0.5);
    assert_eq!(row.get::<Uuid>("Code").unwrap(), code);
    assert_eq!(row.get::<Date>("Day").unwrap(), day);
    assert_eq!(row.get::<Time>("Moment").unwrap(), moment);
    assert_eq!(row.get::<PrimitiveDateTime>("Stamp").unwrap(), stamp);
    assert_eq!(row.get::<Box<[u8]>>("Payload").unwrap().as_ref(), [1, 2, 3]);

    // Nulls convert to defaults
    context
        .sql("DELETE FROM Types")
        .execute()
        .expect("Failed to clear Types");
    context
        .sql("INSERT INTO Types (Flag) VALUES (NULL)")
        .execute()
        .expect("Failed to insert nulls");
    let row = context
        .sql("SELECT * FROM Types")
        .query_single()
        .expect("Failed to query Types")
        .expect("The Types row exists");
    assert!(!row.get::<bool>("Flag").unwrap());
    assert_eq!(row.get::<i64>("Big").unwrap(), 0);
    assert_eq!(row.get::<Option<Uuid>>("Code").unwrap(), None);
    assert_eq!(row.get::<Uuid>("Code").unwrap(), Uuid::nil());
    assert_eq!(row.get::<Time>("Moment").unwrap(), Time::MIDNIGHT);
}
