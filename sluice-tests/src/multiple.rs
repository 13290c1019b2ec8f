use crate::catalog::{Category, Product, setup};
use sluice::DbContext;

pub fn multiple(factory: &dyn Fn() -> DbContext) {
    let mut context = factory();
    setup(&mut context);

    let mut command = context
        .multi_result_sql(
            "SELECT * FROM Category ORDER BY CategoryId;
            SELECT * FROM Product WHERE CategoryId = @0 ORDER BY ProductId;
            SELECT COUNT(*) FROM Product;",
        )
        .parameters([2])
        .expect("Failed to add the parameters");
    let categories = command
        .query_as::<Category>()
        .expect("Failed to read the first result set");
    assert_eq!(
        categories.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
        ["Books", "Movies"]
    );
    let movies = command
        .query_as::<Product>()
        .expect("Failed to read the second result set");
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].name, "The Matrix");
    let count = command
        .query_value::<i64>()
        .expect("Failed to read the third result set");
    assert_eq!(count, 3);
    let exhausted = command
        .query()
        .expect("Reading past the last result set is not an error");
    assert!(exhausted.is_empty());

    // Statements not returning rows produce no result set
    let mut command = context.multi_result_sql(
        "UPDATE Product SET Price = NULL WHERE ProductId = 1;
        SELECT Price FROM Product WHERE ProductId = 1",
    );
    let price = command
        .query_single()
        .expect("Failed to read the result set")
        .expect("The product 1 exists");
    assert!(price.values()[0].is_null());
}
