use crate::catalog::{Category, Product, setup};
use rust_decimal::Decimal;
use sluice::{DbContext, ErrorKind, SqlServerProvider};
use std::sync::Arc;

pub fn builders(factory: &dyn Fn() -> DbContext) {
    let mut context = factory();
    setup(&mut context);

    // Select
    let books = context
        .select::<Product>("p.*, c.CategoryId AS Category_CategoryId, c.Name AS Category_Name")
        .from("Product p INNER JOIN Category c ON c.CategoryId = p.CategoryId")
        .where_sql("p.CategoryId = @CategoryId")
        .parameter("CategoryId", 1)
        .expect("Failed to add the parameter")
        .order_by("p.Name")
        .query()
        .expect("Failed to select the books");
    assert_eq!(
        books.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
        ["Bill Gates Bio", "The Warren Buffet Way"]
    );
    assert!(books.iter().all(|v| v.category.as_ref().is_some_and(|v| v.name == "Books")));
    let counts = context
        .select::<Category>("CategoryId, COUNT(*) AS Name")
        .from("Product")
        .group_by("CategoryId")
        .having("COUNT(*) > 1")
        .query()
        .expect("Failed to select with a group");
    assert_eq!(counts, [Category { id: 1, name: "2".into() }]);
    let single = context
        .select::<Product>("*")
        .from("Product")
        .where_sql("ProductId = @0")
        .parameters([3])
        .expect("Failed to add the parameters")
        .query_single()
        .expect("Failed to select a single product")
        .expect("The product 3 exists");
    assert_eq!(single.name, "The Matrix");

    // Paging
    for (page, expected) in [
        (1, &["Bill Gates Bio", "The Matrix"][..]),
        (2, &["The Warren Buffet Way"][..]),
        (3, &[][..]),
    ] {
        let names = context
            .select::<Product>("Name")
            .from("Product")
            .order_by("Name")
            .paging(page, 2)
            .query()
            .expect("Failed to select a page")
            .into_iter()
            .map(|v| v.name)
            .collect::<Vec<_>>();
        assert_eq!(names, expected, "Page {page}");
    }

    // Row numbered pages map strictly
    let mut numbered = factory()
        .provider(Arc::new(SqlServerProvider))
        .throw_on_auto_map_failure(true);
    for (page, size, expected) in [(1, 2, &["Books", "Movies"][..]), (2, 1, &["Movies"][..])] {
        let names = numbered
            .select::<Category>("CategoryId, Name")
            .from("Category")
            .order_by("Name")
            .paging(page, size)
            .query()
            .expect("Failed to select a row numbered page")
            .into_iter()
            .map(|v| v.name)
            .collect::<Vec<_>>();
        assert_eq!(names, expected, "Page {page}");
    }
    let rows = context
        .select::<Product>("ProductId")
        .from("Product")
        .order_by("ProductId DESC")
        .paging(1, 1)
        .query_rows()
        .expect("Failed to select a page of rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get::<i64>("ProductId").unwrap(), 3);

    // Insert
    let id = context
        .insert("Product")
        .column("Name", "Rework")
        .and_then(|v| v.column("Price", Decimal::new(2500, 2)))
        .and_then(|v| v.column("CategoryId", 1))
        .expect("Failed to add the columns")
        .execute_return_last_id::<i64>(None)
        .expect("Failed to insert returning the id");
    assert_eq!(id, 4);
    let mut product = Product {
        id: 10,
        name: "The Dark Knight".into(),
        price: Some(Decimal::new(999, 2)),
        category_id: 2,
        category: None,
    };
    let inserted = context
        .insert("Product")
        .auto_map(&product, &[])
        .expect("Failed to auto map the product")
        .execute()
        .expect("Failed to insert the product");
    assert_eq!(inserted, 1);
    let error = context
        .insert("Product")
        .column("Name", "a")
        .and_then(|v| v.column("name", "b"))
        .err()
        .expect("A column cannot be added twice");
    assert!(matches!(error.kind(), ErrorKind::DuplicateParameterName(..)));

    // Update
    product.name = "The Dark Knight Rises".into();
    product.price = None;
    let updated = context
        .update("Product")
        .auto_map(&product, &["ProductId"])
        .and_then(|v| v.where_column("ProductId", product.id))
        .expect("Failed to build the update")
        .execute()
        .expect("Failed to update the product");
    assert_eq!(updated, 1);
    let loaded = context
        .select::<Product>("*")
        .from("Product")
        .where_sql("ProductId = @0")
        .parameters([10])
        .expect("Failed to add the parameters")
        .query_single()
        .expect("Failed to select the updated product");
    assert_eq!(loaded, Some(product));
    let updated = context
        .update("Product")
        .column("Price", Decimal::new(1000, 2))
        .and_then(|v| v.where_column("CategoryId", 1))
        .expect("Failed to build the update")
        .execute()
        .expect("Failed to update the books");
    assert_eq!(updated, 3);
    let error = context
        .update("Product")
        .column("Name", "x")
        .and_then(|v| v.where_column("Name", "y"))
        .err()
        .expect("A column cannot be both set and filtered");
    assert!(matches!(error.kind(), ErrorKind::DuplicateParameterName(..)));

    // Delete
    let deleted = context
        .delete("Product")
        .where_column("CategoryId", 1)
        .expect("Failed to add the condition")
        .execute()
        .expect("Failed to delete the books");
    assert_eq!(deleted, 3);
    let deleted = context
        .delete("Product")
        .where_column("ProductId", 42)
        .expect("Failed to add the condition")
        .execute()
        .expect("Failed to delete a missing product");
    assert_eq!(deleted, 0);
    let left = context
        .sql("SELECT COUNT(*) FROM Product")
        .query_value::<i64>()
        .expect("Failed to count the products");
    assert_eq!(left, 2);
}
