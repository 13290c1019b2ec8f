use crate::catalog::{Category, Product, setup};
use rust_decimal::Decimal;
use sluice::{DbContext, ErrorKind};
use std::collections::BTreeMap;

const PRODUCTS_WITH_CATEGORY: &str = "
    SELECT p.*, c.CategoryId AS Category_CategoryId, c.Name AS Category_Name
    FROM Product p
    INNER JOIN Category c ON c.CategoryId = p.CategoryId
    ORDER BY p.ProductId";

/// Products indexed by name.
#[derive(Default)]
struct Shelf(BTreeMap<String, Product>);

impl Extend<Product> for Shelf {
    fn extend<I: IntoIterator<Item = Product>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(|v| (v.name.clone(), v)));
    }
}

pub fn mapping(factory: &dyn Fn() -> DbContext) {
    let mut context = factory();
    setup(&mut context);

    // Auto map with children
    let products = context
        .sql(PRODUCTS_WITH_CATEGORY)
        .query_as::<Product>()
        .expect("Failed to query the products");
    assert_eq!(products.len(), 3);
    assert_eq!(
        products[0],
        Product {
            id: 1,
            name: "The Warren Buffet Way".into(),
            price: Some(Decimal::new(1999, 2)),
            category_id: 1,
            category: Some(Category {
                id: 1,
                name: "Books".into(),
            }),
        }
    );
    assert_eq!(products[2].price, None);
    assert_eq!(
        products[2].category.as_ref().map(|v| v.name.as_str()),
        Some("Movies")
    );
    let product = context
        .sql("SELECT ProductId, Name FROM Product WHERE ProductId = @0")
        .parameters([2])
        .expect("Failed to add the parameters")
        .query_single_as::<Product>()
        .expect("Failed to query a single product")
        .expect("The product 2 exists");
    assert_eq!(product.name, "Bill Gates Bio");
    assert_eq!(product.category, None, "No column creates the child");
    let nothing = context
        .sql("SELECT * FROM Product WHERE ProductId < 0")
        .query_single_as::<Product>()
        .expect("Failed to query an empty result");
    assert_eq!(nothing, None);

    // Unmatched columns
    let lenient = context
        .sql("SELECT ProductId, Name, 'x' AS Unknown FROM Product ORDER BY ProductId")
        .query_as::<Product>()
        .expect("Unmatched columns are skipped unless strict");
    assert_eq!(lenient.len(), 3);
    let mut strict = factory().throw_on_auto_map_failure(true);
    let error = strict
        .sql("SELECT ProductId, Name, 'x' AS Unknown FROM Product")
        .query_as::<Product>()
        .expect_err("Unmatched columns fail when strict");
    assert!(
        matches!(error.kind(), ErrorKind::AutoMapFailure { column, .. } if column == "Unknown"),
        "Unexpected error: {error:#}"
    );
    assert!(error.sql().is_some_and(|v| v.contains("Unknown")));
    let error = context
        .sql("SELECT 'abc' AS ProductId")
        .query_as::<Product>()
        .expect_err("Text is not an integer");
    assert!(matches!(error.kind(), ErrorKind::Conversion(..)));

    // Auto map then customize
    let products = context
        .sql("SELECT p.*, c.Name AS CategoryName FROM Product p JOIN Category c USING (CategoryId) ORDER BY p.ProductId")
        .query_as_with::<Product>(|row, product| {
            product.category = Some(Category {
                id: product.category_id,
                name: row.get("CategoryName")?,
            });
            Ok(())
        })
        .expect("Failed to query with a custom mapping");
    assert_eq!(
        products
            .iter()
            .filter_map(|v| v.category.as_ref())
            .map(|v| v.name.as_str())
            .collect::<Vec<_>>(),
        ["Books", "Books", "Movies"]
    );

    // Manual mapping
    let labels = context
        .sql("SELECT Name, Price FROM Product ORDER BY ProductId")
        .query_no_auto_map(|row| {
            Ok(format!(
                "{}: {}",
                row.get::<String>("Name")?,
                row.get::<Option<Decimal>>("Price")?
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "n/a".into())
            ))
        })
        .expect("Failed to query without auto map");
    assert_eq!(labels[2], "The Matrix: n/a");
    assert!(labels[1].starts_with("Bill Gates Bio: 12.5"));

    // Rows folded into a custom structure
    let mut categories = BTreeMap::<String, Vec<String>>::new();
    context
        .sql(PRODUCTS_WITH_CATEGORY)
        .query_complex(&mut categories, |row, categories| {
            categories
                .entry(row.get("Category_Name")?)
                .or_default()
                .push(row.get("Name")?);
            Ok(())
        })
        .expect("Failed to run the complex query");
    assert_eq!(
        categories.get("Books").map(Vec::len),
        Some(2),
        "{categories:?}"
    );
    assert_eq!(categories["Movies"], ["The Matrix"]);

    // Custom collection
    let shelf = context
        .sql(PRODUCTS_WITH_CATEGORY)
        .query_into::<Product, Shelf>()
        .expect("Failed to query into a custom collection");
    assert_eq!(
        shelf.0.keys().collect::<Vec<_>>(),
        ["Bill Gates Bio", "The Matrix", "The Warren Buffet Way"]
    );
    assert_eq!(shelf.0["The Matrix"].id, 3);
}
