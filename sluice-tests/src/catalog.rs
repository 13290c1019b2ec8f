use rust_decimal::Decimal;
use sluice::{DbContext, Entity};

#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub(crate) struct Category {
    #[sluice(name = "CategoryId")]
    pub(crate) id: i64,
    #[sluice(name = "Name")]
    pub(crate) name: String,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub(crate) struct Product {
    #[sluice(name = "ProductId")]
    pub(crate) id: i64,
    #[sluice(name = "Name")]
    pub(crate) name: String,
    #[sluice(name = "Price")]
    pub(crate) price: Option<Decimal>,
    #[sluice(name = "CategoryId")]
    pub(crate) category_id: i64,
    #[sluice(name = "Category", child)]
    pub(crate) category: Option<Category>,
}

/// Recreates the `Category` and `Product` tables with a few rows.
pub(crate) fn setup(context: &mut DbContext) {
    for sql in [
        "DROP TABLE IF EXISTS Product",
        "DROP TABLE IF EXISTS Category",
        "CREATE TABLE Category (CategoryId INTEGER PRIMARY KEY, Name VARCHAR(100) NOT NULL)",
        "CREATE TABLE Product (
            ProductId INTEGER PRIMARY KEY,
            Name VARCHAR(100) NOT NULL,
            Price DECIMAL(10, 2),
            CategoryId INTEGER NOT NULL REFERENCES Category (CategoryId)
        )",
    ] {
        context
            .sql(sql)
            .execute()
            .expect("Failed to create the catalog tables");
    }
    for (id, name) in [(1, "Books"), (2, "Movies")] {
        context
            .sql("INSERT INTO Category (CategoryId, Name) VALUES (@0, @1)")
            .parameters(sluice::params![id, name])
            .expect("Failed to add the category parameters")
            .execute()
            .expect("Failed to insert a category");
    }
    for (id, name, price, category) in [
        (1, "The Warren Buffet Way", Some(Decimal::new(1999, 2)), 1),
        (2, "Bill Gates Bio", Some(Decimal::new(1250, 2)), 1),
        (3, "The Matrix", None, 2),
    ] {
        context
            .insert("Product")
            .column("ProductId", id)
            .and_then(|v| v.column("Name", name))
            .and_then(|v| v.column("Price", price))
            .and_then(|v| v.column("CategoryId", category))
            .expect("Failed to add the product columns")
            .execute()
            .expect("Failed to insert a product");
    }
}
