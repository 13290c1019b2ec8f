use crate::catalog::setup;
use sluice::{DbContext, ErrorKind, TransactionState};

fn count(factory: &dyn Fn() -> DbContext) -> i64 {
    factory()
        .sql("SELECT COUNT(*) FROM Category")
        .query_value()
        .expect("Failed to count the categories")
}

fn insert(context: &mut DbContext, id: i32) {
    context
        .insert("Category")
        .column("CategoryId", id)
        .and_then(|v| v.column("Name", format!("Category {id}")))
        .expect("Failed to add the columns")
        .execute()
        .expect("Failed to insert the category");
}

pub fn transactions(factory: &dyn Fn() -> DbContext) {
    setup(&mut factory());
    assert_eq!(count(factory), 2);

    // Rollback
    let mut context = factory().use_transaction(true);
    assert_eq!(context.transaction_state(), TransactionState::NoTransaction);
    insert(&mut context, 3);
    insert(&mut context, 4);
    assert_eq!(context.transaction_state(), TransactionState::Open);
    let seen = context
        .sql("SELECT COUNT(*) FROM Category")
        .query_value::<i64>()
        .expect("Failed to count inside the transaction");
    assert_eq!(seen, 4, "The transaction sees its own changes");
    context.rollback().expect("Failed to rollback");
    assert_eq!(context.transaction_state(), TransactionState::RolledBack);
    drop(context);
    assert_eq!(count(factory), 2);

    // Commit
    let mut context = factory().use_transaction(true);
    insert(&mut context, 3);
    context.commit().expect("Failed to commit");
    assert_eq!(context.transaction_state(), TransactionState::Committed);
    let error = context
        .commit()
        .expect_err("The transaction was already committed");
    assert_eq!(*error.kind(), ErrorKind::NoActiveTransaction);
    drop(context);
    assert_eq!(count(factory), 3);

    // A new transaction starts with the next command
    let mut context = factory().use_transaction(true);
    insert(&mut context, 4);
    context.commit().expect("Failed to commit");
    insert(&mut context, 5);
    assert_eq!(context.transaction_state(), TransactionState::Open);
    context.rollback().expect("Failed to rollback");
    drop(context);
    assert_eq!(count(factory), 4);

    // Drop rolls back
    {
        let mut context = factory().use_transaction(true);
        insert(&mut context, 6);
    }
    assert_eq!(count(factory), 4);

    // Without a transaction
    let mut context = factory();
    let error = context
        .rollback()
        .expect_err("There is no transaction to roll back");
    assert_eq!(*error.kind(), ErrorKind::NoActiveTransaction);
}
