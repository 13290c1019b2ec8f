use crate::{catalog::setup, silent_logs};
use sluice::{DbContext, ErrorKind, Value};
use std::sync::{Arc, Mutex};

pub fn events(factory: &dyn Fn() -> DbContext) {
    setup(&mut factory());

    let journal = Arc::new(Mutex::new(Vec::<String>::new()));
    let mut context = factory()
        .on_executing({
            let journal = journal.clone();
            move |event| {
                let parameters = event
                    .parameters
                    .iter()
                    .map(|v| format!("{}={:?}", v.source, v.value))
                    .collect::<Vec<_>>()
                    .join(",");
                journal
                    .lock()
                    .unwrap()
                    .push(format!("executing {} [{parameters}]", event.sql));
            }
        })
        .on_executed({
            let journal = journal.clone();
            move |event| {
                journal
                    .lock()
                    .unwrap()
                    .push(format!("executed {}", event.sql));
            }
        })
        .on_error({
            let journal = journal.clone();
            move |event| {
                let error = event.error.map(|v| v.kind().clone());
                journal
                    .lock()
                    .unwrap()
                    .push(format!("error {} {error:?}", event.sql));
            }
        });

    let name = context
        .sql("SELECT Name FROM Category WHERE CategoryId = @id")
        .parameter("id", 2)
        .expect("Failed to add the parameter")
        .query_value::<String>()
        .expect("Failed to query the category");
    assert_eq!(name, "Movies");
    assert_eq!(
        *journal.lock().unwrap(),
        [
            format!(
                "executing SELECT Name FROM Category WHERE CategoryId = @id [id={:?}]",
                Value::Int32(Some(2))
            ),
            "executed SELECT Name FROM Category WHERE CategoryId = @id".to_string(),
        ]
    );

    journal.lock().unwrap().clear();
    let error;
    silent_logs! {
        error = context
            .sql("SELECT Name FROM Nowhere")
            .query()
            .expect_err("The table does not exist");
    }
    assert_eq!(*error.kind(), ErrorKind::ExecutionFailure);
    assert_eq!(error.sql(), Some("SELECT Name FROM Nowhere"));
    assert_eq!(
        *journal.lock().unwrap(),
        [
            "executing SELECT Name FROM Nowhere []",
            "error SELECT Name FROM Nowhere Some(ExecutionFailure)",
        ]
    );

    // Failures before execution are notified too
    journal.lock().unwrap().clear();
    let error;
    silent_logs! {
        error = context
            .sql("SELECT * FROM Product WHERE ProductId IN (@ids)")
            .parameter("ids", vec![vec![1]])
            .expect("Failed to add the parameter")
            .query()
            .expect_err("Nested lists cannot be bound");
    }
    assert!(matches!(error.kind(), ErrorKind::UnsupportedParameterType(..)));
    let journal = journal.lock().unwrap();
    assert_eq!(journal.len(), 1);
    assert!(journal[0].starts_with("error SELECT * FROM Product"));
}
