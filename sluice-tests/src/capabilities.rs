use sluice::{Capability, DbContext};
#[cfg(any(
    feature = "disable-stored-procedures",
    feature = "disable-output-parameters"
))]
use sluice::{DbType, ErrorKind};

/// Operations the database under test does not support fail before reaching it.
pub fn capabilities(factory: &dyn Fn() -> DbContext) {
    let context = factory();
    let capabilities = context.dialect().capabilities();
    assert_eq!(
        capabilities.supports(Capability::StoredProcedures),
        !cfg!(feature = "disable-stored-procedures")
    );
    assert_eq!(
        capabilities.supports(Capability::OutputParameters),
        !cfg!(feature = "disable-output-parameters")
    );
    assert_eq!(
        capabilities.supports(Capability::MultipleResultsets),
        !cfg!(feature = "disable-multiple-resultsets")
    );

    #[cfg(feature = "disable-stored-procedures")]
    {
        let mut context = factory();
        let error = context
            .stored_procedure("ProductUpdate")
            .parameter("ProductId", 1)
            .expect("Failed to add the parameter")
            .execute()
            .expect_err("Stored procedures are not supported");
        assert!(
            matches!(
                error.kind(),
                ErrorKind::UnsupportedOperation {
                    capability: Capability::StoredProcedures,
                    ..
                }
            ),
            "Unexpected error: {error:#}"
        );
    }

    #[cfg(feature = "disable-output-parameters")]
    {
        let mut context = factory();
        let error = context
            .sql("SELECT @Count = COUNT(*) FROM Product")
            .parameter_out("Count", DbType::Int32, None)
            .expect("Failed to add the output parameter")
            .execute()
            .expect_err("Output parameters are not supported");
        assert!(
            matches!(
                error.kind(),
                ErrorKind::UnsupportedOperation {
                    capability: Capability::OutputParameters,
                    ..
                }
            ),
            "Unexpected error: {error:#}"
        );
        assert_eq!(error.sql(), Some("SELECT @Count = COUNT(*) FROM Product"));
    }
}
