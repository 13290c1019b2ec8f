use crate::{Capabilities, IdentityRetrieval, IsolationLevel, Provider};

#[derive(Debug, Default, Clone, Copy)]
pub struct SqlServerProvider;

impl Provider for SqlServerProvider {
    fn as_dyn(&self) -> &dyn Provider {
        self
    }

    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            output_parameters: true,
            multiple_resultsets: true,
            multiple_queries: true,
            stored_procedures: true,
            identity_without_column: true,
        }
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('[');
        self.write_escaped(out, value, ']', "]]");
        out.push(']');
    }

    fn write_last_insert_id(
        &self,
        out: &mut String,
        _identity_column: Option<&str>,
    ) -> IdentityRetrieval {
        out.push_str(";\nSELECT CAST(SCOPE_IDENTITY() AS BIGINT)");
        IdentityRetrieval::Batch
    }

    fn write_transaction_begin(&self, out: &mut String, isolation: IsolationLevel) {
        out.push_str("SET TRANSACTION ISOLATION LEVEL ");
        out.push_str(isolation.to_sql());
        out.push_str(";\nBEGIN TRANSACTION");
    }

    fn write_transaction_commit(&self, out: &mut String) {
        out.push_str("COMMIT TRANSACTION");
    }

    fn write_transaction_rollback(&self, out: &mut String) {
        out.push_str("ROLLBACK TRANSACTION");
    }
}
