use crate::{BuilderData, Capabilities, IdentityRetrieval, IsolationLevel, Paging, Provider};
use std::fmt::Write;

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteProvider;

impl Provider for SqliteProvider {
    fn as_dyn(&self) -> &dyn Provider {
        self
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            output_parameters: false,
            multiple_resultsets: true,
            multiple_queries: true,
            stored_procedures: false,
            identity_without_column: true,
        }
    }

    fn write_select_paged(&self, out: &mut String, data: &BuilderData, paging: &Paging) {
        self.write_select_unpaged(out, data);
        let _ = write!(
            out,
            "\nLIMIT {} OFFSET {}",
            paging.items_per_page,
            paging.offset()
        );
    }

    fn write_last_insert_id(
        &self,
        out: &mut String,
        _identity_column: Option<&str>,
    ) -> IdentityRetrieval {
        out.push_str(";\nSELECT last_insert_rowid()");
        IdentityRetrieval::Batch
    }

    /// Sqlite transactions are always serializable.
    fn write_transaction_begin(&self, out: &mut String, _isolation: IsolationLevel) {
        out.push_str("BEGIN");
    }
}
