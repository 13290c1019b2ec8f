use crate::{
    BuilderData, Capabilities, CommandKind, IdentityRetrieval, IsolationLevel, Paging,
    ParameterStyle, Provider,
};
use std::fmt::Write;

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresProvider;

impl Provider for PostgresProvider {
    fn as_dyn(&self) -> &dyn Provider {
        self
    }

    fn name(&self) -> &'static str {
        "postgres"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            output_parameters: true,
            multiple_resultsets: true,
            multiple_queries: true,
            stored_procedures: true,
            identity_without_column: false,
        }
    }

    fn parameter_style(&self) -> ParameterStyle {
        ParameterStyle::Numbered('$')
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

    fn write_stored_procedure(&self, out: &mut String, data: &BuilderData) -> CommandKind {
        self.write_call(out, data)
    }

    fn write_last_insert_id(
        &self,
        out: &mut String,
        identity_column: Option<&str>,
    ) -> IdentityRetrieval {
        out.push_str("\nRETURNING ");
        out.push_str(identity_column.unwrap_or_default());
        IdentityRetrieval::Returning
    }

    fn write_transaction_begin(&self, out: &mut String, isolation: IsolationLevel) {
        out.push_str("BEGIN TRANSACTION ISOLATION LEVEL ");
        out.push_str(match isolation {
            IsolationLevel::Snapshot => IsolationLevel::RepeatableRead.to_sql(),
            _ => isolation.to_sql(),
        });
    }
}
