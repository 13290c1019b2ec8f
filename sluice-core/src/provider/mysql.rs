use crate::{
    BuilderData, Capabilities, CommandKind, DbType, IdentityRetrieval, IsolationLevel, Paging,
    ParameterStyle, Provider, Value,
};
use std::fmt::Write;

#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlProvider;

impl Provider for MySqlProvider {
    fn as_dyn(&self) -> &dyn Provider {
        self
    }

    fn name(&self) -> &'static str {
        "mysql"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            output_parameters: false,
            multiple_resultsets: false,
            multiple_queries: true,
            stored_procedures: true,
            identity_without_column: true,
        }
    }

    fn parameter_style(&self) -> ParameterStyle {
        ParameterStyle::Positional
    }

    fn db_type_for_value(&self, value: &Value) -> Option<DbType> {
        match value {
            Value::Uuid(..) => Some(DbType::StringFixedLength),
            _ => DbType::for_value(value),
        }
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(out, value, '`', "``");
        out.push('`');
    }

    fn write_select_paged(&self, out: &mut String, data: &BuilderData, paging: &Paging) {
        self.write_select_unpaged(out, data);
        let _ = write!(
            out,
            "\nLIMIT {}, {}",
            paging.offset(),
            paging.items_per_page
        );
    }

    fn write_stored_procedure(&self, out: &mut String, data: &BuilderData) -> CommandKind {
        self.write_call(out, data)
    }

    fn write_last_insert_id(
        &self,
        out: &mut String,
        _identity_column: Option<&str>,
    ) -> IdentityRetrieval {
        out.push_str(";\nSELECT LAST_INSERT_ID()");
        IdentityRetrieval::Batch
    }

    fn write_transaction_begin(&self, out: &mut String, isolation: IsolationLevel) {
        out.push_str("SET TRANSACTION ISOLATION LEVEL ");
        out.push_str(match isolation {
            IsolationLevel::Snapshot => IsolationLevel::RepeatableRead.to_sql(),
            _ => isolation.to_sql(),
        });
        out.push_str(";\nSTART TRANSACTION");
    }
}
