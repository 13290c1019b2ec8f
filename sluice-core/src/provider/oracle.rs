use crate::{
    BuilderData, Capabilities, DbType, IdentityRetrieval, IsolationLevel, LAST_INSERTED_ID,
    ParameterStyle, Provider, Value,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct OracleProvider;

impl Provider for OracleProvider {
    fn as_dyn(&self) -> &dyn Provider {
        self
    }

    fn name(&self) -> &'static str {
        "oracle"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            output_parameters: true,
            multiple_resultsets: false,
            multiple_queries: true,
            stored_procedures: true,
            identity_without_column: false,
        }
    }

    fn parameter_style(&self) -> ParameterStyle {
        ParameterStyle::Named(':')
    }

    fn db_type_for_value(&self, value: &Value) -> Option<DbType> {
        match value {
            Value::Boolean(..) => Some(DbType::Int16),
            Value::Uuid(..) => Some(DbType::Binary),
            _ => DbType::for_value(value),
        }
    }

    /// Unquoted identifiers, quoting would make them case sensitive.
    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push_str(value);
    }

    fn write_default_row_order(&self, out: &mut String) {
        out.push_str("NULL");
    }

    fn write_subquery_alias(&self, out: &mut String, alias: &str) {
        out.push(' ');
        out.push_str(alias);
    }

    /// Oracle rejects a bare `*` next to other columns, the source is then wrapped and its
    /// columns qualified. The order of such a select can only name the columns it returns.
    fn write_select_numbered(&self, out: &mut String, data: &BuilderData) {
        if data.select.trim() != "*" {
            out.push_str("SELECT ");
            out.push_str(&data.select);
            out.push_str(", ");
            self.write_row_number(out, data);
            self.write_select_source(out, data);
            return;
        }
        out.push_str("SELECT sluice_source.*, ");
        self.write_row_number(out, data);
        out.push_str("\nFROM (\nSELECT *");
        self.write_select_source(out, data);
        out.push_str("\n)");
        self.write_subquery_alias(out, "sluice_source");
    }

    fn write_last_insert_id(
        &self,
        out: &mut String,
        identity_column: Option<&str>,
    ) -> IdentityRetrieval {
        out.push_str("\nRETURNING ");
        out.push_str(identity_column.unwrap_or_default());
        out.push_str(" INTO @");
        out.push_str(LAST_INSERTED_ID);
        IdentityRetrieval::OutputParameter(LAST_INSERTED_ID)
    }

    /// Transactions start implicitly, only the isolation is set.
    fn write_transaction_begin(&self, out: &mut String, isolation: IsolationLevel) {
        out.push_str("SET TRANSACTION ISOLATION LEVEL ");
        out.push_str(match isolation {
            IsolationLevel::ReadUncommitted | IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead
            | IsolationLevel::Serializable
            | IsolationLevel::Snapshot => "SERIALIZABLE",
        });
    }
}
