mod mysql;
mod oracle;
mod postgres;
mod sql_server;
mod sqlite;

pub use mysql::*;
pub use oracle::*;
pub use postgres::*;
pub use sql_server::*;
pub use sqlite::*;

use crate::{
    BuilderData, CommandKind, DbType, Error, IsolationLevel, Paging, Parameters, Result,
    Statement, Value, prepare_statement, separated_by,
};
use std::fmt::{self, Debug, Display, Write};

/// Optional feature of a database family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    OutputParameters,
    MultipleResultsets,
    MultipleQueries,
    StoredProcedures,
    IdentityWithoutIdentityColumn,
}

impl Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::OutputParameters => "output parameters",
            Capability::MultipleResultsets => "multiple result sets",
            Capability::MultipleQueries => "multiple queries per batch",
            Capability::StoredProcedures => "stored procedures",
            Capability::IdentityWithoutIdentityColumn => {
                "identity retrieval without an identity column"
            }
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub output_parameters: bool,
    pub multiple_resultsets: bool,
    pub multiple_queries: bool,
    pub stored_procedures: bool,
    pub identity_without_column: bool,
}

impl Capabilities {
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::OutputParameters => self.output_parameters,
            Capability::MultipleResultsets => self.multiple_resultsets,
            Capability::MultipleQueries => self.multiple_queries,
            Capability::StoredProcedures => self.stored_procedures,
            Capability::IdentityWithoutIdentityColumn => self.identity_without_column,
        }
    }
}

/// Native parameter marker syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterStyle {
    /// Prefix followed by the parameter name: `@Name`, `:Name`.
    Named(char),
    /// Prefix followed by the one based number of the parameter: `$1`.
    Numbered(char),
    /// `?` on every occurrence, values bound in order of appearance.
    Positional,
}

/// How the id generated by an insert is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityRetrieval {
    /// A query appended to the batch returns the id.
    Batch,
    /// The insert itself returns the id as a one row result.
    Returning,
    /// The id is written into the named output parameter.
    OutputParameter(&'static str),
}

/// Column numbering the rows of a paged select on the row numbering dialects. The mapper never
/// reports it as unmatched.
pub const ROW_NUMBER_COLUMN: &str = "sluice_row_number";

/// Output parameter receiving the generated id on dialects using [`IdentityRetrieval::OutputParameter`].
pub const LAST_INSERTED_ID: &str = "sluice_last_id";

/// Dialect strategy of a database family.
///
/// Providers are stateless, they render the dialect neutral [`BuilderData`] and finalize the SQL
/// text of every command. Most methods have a generic default and the dialects override only
/// what differs.
pub trait Provider: Send + Sync + Debug {
    fn as_dyn(&self) -> &dyn Provider;

    fn name(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    fn require(&self, capability: Capability) -> Result<()> {
        if self.capabilities().supports(capability) {
            Ok(())
        } else {
            Err(Error::unsupported(self.name(), capability))
        }
    }

    fn parameter_style(&self) -> ParameterStyle {
        ParameterStyle::Named('@')
    }

    /// Writes the marker of the parameter `name`, `ordinal` is its zero based position in the
    /// list of bound parameters.
    fn write_parameter_marker(&self, out: &mut String, name: &str, ordinal: usize) {
        match self.parameter_style() {
            ParameterStyle::Named(prefix) => {
                out.push(prefix);
                out.push_str(name);
            }
            ParameterStyle::Numbered(prefix) => {
                let _ = write!(out, "{prefix}{}", ordinal + 1);
            }
            ParameterStyle::Positional => out.push('?'),
        }
    }

    /// Database type of a value, the runtime type table of the dialect.
    fn db_type_for_value(&self, value: &Value) -> Option<DbType> {
        DbType::for_value(value)
    }

    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', r#""""#);
        out.push('"');
    }

    /// Writes `FROM`, `WHERE`, `GROUP BY` and `HAVING`, skipping the empty ones.
    fn write_select_source(&self, out: &mut String, data: &BuilderData) {
        for (keyword, fragment) in [
            ("\nFROM ", &data.from),
            ("\nWHERE ", &data.where_sql),
            ("\nGROUP BY ", &data.group_by),
            ("\nHAVING ", &data.having),
        ] {
            if !fragment.is_empty() {
                out.push_str(keyword);
                out.push_str(fragment);
            }
        }
    }

    fn write_select_unpaged(&self, out: &mut String, data: &BuilderData) {
        out.push_str("SELECT ");
        out.push_str(&data.select);
        self.write_select_source(out, data);
        if !data.order_by.is_empty() {
            out.push_str("\nORDER BY ");
            out.push_str(&data.order_by);
        }
    }

    fn write_select(&self, out: &mut String, data: &BuilderData) {
        match data.paging {
            Some(paging) if paging.is_paged() => self.write_select_paged(out, data, &paging),
            _ => self.write_select_unpaged(out, data),
        }
    }

    /// Row numbering form: the unpaged query numbered in a subquery and filtered on the window.
    fn write_select_paged(&self, out: &mut String, data: &BuilderData, paging: &Paging) {
        out.push_str("SELECT * FROM (\n");
        self.write_select_numbered(out, data);
        out.push_str("\n)");
        self.write_subquery_alias(out, "sluice_page");
        let _ = write!(
            out,
            "\nWHERE {ROW_NUMBER_COLUMN} BETWEEN {} AND {}\nORDER BY {ROW_NUMBER_COLUMN}",
            paging.first_row(),
            paging.last_row(),
        );
    }

    /// The unpaged query with the [`ROW_NUMBER_COLUMN`] added to its columns.
    fn write_select_numbered(&self, out: &mut String, data: &BuilderData) {
        out.push_str("SELECT ");
        out.push_str(&data.select);
        out.push_str(", ");
        self.write_row_number(out, data);
        self.write_select_source(out, data);
    }

    fn write_row_number(&self, out: &mut String, data: &BuilderData) {
        out.push_str("ROW_NUMBER() OVER (ORDER BY ");
        if data.order_by.is_empty() {
            self.write_default_row_order(out);
        } else {
            out.push_str(&data.order_by);
        }
        out.push_str(") AS ");
        out.push_str(ROW_NUMBER_COLUMN);
    }

    /// Order used to number rows when the select has no order.
    fn write_default_row_order(&self, out: &mut String) {
        out.push_str("(SELECT NULL)");
    }

    fn write_subquery_alias(&self, out: &mut String, alias: &str) {
        out.push_str(" AS ");
        out.push_str(alias);
    }

    fn write_insert(&self, out: &mut String, data: &BuilderData) {
        out.push_str("INSERT INTO ");
        out.push_str(&data.object_name);
        out.push_str(" (");
        separated_by(
            out,
            &data.columns,
            |out, v| self.write_identifier_quoted(out, &v.column),
            ", ",
        );
        out.push_str(")\nVALUES (");
        separated_by(
            out,
            &data.columns,
            |out, v| {
                out.push('@');
                out.push_str(&v.parameter);
            },
            ", ",
        );
        out.push(')');
    }

    fn write_update(&self, out: &mut String, data: &BuilderData) {
        out.push_str("UPDATE ");
        out.push_str(&data.object_name);
        out.push_str("\nSET ");
        separated_by(
            out,
            &data.columns,
            |out, v| {
                self.write_identifier_quoted(out, &v.column);
                out.push_str(" = @");
                out.push_str(&v.parameter);
            },
            ", ",
        );
        self.write_where_columns(out, data);
    }

    fn write_delete(&self, out: &mut String, data: &BuilderData) {
        out.push_str("DELETE FROM ");
        out.push_str(&data.object_name);
        self.write_where_columns(out, data);
    }

    fn write_where_columns(&self, out: &mut String, data: &BuilderData) {
        if data.where_columns.is_empty() {
            return;
        }
        out.push_str("\nWHERE ");
        separated_by(
            out,
            &data.where_columns,
            |out, v| {
                self.write_identifier_quoted(out, &v.column);
                out.push_str(" = @");
                out.push_str(&v.parameter);
            },
            " AND ",
        );
    }

    /// Writes the invocation of the procedure `data.object_name` and returns the kind of command
    /// executing it.
    fn write_stored_procedure(&self, out: &mut String, data: &BuilderData) -> CommandKind {
        out.push_str(&data.object_name);
        CommandKind::StoredProcedure
    }

    /// `CALL name(@p, ...)` text command, for dialects without a stored procedure command kind.
    fn write_call(&self, out: &mut String, data: &BuilderData) -> CommandKind {
        out.push_str("CALL ");
        out.push_str(&data.object_name);
        out.push('(');
        separated_by(
            out,
            &data.parameters,
            |out, v| {
                out.push('@');
                out.push_str(&v.name);
            },
            ", ",
        );
        out.push(')');
        CommandKind::Text
    }

    /// Appends to an insert the retrieval of the generated id.
    fn write_last_insert_id(
        &self,
        out: &mut String,
        identity_column: Option<&str>,
    ) -> IdentityRetrieval;

    fn write_transaction_begin(&self, out: &mut String, isolation: IsolationLevel) {
        out.push_str("BEGIN TRANSACTION ISOLATION LEVEL ");
        out.push_str(isolation.to_sql());
    }

    fn write_transaction_commit(&self, out: &mut String) {
        out.push_str("COMMIT");
    }

    fn write_transaction_rollback(&self, out: &mut String) {
        out.push_str("ROLLBACK");
    }

    /// Turns the markers of `sql` into the native syntax and binds the parameters.
    fn prepare(&self, sql: &str, kind: CommandKind, parameters: &Parameters) -> Result<Statement> {
        prepare_statement(self.as_dyn(), sql, kind, parameters)
    }
}
