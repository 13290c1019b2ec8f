use crate::{
    BoundParameter, Error, Parameter, ParameterStyle, Parameters, Provider, Result, Value,
    resolve_db_type, rewrite_markers,
};
use std::time::Duration;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    #[default]
    Text,
    StoredProcedure,
}

/// Command as handed to a driver connection: final SQL text and bound parameters.
///
/// Drivers write the values of output parameters back into `parameters`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub text: String,
    pub kind: CommandKind,
    pub parameters: Vec<BoundParameter>,
    pub timeout: Option<Duration>,
}

impl Statement {
    /// Value of the parameter declared as `source`, after execution.
    pub fn parameter_value(&self, source: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|p| p.source == source)
            .or_else(|| {
                self.parameters
                    .iter()
                    .find(|p| p.source.eq_ignore_ascii_case(source))
            })
            .map(|p| &p.value)
    }
}

/// Rewrites the `@name` markers of `sql` into the native syntax of `provider` and resolves the
/// type of every bound parameter.
///
/// List values expand into one parameter per element named `{name}p{index}`, an empty list
/// renders `NULL`. Markers that do not name a parameter are left untouched. Stored procedures
/// are not rewritten, all their parameters are bound by name.
pub fn prepare_statement(
    provider: &dyn Provider,
    sql: &str,
    kind: CommandKind,
    parameters: &Parameters,
) -> Result<Statement> {
    let mut bound = Vec::<BoundParameter>::with_capacity(parameters.len());
    let style = provider.parameter_style();
    let bind = |bound: &mut Vec<BoundParameter>,
                    key: &str,
                    value: &Value,
                    parameter: &Parameter|
     -> Result<usize> {
        if style != ParameterStyle::Positional {
            if let Some(i) = bound.iter().position(|v| v.source == key) {
                return Ok(i);
            }
        }
        let mut name = String::new();
        provider.write_parameter_marker(&mut name, key, bound.len());
        let db_type = resolve_db_type(&parameter.name, value, parameter.db_type, |v| {
            provider.db_type_for_value(v)
        })?;
        bound.push(BoundParameter {
            name,
            source: key.to_string(),
            value: value.clone(),
            db_type,
            direction: parameter.direction,
            size: parameter.size,
        });
        Ok(bound.len() - 1)
    };
    let text = match kind {
        CommandKind::Text => {
            let text = rewrite_markers::<Error>(sql, |out, name| {
                let Some(parameter) = parameters.get(name) else {
                    return Ok(false);
                };
                if let Value::List(Some(items), ..) = &parameter.value {
                    if items.is_empty() {
                        out.push_str("NULL");
                    }
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        let key = format!("{}p{i}", parameter.name);
                        let index = bind(&mut bound, &key, item, parameter)?;
                        out.push_str(&bound[index].name);
                    }
                } else {
                    let index = bind(&mut bound, &parameter.name, &parameter.value, parameter)?;
                    out.push_str(&bound[index].name);
                }
                Ok(true)
            })?;
            if let ParameterStyle::Named(..) = style {
                for parameter in parameters {
                    if !matches!(parameter.value, Value::List(Some(..), ..)) {
                        bind(&mut bound, &parameter.name, &parameter.value, parameter)?;
                    }
                }
            }
            text
        }
        CommandKind::StoredProcedure => {
            for parameter in parameters {
                bind(&mut bound, &parameter.name, &parameter.value, parameter)?;
            }
            sql.to_string()
        }
    };
    Ok(Statement {
        text,
        kind,
        parameters: bound,
        timeout: None,
    })
}
