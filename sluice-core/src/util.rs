use std::{cmp::min, ops::Range};

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Longest prefix of `value` that fits the log line limit, cut on a char boundary.
pub fn truncated(value: &str) -> &str {
    let mut end = min(value.len(), 497);
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            $crate::truncated($query).trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}

/// Region of a SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlRegion {
    Code(Range<usize>),
    /// String literal, quoted identifier or comment, never rewritten.
    Opaque(Range<usize>),
}

/// Splits `sql` into code and opaque regions.
pub fn sql_regions(sql: &str) -> Vec<SqlRegion> {
    let bytes = sql.as_bytes();
    let mut result = Vec::new();
    let mut code_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let end = match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => Some(
                bytes[i + 1..]
                    .iter()
                    .position(|b| *b == quote)
                    .map_or(bytes.len(), |p| i + 1 + p + 1),
            ),
            b'-' if bytes.get(i + 1) == Some(&b'-') => Some(
                bytes[i..]
                    .iter()
                    .position(|b| *b == b'\n')
                    .map_or(bytes.len(), |p| i + p),
            ),
            b'/' if bytes.get(i + 1) == Some(&b'*') => Some(
                sql[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |p| i + 2 + p + 2),
            ),
            _ => None,
        };
        match end {
            Some(end) => {
                if code_start < i {
                    result.push(SqlRegion::Code(code_start..i));
                }
                result.push(SqlRegion::Opaque(i..end));
                code_start = end;
                i = end;
            }
            None => i += 1,
        }
    }
    if code_start < bytes.len() {
        result.push(SqlRegion::Code(code_start..bytes.len()));
    }
    result
}

/// Rewrites every `@name` marker found in the code regions of `sql`.
///
/// `f` writes the replacement and returns `true`, or returns `false` to keep the marker as it is.
/// `@@name` system variables are never passed to `f`.
pub fn rewrite_markers<E>(
    sql: &str,
    mut f: impl FnMut(&mut String, &str) -> Result<bool, E>,
) -> Result<String, E> {
    let mut out = String::with_capacity(sql.len() + 16);
    for region in sql_regions(sql) {
        let range = match region {
            SqlRegion::Opaque(range) => {
                out.push_str(&sql[range]);
                continue;
            }
            SqlRegion::Code(range) => range,
        };
        let mut code = &sql[range];
        while let Some(at) = code.find('@') {
            out.push_str(&code[..at]);
            code = &code[at + 1..];
            let system = code.starts_with('@');
            let name_len = code
                .trim_start_matches('@')
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(code.trim_start_matches('@').len());
            if system {
                let len = code.len() - code.trim_start_matches('@').len() + name_len;
                out.push('@');
                out.push_str(&code[..len]);
                code = &code[len..];
                continue;
            }
            let name = &code[..name_len];
            if name.is_empty() || !f(&mut out, name)? {
                out.push('@');
                out.push_str(name);
            }
            code = &code[name_len..];
        }
        out.push_str(code);
    }
    Ok(out)
}

/// Splits a batch into its statements on the `;` found outside literals and comments.
///
/// The body of a `CREATE TRIGGER` is kept whole: its `;` are not split on until the `END`
/// closing its `BEGIN`. `CASE ... END` inside a trigger is tracked as well.
pub fn split_statements(sql: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut start = 0;
    let mut create = None::<bool>;
    let mut trigger = false;
    let mut depth = 0usize;
    for region in sql_regions(sql) {
        let SqlRegion::Code(range) = region else {
            continue;
        };
        let code = &sql[range.clone()];
        let mut word_start = None;
        for (i, c) in code.char_indices().chain([(code.len(), ' ')]) {
            if c.is_ascii_alphanumeric() || c == '_' {
                word_start.get_or_insert(i);
                continue;
            }
            if let Some(from) = word_start.take() {
                let word = &code[from..i];
                let is = |v: &str| word.eq_ignore_ascii_case(v);
                let statement_is_create = *create.get_or_insert_with(|| is("CREATE"));
                if statement_is_create && depth == 0 && is("TRIGGER") {
                    trigger = true;
                } else if trigger && (is("BEGIN") || is("CASE")) {
                    depth += 1;
                } else if trigger && is("END") {
                    depth = depth.saturating_sub(1);
                }
            }
            if c == ';' && depth == 0 {
                result.push(&sql[start..range.start + i]);
                start = range.start + i + 1;
                create = None;
                trigger = false;
            }
        }
    }
    result.push(&sql[start..]);
    result
        .into_iter()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[test]
    fn markers_outside_literals() {
        let sql = "select '@0', \"@a\", @0 /* @1 */ from t -- @2\nwhere x = @@IDENTITY and y = @name";
        let mut seen = Vec::new();
        let result = rewrite_markers::<Infallible>(sql, |out, name| {
            seen.push(name.to_string());
            out.push_str("?");
            Ok(true)
        })
        .unwrap();
        assert_eq!(seen, ["0", "name"]);
        assert_eq!(
            result,
            "select '@0', \"@a\", ? /* @1 */ from t -- @2\nwhere x = @@IDENTITY and y = ?"
        );
    }

    #[test]
    fn unknown_markers_kept() {
        let result =
            rewrite_markers::<Infallible>("execute P @Id = @0, @", |out, name| {
                if name == "0" {
                    out.push_str(":p0");
                    return Ok(true);
                }
                Ok(false)
            })
            .unwrap();
        assert_eq!(result, "execute P @Id = :p0, @");
    }

    #[test]
    fn statements() {
        assert_eq!(
            split_statements("insert into t values ('a;b'); -- c;\nselect 1;  ;"),
            ["insert into t values ('a;b')", "-- c;\nselect 1"]
        );
        assert!(split_statements(" ; ").is_empty());
    }

    #[test]
    fn trigger_bodies() {
        let sql = "CREATE TRIGGER t AFTER INSERT ON a BEGIN
            UPDATE b SET n = CASE WHEN n > 0 THEN n + 1 ELSE 1 END;
            DELETE FROM c WHERE id = NEW.id;
        END;
        BEGIN; INSERT INTO a VALUES (1); COMMIT";
        let statements = split_statements(sql);
        assert_eq!(statements.len(), 4, "{statements:#?}");
        assert!(statements[0].starts_with("CREATE TRIGGER"));
        assert!(statements[0].ends_with("END"));
        assert_eq!(&statements[1..], ["BEGIN", "INSERT INTO a VALUES (1)", "COMMIT"]);
        assert_eq!(
            split_statements("CREATE TABLE begin_end (x); SELECT 'END;'"),
            ["CREATE TABLE begin_end (x)", "SELECT 'END;'"]
        );
    }
}
