use crate::{
    Entity, EntityFields, Error, ErrorKind, FieldDef, FieldKind, ROW_NUMBER_COLUMN, Result,
    RowLabeled, Value,
};

/// Resolution of the columns of one result set against an entity type.
///
/// Column `Name` maps to the value field `Name`, column `Category_Name` maps to the field
/// `Name` of the child `Category`. Matching is case insensitive and value fields win over child
/// prefixes, among child prefixes the longest one is tried first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    paths: Vec<Option<Box<[usize]>>>,
}

impl ColumnMap {
    /// Builds the map of `labels` for `T`. In strict mode an unmatched column is an error,
    /// otherwise it is skipped. The [`ROW_NUMBER_COLUMN`] of paged selects is always skipped.
    pub fn new<T: Entity>(labels: &[String], strict: bool) -> Result<Self> {
        let mut paths = Vec::with_capacity(labels.len());
        for label in labels {
            let path = Self::resolve(T::field_defs(), label);
            if path.is_none() && !label.eq_ignore_ascii_case(ROW_NUMBER_COLUMN) {
                if strict {
                    return Err(Error::new(ErrorKind::AutoMapFailure {
                        column: label.clone(),
                        entity: T::entity_name(),
                    }));
                }
                log::warn!(
                    "Column `{}` does not match any field of `{}`, it will be skipped",
                    label,
                    T::entity_name()
                );
            }
            paths.push(path);
        }
        Ok(Self { paths })
    }

    /// Field indexes leading from the root to the value field of `column`.
    pub fn resolve(fields: &'static [FieldDef], column: &str) -> Option<Box<[usize]>> {
        let mut path = Vec::new();
        resolve_path(fields, column, &mut path).then(|| path.into())
    }

    pub fn path(&self, column: usize) -> Option<&[usize]> {
        self.paths.get(column)?.as_deref()
    }

    /// Writes the values of a row into `entity`, creating the children on their first column.
    pub fn fill(
        &self,
        entity: &mut dyn EntityFields,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<()> {
        for (path, value) in self.paths.iter().zip(values) {
            if let Some(path) = path {
                set_path(entity, path, value)?;
            }
        }
        Ok(())
    }

    pub fn map<T: Entity>(&self, values: impl IntoIterator<Item = Value>) -> Result<T> {
        let mut entity = T::default();
        self.fill(&mut entity, values)?;
        Ok(entity)
    }
}

fn resolve_path(fields: &'static [FieldDef], column: &str, path: &mut Vec<usize>) -> bool {
    if let Some(i) = fields
        .iter()
        .position(|f| f.is_value() && f.name.eq_ignore_ascii_case(column))
    {
        path.push(i);
        return true;
    }
    for (split, _) in column.match_indices('_').rev() {
        let (prefix, rest) = (&column[..split], &column[split + 1..]);
        for (i, field) in fields.iter().enumerate() {
            let FieldKind::Child(child) = field.kind else {
                continue;
            };
            if !field.name.eq_ignore_ascii_case(prefix) {
                continue;
            }
            path.push(i);
            if resolve_path(child(), rest, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}

fn set_path(entity: &mut dyn EntityFields, path: &[usize], value: Value) -> Result<()> {
    match path {
        [] => Ok(()),
        [field] => entity.set_field(*field, value),
        [child, rest @ ..] => {
            let Some(child) = entity.child_mut(*child) else {
                return Err(Error::conversion(format!(
                    "Field {child} is not a child entity"
                )));
            };
            set_path(child, rest, value)
        }
    }
}

/// Maps a single row into `T`.
pub fn map_row<T: Entity>(row: RowLabeled, strict: bool) -> Result<T> {
    let map = ColumnMap::new::<T>(&row.labels, strict)?;
    map.map(row.values)
}

/// The row an entity is mapped from: value fields as columns, present children flattened with
/// their `{name}_` prefix.
pub fn to_row(entity: &dyn EntityFields) -> RowLabeled {
    let mut labels = Vec::new();
    let mut values = Vec::new();
    flatten(entity, "", &mut labels, &mut values);
    RowLabeled::new(labels.into(), values.into())
}

fn flatten(
    entity: &dyn EntityFields,
    prefix: &str,
    labels: &mut Vec<String>,
    values: &mut Vec<Value>,
) {
    for (i, field) in entity.fields().iter().enumerate() {
        match field.kind {
            FieldKind::Value => {
                labels.push(format!("{prefix}{}", field.name));
                values.push(entity.get_field(i));
            }
            FieldKind::Child(..) => {
                if let Some(child) = entity.child(i) {
                    flatten(child, &format!("{prefix}{}_", field.name), labels, values);
                }
            }
        }
    }
}

/// Top level value fields of an entity, as column value pairs.
pub fn value_fields(entity: &dyn EntityFields) -> impl Iterator<Item = (&'static str, Value)> + '_ {
    entity
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_value())
        .map(|(i, f)| (f.name, entity.get_field(i)))
}
