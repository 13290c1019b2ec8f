use crate::{Result, Value};

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Scalar property, read from a single column.
    Value,
    /// Nested entity, read from the columns prefixed by `{name}_`.
    Child(fn() -> &'static [FieldDef]),
}

/// Mappable property of an entity.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Column name, matched case insensitively.
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub fn is_value(&self) -> bool {
        matches!(self.kind, FieldKind::Value)
    }
}

/// Type that rows can be mapped into, usually implemented through `#[derive(Entity)]`.
pub trait Entity: EntityFields + Default + 'static {
    fn entity_name() -> &'static str;

    fn field_defs() -> &'static [FieldDef];
}

/// Object safe access to the fields of an entity, indexes follow [`Entity::field_defs`].
pub trait EntityFields {
    fn fields(&self) -> &'static [FieldDef];

    /// Converts and stores a value field.
    fn set_field(&mut self, index: usize, value: Value) -> Result<()>;

    fn get_field(&self, index: usize) -> Value;

    /// Child entity at `index`, created with its default value when absent.
    fn child_mut(&mut self, index: usize) -> Option<&mut dyn EntityFields>;

    /// Child entity at `index`, `None` when absent.
    fn child(&self, index: usize) -> Option<&dyn EntityFields>;
}
