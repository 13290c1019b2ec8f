use crate::{DbType, Error, ErrorKind, Result, Value};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Input,
    Output,
    InputOutput,
}

impl Direction {
    pub fn is_output(&self) -> bool {
        matches!(self, Direction::Output | Direction::InputOutput)
    }
}

/// Parameter of a statement, as declared by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
    pub db_type: DbType,
    pub direction: Direction,
    pub size: Option<u32>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            db_type: DbType::Object,
            direction: Direction::Input,
            size: None,
        }
    }
    pub fn output(name: impl Into<String>, db_type: DbType, size: Option<u32>) -> Self {
        Self {
            name: name.into(),
            value: Value::Null,
            db_type,
            direction: Direction::Output,
            size,
        }
    }
}

/// Ordered parameter list of one statement, names are unique.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Parameters {
    parameters: Vec<Parameter>,
    unnamed: usize,
}

impl Parameters {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn push(&mut self, parameter: Parameter) -> Result<()> {
        if self.get(&parameter.name).is_some() {
            return Err(Error::new(ErrorKind::DuplicateParameterName(
                parameter.name,
            )));
        }
        self.parameters.push(parameter);
        Ok(())
    }
    /// Adds a parameter named after its position among the unnamed ones, the first one is
    /// referenced as `@0`.
    pub fn push_unnamed(&mut self, value: Value) -> Result<()> {
        let name = self.unnamed.to_string();
        self.push(Parameter::new(name, value))?;
        self.unnamed += 1;
        Ok(())
    }
    /// Exact name match first, then case insensitive.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.position(name).map(|i| &self.parameters[i])
    }
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.position(name).map(|i| &mut self.parameters[i])
    }
    fn position(&self, name: &str) -> Option<usize> {
        self.parameters
            .iter()
            .position(|p| p.name == name)
            .or_else(|| {
                self.parameters
                    .iter()
                    .position(|p| p.name.eq_ignore_ascii_case(name))
            })
    }
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }
    pub fn len(&self) -> usize {
        self.parameters.len()
    }
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;
    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

/// Parameter as handed to the driver: native name, resolved type.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParameter {
    /// Name in the dialect syntax (`@Name`, `:Name`, `$1`, `?`).
    pub name: String,
    /// Name the caller declared it with.
    pub source: String,
    pub value: Value,
    pub db_type: DbType,
    pub direction: Direction,
    pub size: Option<u32>,
}

/// Builds a heterogeneous list of unnamed parameter values.
///
/// ```rust
/// use sluice_core::{Value, params};
/// let values: [Value; 2] = params![1, "The Warren Buffet Way"];
/// assert_eq!(values[0], Value::Int32(Some(1)));
/// ```
#[macro_export]
macro_rules! params {
    ($($value:expr),* $(,)?) => {
        [$($crate::Value::from($value)),*]
    };
}
