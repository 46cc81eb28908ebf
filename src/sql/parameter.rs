//! Statement parameters.
//!
//! A bound parameter renders as a placeholder (`@PN_<name>`, or `:PN_<name>`
//! on Oracle) and travels in the command's ordered parameter list. An unbound
//! parameter carries raw SQL text that is spliced into the statement as-is.

use super::value::{StorageType, Value};

/// Name of a parameter, without the dialect prefix and the `PN_` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterName {
    /// Condition-internal parameter; receives `IDX_<n>` when the owning
    /// statement is rendered.
    Pending,
    /// Purpose-qualified name such as `NEW_Name` or `OLD_Id`, or a name
    /// already assigned by rendering.
    Fixed(String),
}

/// An immutable column/value/name descriptor.
#[derive(Debug, Clone)]
pub struct Parameter {
    column: String,
    name: ParameterName,
    value: Value,
    storage_type: StorageType,
    bound: bool,
}

impl Parameter {
    /// Condition-internal bound parameter, numbered at render time.
    pub fn indexed(column: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        Self {
            column: column.into(),
            name: ParameterName::Pending,
            storage_type: value.storage_type(),
            value,
            bound: true,
        }
    }

    /// Bound parameter carrying the new value of `column` (`PN_NEW_<column>`).
    pub fn new_value(column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        Self {
            name: ParameterName::Fixed(format!("NEW_{}", column)),
            column,
            storage_type: value.storage_type(),
            value,
            bound: true,
        }
    }

    /// Bound parameter carrying the original value of `column` (`PN_OLD_<column>`).
    pub fn old_value(column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        Self {
            name: ParameterName::Fixed(format!("OLD_{}", column)),
            column,
            storage_type: value.storage_type(),
            value,
            bound: true,
        }
    }

    /// Unbound parameter: `sql` is spliced into the statement text.
    pub fn raw(column: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            name: ParameterName::Pending,
            value: Value::String(sql.into()),
            storage_type: StorageType::String,
            bound: false,
        }
    }

    /// Override the inferred storage type.
    pub fn with_storage_type(mut self, storage_type: StorageType) -> Self {
        self.storage_type = storage_type;
        self
    }

    pub(crate) fn with_name(mut self, name: String) -> Self {
        self.name = ParameterName::Fixed(name);
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Generated name, `None` until the owning statement is rendered.
    pub fn name(&self) -> Option<&str> {
        match &self.name {
            ParameterName::Fixed(name) => Some(name),
            ParameterName::Pending => None,
        }
    }

    pub fn parameter_name(&self) -> &ParameterName {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Raw SQL text of an unbound parameter.
    pub fn raw_sql(&self) -> Option<&str> {
        if self.bound {
            None
        } else {
            self.value.as_str()
        }
    }
}

/// Parameters compare by column, value and binding. Generated names and
/// storage type hints are ignored, so two logically identical conditions are
/// equal regardless of how they were numbered or typed.
impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.column == other.column && self.value == other.value && self.bound == other.bound
    }
}
