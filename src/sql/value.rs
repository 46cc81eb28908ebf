//! Parameter values and storage types.

use chrono::NaiveDateTime;

use crate::error::Error;

/// A value carried by a statement parameter.
///
/// For unbound parameters the value is a `String` holding raw SQL text.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(NaiveDateTime),
    Bytes(Vec<u8>),
}

impl Value {
    /// Storage type inferred when none is given explicitly.
    pub fn storage_type(&self) -> StorageType {
        match self {
            Value::Null => StorageType::Object,
            Value::Bool(_) => StorageType::Boolean,
            Value::Int(_) => StorageType::Int64,
            Value::Float(_) => StorageType::Double,
            Value::String(_) => StorageType::String,
            Value::DateTime(_) => StorageType::DateTime,
            Value::Bytes(_) => StorageType::Binary,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Bytes(_) => "bytes",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Storage type of a parameter, forwarded to the executor for binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    Boolean,
    Byte,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    Decimal,
    String,
    AnsiString,
    Date,
    DateTime,
    Binary,
    Guid,
    /// Unknown or null value; the executor decides.
    Object,
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(n) => Ok(n),
            Value::Bool(b) => Ok(b as i64),
            // Aggregates over integer columns come back as floats on some backends.
            Value::Float(f) if f.fract() == 0.0 => Ok(f as i64),
            Value::String(s) => s.trim().parse().map_err(|_| Error::ValueConversion {
                expected: "i64",
                actual: "string",
            }),
            other => Err(Error::ValueConversion {
                expected: "i64",
                actual: other.type_name(),
            }),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(n) => Ok(n as f64),
            Value::String(s) => s.trim().parse().map_err(|_| Error::ValueConversion {
                expected: "f64",
                actual: "string",
            }),
            other => Err(Error::ValueConversion {
                expected: "f64",
                actual: other.type_name(),
            }),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(s),
            Value::Int(n) => Ok(n.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::DateTime(dt) => Ok(dt.to_string()),
            other => Err(Error::ValueConversion {
                expected: "String",
                actual: other.type_name(),
            }),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int(n) => Ok(n != 0),
            other => Err(Error::ValueConversion {
                expected: "bool",
                actual: other.type_name(),
            }),
        }
    }
}
