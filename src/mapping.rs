//! Entity-to-table mappings.
//!
//! A mapping names the table an entity lives in and the column behind each
//! property, optionally pinning the storage type used for its parameters.
//! The predicate translator and the entity-driven DML builders resolve
//! properties through the [`ColumnResolver`] trait.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::sql::value::{StorageType, Value};

/// Column behind a mapped property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub storage_type: Option<StorageType>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage_type: None,
        }
    }

    pub fn with_storage_type(mut self, storage_type: StorageType) -> Self {
        self.storage_type = Some(storage_type);
        self
    }
}

/// Resolves an entity property to its column.
pub trait ColumnResolver {
    fn resolve_column(&self, entity: &str, property: &str) -> Result<ColumnDef>;
}

/// Mapping of one entity type.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct EntityMapping {
    entity: String,
    table: String,
    columns: Vec<(String, ColumnDef)>,
}

impl EntityMapping {
    pub fn new(entity: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            table: table.into(),
            columns: Vec::new(),
        }
    }

    /// Map `property` to `column`. Mapping a property again replaces it.
    pub fn column(self, property: impl Into<String>, column: impl Into<String>) -> Self {
        self.column_def(property, ColumnDef::new(column))
    }

    /// Map `property` to `column` with an explicit storage type.
    pub fn typed_column(
        self,
        property: impl Into<String>,
        column: impl Into<String>,
        storage_type: StorageType,
    ) -> Self {
        self.column_def(property, ColumnDef::new(column).with_storage_type(storage_type))
    }

    fn column_def(mut self, property: impl Into<String>, def: ColumnDef) -> Self {
        let property = property.into();
        match self.columns.iter_mut().find(|(p, _)| *p == property) {
            Some((_, existing)) => *existing = def,
            None => self.columns.push((property, def)),
        }
        self
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Mapped properties in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnDef)> {
        self.columns.iter().map(|(p, c)| (p.as_str(), c))
    }

    pub fn get(&self, property: &str) -> Option<&ColumnDef> {
        self.columns
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, c)| c)
    }
}

impl ColumnResolver for EntityMapping {
    fn resolve_column(&self, entity: &str, property: &str) -> Result<ColumnDef> {
        if entity != self.entity {
            return Err(Error::UnknownEntity(entity.to_string()));
        }
        self.get(property)
            .cloned()
            .ok_or_else(|| Error::UnmappedProperty {
                entity: entity.to_string(),
                property: property.to_string(),
            })
    }
}

/// Registry of entity mappings.
#[derive(Debug, Clone, Default)]
pub struct EntityMapper {
    mappings: HashMap<String, EntityMapping>,
}

impl EntityMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping, replacing any previous one for the same entity.
    pub fn register(&mut self, mapping: EntityMapping) -> &mut Self {
        self.mappings.insert(mapping.entity.clone(), mapping);
        self
    }

    pub fn mapping(&self, entity: &str) -> Result<&EntityMapping> {
        self.mappings
            .get(entity)
            .ok_or_else(|| Error::UnknownEntity(entity.to_string()))
    }
}

impl ColumnResolver for EntityMapper {
    fn resolve_column(&self, entity: &str, property: &str) -> Result<ColumnDef> {
        self.mapping(entity)?.resolve_column(entity, property)
    }
}

/// Layout `chrono` serializes `NaiveDateTime` to.
const SERIALIZED_DATETIME: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Convert a serialized property into a parameter value.
///
/// Strings are parsed as timestamps and byte arrays collected when the column
/// pins a date or binary storage type. Untyped strings in the serialized
/// `NaiveDateTime` layout bind as timestamps too; any other untyped string
/// stays a string.
pub(crate) fn json_to_value(
    column: &str,
    json: &serde_json::Value,
    storage_type: Option<StorageType>,
) -> Result<Value> {
    use serde_json::Value as Json;

    let unsupported = |reason: &str| Error::UnsupportedValue {
        column: column.to_string(),
        reason: reason.to_string(),
    };

    match (json, storage_type) {
        (Json::Null, _) => Ok(Value::Null),
        (Json::Bool(b), _) => Ok(Value::Bool(*b)),
        (Json::Number(n), _) => match n.as_i64() {
            Some(i) => Ok(Value::Int(i)),
            None => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| unsupported("number out of range")),
        },
        (Json::String(s), Some(StorageType::Date | StorageType::DateTime)) => parse_datetime(s)
            .map(Value::DateTime)
            .ok_or_else(|| unsupported("not a timestamp")),
        (Json::String(s), None) => Ok(NaiveDateTime::parse_from_str(s, SERIALIZED_DATETIME)
            .map(Value::DateTime)
            .unwrap_or_else(|_| Value::String(s.clone()))),
        (Json::String(s), _) => Ok(Value::String(s.clone())),
        (Json::Array(items), Some(StorageType::Binary)) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| unsupported("binary data must be a byte array"))
            })
            .collect::<Result<Vec<u8>>>()
            .map(Value::Bytes),
        (Json::Array(_), _) => Err(unsupported("arrays cannot be bound as parameters")),
        (Json::Object(_), _) => Err(unsupported("nested objects cannot be bound as parameters")),
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 3] = [SERIALIZED_DATETIME, "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d"];
    FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(s, format).ok().or_else(|| {
            chrono::NaiveDate::parse_from_str(s, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
    })
}
