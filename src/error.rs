//! Crate-wide error type.
//!
//! Every failure in this crate is synchronous and raised at the call that
//! detected it. Builders fail on construction, never at render time, except
//! for features the active dialect cannot express.

use crate::sql::statement::StatementKind;

/// Result type for statement building and rendering.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, rendering, or delegating statements.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required builder input was absent or empty.
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// A basic condition received the wrong number of parameters.
    #[error("operator `{operator}` expects {expected} parameter(s), got {actual}")]
    InvalidArity {
        operator: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The operation has no meaning for this kind of statement.
    #[error("{operation} is not supported for {kind} statements")]
    NotSupportedForStatement {
        kind: StatementKind,
        operation: &'static str,
    },

    /// The active dialect has no representation for the requested feature.
    #[error("{feature} is not supported by the {dialect} dialect")]
    UnsupportedByDialect {
        dialect: &'static str,
        feature: String,
    },

    /// No dialect matches the requested name or connection string.
    #[error("dialect not recognized: {0}")]
    DialectNotRecognized(String),

    /// Page size or page index out of range.
    #[error("invalid pagination: {0}")]
    InvalidPagination(String),

    /// A predicate expression the translator cannot express as a condition.
    #[error("unsupported predicate: {0}")]
    UnsupportedPredicate(String),

    /// The entity mapping has no column for this property.
    #[error("no column mapping for property `{property}` of entity `{entity}`")]
    UnmappedProperty { entity: String, property: String },

    /// No mapping was registered for this entity.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// A value that cannot travel as a statement parameter.
    #[error("unsupported value for `{column}`: {reason}")]
    UnsupportedValue { column: String, reason: String },

    /// A scalar result could not be converted to the requested type.
    #[error("cannot convert {actual} value to {expected}")]
    ValueConversion {
        expected: &'static str,
        actual: &'static str,
    },

    /// Settings could not be loaded or resolved.
    #[error(transparent)]
    Settings(#[from] crate::config::SettingsError),

    /// Entity serialization failed.
    #[error("failed to serialize entity: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Error reported by an executor implementation.
    #[error("executor failed: {0}")]
    Executor(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn unsupported(dialect: &'static str, feature: impl Into<String>) -> Self {
        Error::UnsupportedByDialect {
            dialect,
            feature: feature.into(),
        }
    }
}
