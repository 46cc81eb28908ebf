//! # sqlshape
//!
//! A SQL command and condition compilation engine for multiple backends.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Predicate (typed filter over entity members)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [predicate translator + entity mapping]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Statement model (Select / Insert / Update / Delete)    │
//! │   with Condition trees, fields, joins, pagination        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [render + dialect strategy]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Command: SQL text + ordered parameter list        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [executor, supplied by the caller]
//! ```
//!
//! Rendering is pure. Execution goes through the [`executor::Executor`]
//! trait; this crate never opens a connection.

pub mod config;
pub mod database;
pub mod error;
pub mod executor;
pub mod mapping;
pub mod predicate;
pub mod sql;

// Re-export SQL submodules at crate level
pub use sql::condition;
pub use sql::dialect;
pub use sql::dml;
pub use sql::select;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::database::Database;
    pub use crate::dialect::{DatePart, Dialect, SqlDialect};
    pub use crate::error::{Error, Result};
    pub use crate::executor::{Executor, Row};
    pub use crate::mapping::{ColumnResolver, EntityMapper, EntityMapping};
    pub use crate::predicate::{CompareOp, Method, Predicate, PredicateTranslator};
    pub use crate::sql::condition::{and, not, or, Condition, Operator};
    pub use crate::sql::dml::{Delete, Insert, Update};
    pub use crate::sql::field::{
        Aggregate, GroupByField, JoinKind, OrderField, QueryField, SortDirection,
    };
    pub use crate::sql::select::{Pagination, Select};
    pub use crate::sql::statement::{Command, Statement, StatementKind};
    pub use crate::sql::value::{StorageType, Value};
}

// Also export at crate root for convenience
pub use database::Database;
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use sql::statement::{Command, Statement};
