//! SQL generation module.
//!
//! Statements are modeled as plain values and rendered to parameterized text
//! for one backend at a time:
//!
//! - [`select`] - SELECT statement and pagination
//! - [`dml`] - INSERT, UPDATE, DELETE
//! - [`condition`] - WHERE/HAVING condition trees
//! - [`field`] - select fields, aggregates, ordering, grouping, joins
//! - [`statement`] - the [`Statement`] trait and rendered [`Command`]s
//! - [`token`] / [`render`] - token stream and render-time parameter binding
//! - [`dialect`] - backend strategies

pub mod condition;
pub mod dialect;
pub mod dml;
pub mod field;
pub mod parameter;
pub mod render;
pub mod select;
pub mod statement;
pub mod token;
pub mod value;


// Re-export commonly used types at the sql module level
pub use condition::{and, not, or, Condition, Conjunction, LikeMatch, Operator};
pub use dialect::{DatePart, Dialect, PagingStrategy, SqlDialect};
pub use dml::{Assignment, Delete, Insert, Update};
pub use field::{
    Aggregate, GroupByField, Join, JoinKind, JoinTarget, OrderField, QueryField, SortDirection,
};
pub use parameter::{Parameter, ParameterName};
pub use render::RenderContext;
pub use select::{Pagination, Select, Source};
pub use statement::{Command, Statement, StatementKind};
pub use token::{Token, TokenStream};
pub use value::{StorageType, Value};
