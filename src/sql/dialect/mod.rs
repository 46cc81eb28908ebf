//! SQL Dialect definitions and backend strategies.
//!
//! This module provides a trait-based abstraction for the differences between
//! the supported backends. Each dialect implements `SqlDialect` to handle:
//!
//! - Parameter placeholder prefix: `@` everywhere except Oracle (`:`)
//! - Pagination: LIMIT/OFFSET vs TOP vs ROWNUM vs count-dependent rewrites
//! - Aggregate names (STDEV vs STDDEV_SAMP ...)
//! - Scalar function text (null replacement, string, date-part helpers)
//! - Identity retrieval after an INSERT
//!
//! # Usage
//!
//! ```ignore
//! use sqlshape::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect: Dialect = "mssql".parse()?;
//! let text = dialect.is_null("Price", "0");  // ISNULL(Price,0)
//! ```
//!
//! # Pagination families
//!
//! | Dialect | Strategy | First page | Deeper pages |
//! |---------|----------|------------|--------------|
//! | Access | count-dependent | `TOP n` | TOP + reversed order, needs record count |
//! | SQL Server | TOP / ROW_NUMBER | `TOP n` | `ROW_NUMBER() OVER(...)` window |
//! | MySQL | offset-native | `LIMIT n` | `LIMIT start,n` |
//! | SQLite | offset-native | `LIMIT n` | `LIMIT n OFFSET start` |
//! | PostgreSQL | offset-native | `LIMIT n` | `LIMIT n OFFSET start` |
//! | Oracle | ROWNUM | `ROWNUM <= n` | nested `ROWNUM` window |

mod access;
pub mod helpers;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod sqlserver;

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

pub use access::Access;
pub use mysql::MySql;
pub use oracle::Oracle;
pub use postgres::Postgres;
pub use sqlite::Sqlite;
pub use sqlserver::SqlServer;

use super::field::Aggregate;
use super::render::RenderContext;
use super::select::{PageWindow, Select};
use super::token::TokenStream;
use crate::error::{Error, Result};

/// How a backend family pages through results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingStrategy {
    /// `LIMIT`/`OFFSET` style, any page in one query.
    OffsetNative,
    /// `TOP n` for the first page, a ranking window for deeper pages.
    TopNative,
    /// `ROWNUM` bounded subqueries.
    RowNumber,
    /// Deeper pages need the total record count first.
    CountDependent,
}

/// Date parts accepted by [`SqlDialect::date_part`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Year,
    Quarter,
    Month,
    Week,
    DayOfYear,
    Day,
    Weekday,
    Hour,
    Minute,
    Second,
}

/// Trait for SQL dialect-specific behavior.
pub trait SqlDialect: Send + Sync {
    /// Dialect name for display/debugging.
    fn name(&self) -> &'static str;

    /// Prefix placed in front of `PN_<name>` placeholders.
    fn parameter_prefix(&self) -> &'static str {
        "@"
    }

    fn paging_strategy(&self) -> PagingStrategy {
        PagingStrategy::OffsetNative
    }

    /// Whether pages past the first need a prior COUNT round trip.
    fn requires_record_count(&self) -> bool {
        self.paging_strategy() == PagingStrategy::CountDependent
    }

    /// Whether table/subquery aliases may use the `AS` keyword.
    fn supports_table_alias_as(&self) -> bool {
        true
    }

    /// Backend name of an aggregate function.
    fn aggregate_name(&self, aggregate: Aggregate) -> Result<&'static str> {
        helpers::aggregate_common(self.name(), aggregate)
    }

    /// Render `select` restricted to `window`.
    ///
    /// `record_count` is the total row count of the unpaged query when known.
    /// `reversed` flips every ORDER BY direction of the result.
    fn paginate(
        &self,
        select: &Select,
        ctx: &mut RenderContext,
        window: PageWindow,
        _record_count: Option<u64>,
        reversed: bool,
    ) -> Result<TokenStream> {
        helpers::paginate_limit_offset(select, ctx, window, reversed)
    }

    /// Query returning the identity generated by the last INSERT.
    fn identity_query(&self) -> Result<String>;

    // === Scalar functions ===

    /// Replace NULL `expr` with `default`.
    fn is_null(&self, expr: &str, default: &str) -> String;

    fn upper(&self, expr: &str) -> String {
        format!("UPPER({})", expr)
    }

    fn lower(&self, expr: &str) -> String {
        format!("LOWER({})", expr)
    }

    fn ltrim(&self, expr: &str) -> String {
        format!("LTRIM({})", expr)
    }

    fn rtrim(&self, expr: &str) -> String {
        format!("RTRIM({})", expr)
    }

    fn trim(&self, expr: &str) -> String {
        format!("TRIM({})", expr)
    }

    fn length(&self, expr: &str) -> String {
        format!("LENGTH({})", expr)
    }

    /// Substring of `expr`; `start` is 1-based.
    fn substring(&self, expr: &str, start: u32, length: u32) -> String {
        format!("SUBSTRING({},{},{})", expr, start, length)
    }

    fn round(&self, expr: &str, digits: u32) -> String {
        format!("ROUND({},{})", expr, digits)
    }

    fn current_timestamp(&self) -> String {
        "NOW()".into()
    }

    fn date_part(&self, expr: &str, part: DatePart) -> String;
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    Access,
    #[default]
    SqlServer,
    MySql,
    Sqlite,
    Postgres,
    Oracle,
}

impl Dialect {
    /// All supported dialects.
    pub const ALL: [Dialect; 6] = [
        Dialect::Access,
        Dialect::SqlServer,
        Dialect::MySql,
        Dialect::Sqlite,
        Dialect::Postgres,
        Dialect::Oracle,
    ];

    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Access => &Access,
            Dialect::SqlServer => &SqlServer,
            Dialect::MySql => &MySql,
            Dialect::Sqlite => &Sqlite,
            Dialect::Postgres => &Postgres,
            Dialect::Oracle => &Oracle,
        }
    }

    /// Guess the dialect from a connection string.
    ///
    /// URL schemes are checked first, then well-known ADO/ODBC keywords.
    pub fn detect(connection_string: &str) -> Option<Dialect> {
        static SCHEME: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^\s*([A-Za-z][A-Za-z0-9+.-]*)://").unwrap());
        static ACCESS: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)microsoft\.(jet|ace)\.oledb|\.(mdb|accdb)\b|\{microsoft access driver")
                .unwrap()
        });
        static ORACLE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)\(description\s*=|oraoledb|\boracle\b").unwrap()
        });
        static SQLITE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)^\s*sqlite:|\.(db|sqlite|sqlite3)\s*;?\s*$|\bversion\s*=\s*3\b")
                .unwrap()
        });
        static MYSQL: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?i)\bmysql\b|\buid\s*=.*\bport\s*=\s*3306\b").unwrap());
        static POSTGRES: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)\bnpgsql\b|\bport\s*=\s*5432\b|\bpostgres").unwrap()
        });
        static SQLSERVER: Lazy<Regex> = Lazy::new(|| {
            Regex::new(
                r"(?i)\b(initial catalog|integrated security|trusted_connection)\s*=|\bsqloledb\b|\bsql server\b",
            )
            .unwrap()
        });

        if let Some(caps) = SCHEME.captures(connection_string) {
            let scheme = caps[1].split('+').next().unwrap_or_default();
            return scheme.parse().ok();
        }

        let checks: [(&Lazy<Regex>, Dialect); 6] = [
            (&ACCESS, Dialect::Access),
            (&ORACLE, Dialect::Oracle),
            (&SQLITE, Dialect::Sqlite),
            (&MYSQL, Dialect::MySql),
            (&POSTGRES, Dialect::Postgres),
            (&SQLSERVER, Dialect::SqlServer),
        ];
        checks
            .iter()
            .find(|(re, _)| re.is_match(connection_string))
            .map(|(_, dialect)| *dialect)
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "access" | "msaccess" | "jet" => Ok(Dialect::Access),
            "sqlserver" | "mssql" | "tsql" => Ok(Dialect::SqlServer),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "postgres" | "postgresql" | "pgsql" => Ok(Dialect::Postgres),
            "oracle" => Ok(Dialect::Oracle),
            _ => Err(Error::DialectNotRecognized(s.to_string())),
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn parameter_prefix(&self) -> &'static str {
        self.dialect().parameter_prefix()
    }

    fn paging_strategy(&self) -> PagingStrategy {
        self.dialect().paging_strategy()
    }

    fn requires_record_count(&self) -> bool {
        self.dialect().requires_record_count()
    }

    fn supports_table_alias_as(&self) -> bool {
        self.dialect().supports_table_alias_as()
    }

    fn aggregate_name(&self, aggregate: Aggregate) -> Result<&'static str> {
        self.dialect().aggregate_name(aggregate)
    }

    fn paginate(
        &self,
        select: &Select,
        ctx: &mut RenderContext,
        window: PageWindow,
        record_count: Option<u64>,
        reversed: bool,
    ) -> Result<TokenStream> {
        self.dialect()
            .paginate(select, ctx, window, record_count, reversed)
    }

    fn identity_query(&self) -> Result<String> {
        self.dialect().identity_query()
    }

    fn is_null(&self, expr: &str, default: &str) -> String {
        self.dialect().is_null(expr, default)
    }

    fn upper(&self, expr: &str) -> String {
        self.dialect().upper(expr)
    }

    fn lower(&self, expr: &str) -> String {
        self.dialect().lower(expr)
    }

    fn ltrim(&self, expr: &str) -> String {
        self.dialect().ltrim(expr)
    }

    fn rtrim(&self, expr: &str) -> String {
        self.dialect().rtrim(expr)
    }

    fn trim(&self, expr: &str) -> String {
        self.dialect().trim(expr)
    }

    fn length(&self, expr: &str) -> String {
        self.dialect().length(expr)
    }

    fn substring(&self, expr: &str, start: u32, length: u32) -> String {
        self.dialect().substring(expr, start, length)
    }

    fn round(&self, expr: &str, digits: u32) -> String {
        self.dialect().round(expr, digits)
    }

    fn current_timestamp(&self) -> String {
        self.dialect().current_timestamp()
    }

    fn date_part(&self, expr: &str, part: DatePart) -> String {
        self.dialect().date_part(expr, part)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
