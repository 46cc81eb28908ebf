//! Database factory.
//!
//! A [`Database`] fixes the dialect once and hands out statements bound to it,
//! so callers never pass the dialect around.
//!
//! ```ignore
//! use sqlshape::config::Settings;
//! use sqlshape::database::Database;
//!
//! let settings = Settings::load()?;
//! let (_, conn) = settings.default_connection().unwrap();
//! let db = Database::from_connection(conn)?;
//! let select = db.select("Orders").order_by_desc("Created").top(10)?;
//! ```

use tracing::debug;

use crate::config::ConnectionSettings;
use crate::error::{Error, Result};
use crate::sql::dialect::{Dialect, SqlDialect};
use crate::sql::dml::{Delete, Insert, Update};
use crate::sql::select::Select;
use crate::sql::statement::{Command, StatementKind};

/// Statement factory for one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Database {
    dialect: Dialect,
}

impl Database {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Build from configured settings: the explicit dialect name wins,
    /// otherwise the dialect is detected from the connection string.
    pub fn from_connection(settings: &ConnectionSettings) -> Result<Self> {
        let dialect = settings.dialect()?;
        debug!(
            %dialect,
            explicit = settings.dialect.is_some(),
            "selected dialect for connection"
        );
        Ok(Self::new(dialect))
    }

    /// Build from a raw connection string by detection alone.
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        match Dialect::detect(connection_string) {
            Some(dialect) => {
                debug!(%dialect, "detected dialect from connection string");
                Ok(Self::new(dialect))
            }
            None => Err(Error::DialectNotRecognized(connection_string.to_string())),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Scalar function translation for this backend.
    pub fn functions(&self) -> &'static dyn SqlDialect {
        self.dialect.dialect()
    }

    pub fn select(&self, table: impl Into<String>) -> Select {
        Select::new(self.dialect, table)
    }

    /// SELECT over a derived table.
    pub fn select_from(&self, inner: Select) -> Select {
        Select::from_select(self.dialect, inner)
    }

    pub fn insert(&self, table: impl Into<String>) -> Insert {
        Insert::new(self.dialect, table)
    }

    pub fn update(&self, table: impl Into<String>) -> Update {
        Update::new(self.dialect, table)
    }

    pub fn delete(&self, table: impl Into<String>) -> Delete {
        Delete::new(self.dialect, table)
    }

    /// Command retrieving the last generated identity on this backend.
    pub fn identity_command(&self) -> Result<Command> {
        let text = self.dialect.identity_query()?;
        Ok(Command::new(StatementKind::Select, text, Vec::new()))
    }
}

impl From<Dialect> for Database {
    fn from(dialect: Dialect) -> Self {
        Self::new(dialect)
    }
}
