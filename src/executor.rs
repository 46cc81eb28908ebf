//! Execution seam.
//!
//! Statements render to a [`Command`] and hand it to an [`Executor`]. The
//! executor owns connections, transactions and retries; nothing in this crate
//! performs I/O on its own.

use crate::error::Result;
use crate::sql::statement::Command;
use crate::sql::value::Value;

/// Runs rendered commands against a database.
pub trait Executor {
    /// Run a query and collect every row.
    fn query(&mut self, command: &Command) -> Result<Vec<Row>>;

    /// Run a query and return the first column of the first row,
    /// [`Value::Null`] when there is no row.
    fn scalar(&mut self, command: &Command) -> Result<Value>;

    /// Run a statement and return the number of affected rows.
    fn execute(&mut self, command: &Command) -> Result<u64>;
}

/// One result row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Value of the named column; names compare case-insensitively.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .and_then(|i| self.values.get(i))
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        let (columns, values) = iter
            .into_iter()
            .map(|(column, value)| (column.into(), value))
            .unzip();
        Self { columns, values }
    }
}
