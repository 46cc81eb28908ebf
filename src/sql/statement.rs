//! Statement kinds, rendered commands and the shared statement interface.

use std::fmt;

use tracing::trace;

use super::dialect::Dialect;
use super::parameter::Parameter;
use super::render::RenderContext;
use super::token::TokenStream;
use super::value::Value;
use crate::error::{Error, Result};
use crate::executor::{Executor, Row};

/// The four statement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        };
        f.write_str(keyword)
    }
}

/// Rendered statement text plus the parameters its placeholders refer to,
/// in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: StatementKind,
    pub text: String,
    pub parameters: Vec<Parameter>,
}

impl Command {
    pub fn new(kind: StatementKind, text: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            kind,
            text: text.into(),
            parameters,
        }
    }

    /// Serialize `tokens` and take the parameters bound while producing them.
    pub(crate) fn from_tokens(kind: StatementKind, tokens: &TokenStream, ctx: RenderContext) -> Self {
        let dialect = ctx.dialect();
        let text = tokens.serialize(dialect);
        let parameters = ctx.into_parameters();
        trace!(%kind, %dialect, sql = %text, parameters = parameters.len(), "rendered statement");
        Self {
            kind,
            text,
            parameters,
        }
    }

    /// Parameter by generated name (without prefix and `PN_`).
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == Some(name))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Behavior shared by SELECT, INSERT, UPDATE and DELETE.
///
/// Row and scalar retrieval only make sense for queries; the defaults reject
/// them with [`Error::NotSupportedForStatement`].
pub trait Statement {
    fn kind(&self) -> StatementKind;

    fn dialect(&self) -> Dialect;

    /// Render the statement. Rendering is pure and may be repeated.
    fn to_command(&self) -> Result<Command>;

    /// Rendered text only.
    fn to_sql(&self) -> Result<String> {
        Ok(self.to_command()?.text)
    }

    /// Execute as a non-query, returning the affected row count.
    fn execute(&self, executor: &mut dyn Executor) -> Result<u64> {
        executor.execute(&self.to_command()?)
    }

    fn query_rows(&self, _executor: &mut dyn Executor) -> Result<Vec<Row>> {
        Err(self.not_supported("query_rows"))
    }

    fn query_scalar(&self, _executor: &mut dyn Executor) -> Result<Value> {
        Err(self.not_supported("query_scalar"))
    }

    fn query_first_row(&self, _executor: &mut dyn Executor) -> Result<Option<Row>> {
        Err(self.not_supported("query_first_row"))
    }

    #[doc(hidden)]
    fn not_supported(&self, operation: &'static str) -> Error {
        Error::NotSupportedForStatement {
            kind: self.kind(),
            operation,
        }
    }
}
