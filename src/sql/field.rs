//! Field descriptors: selected fields, ORDER BY and GROUP BY entries, joins.

use super::dialect::{Dialect, SqlDialect};
use super::render::RenderContext;
use super::select::Select;
use super::token::{Token, TokenStream};
use crate::error::{Error, Result};

// =============================================================================
// Aggregates
// =============================================================================

/// Aggregate functions a query field can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Sum,
    Max,
    Min,
    Avg,
    First,
    Last,
    StDev,
    StDevP,
    Var,
    VarP,
}

impl Aggregate {
    /// Canonical (Access / SQL Server) function name.
    pub fn name(self) -> &'static str {
        match self {
            Aggregate::Count => "COUNT",
            Aggregate::Sum => "SUM",
            Aggregate::Max => "MAX",
            Aggregate::Min => "MIN",
            Aggregate::Avg => "AVG",
            Aggregate::First => "FIRST",
            Aggregate::Last => "LAST",
            Aggregate::StDev => "STDEV",
            Aggregate::StDevP => "STDEVP",
            Aggregate::Var => "VAR",
            Aggregate::VarP => "VARP",
        }
    }
}

// =============================================================================
// Query Field
// =============================================================================

/// What a field selects.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSource {
    /// `[table.]name`
    Column { table: Option<String>, name: String },
    /// `[table.]*`
    All { table: Option<String> },
    /// Raw expression text, usually produced by a dialect function.
    Function(String),
    /// Scalar subquery.
    Query(Box<Select>),
}

/// One selected column, expression or aggregate with an optional alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct QueryField {
    pub source: FieldSource,
    pub alias: Option<String>,
    pub aggregate: Option<Aggregate>,
    pub distinct: bool,
}

impl QueryField {
    fn from_source(source: FieldSource) -> Self {
        Self {
            source,
            alias: None,
            aggregate: None,
            distinct: false,
        }
    }

    pub fn column(name: impl Into<String>) -> Self {
        Self::from_source(FieldSource::Column {
            table: None,
            name: name.into(),
        })
    }

    /// `*`
    pub fn all() -> Self {
        Self::from_source(FieldSource::All { table: None })
    }

    /// Raw expression text; fails when `sql` is empty.
    pub fn function(sql: impl Into<String>) -> Result<Self> {
        let sql = sql.into();
        if sql.trim().is_empty() {
            return Err(Error::MissingArgument("function"));
        }
        Ok(Self::from_source(FieldSource::Function(sql)))
    }

    /// Scalar subquery field.
    pub fn select(command: Select) -> Self {
        Self::from_source(FieldSource::Query(Box::new(command)))
    }

    pub fn count_all() -> Self {
        Self::all().aggregate(Aggregate::Count)
    }

    pub fn count(column: impl Into<String>) -> Self {
        Self::column(column).aggregate(Aggregate::Count)
    }

    pub fn sum(column: impl Into<String>) -> Self {
        Self::column(column).aggregate(Aggregate::Sum)
    }

    pub fn max(column: impl Into<String>) -> Self {
        Self::column(column).aggregate(Aggregate::Max)
    }

    pub fn min(column: impl Into<String>) -> Self {
        Self::column(column).aggregate(Aggregate::Min)
    }

    pub fn avg(column: impl Into<String>) -> Self {
        Self::column(column).aggregate(Aggregate::Avg)
    }

    /// Qualify a column or `*` with a table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        match &mut self.source {
            FieldSource::Column { table: t, .. } | FieldSource::All { table: t } => {
                *t = Some(table.into())
            }
            FieldSource::Function(_) | FieldSource::Query(_) => {}
        }
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    /// `AGG(DISTINCT ...)`
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Name under which the field is visible outside its own SELECT. A column
    /// written as `table.name` is visible as `name`.
    pub fn output_name(&self) -> Option<&str> {
        if let Some(alias) = &self.alias {
            return Some(alias);
        }
        match (&self.source, self.aggregate) {
            (FieldSource::Column { name, .. }, None) => name.rsplit('.').next(),
            _ => None,
        }
    }

    /// Tokens for the field expression, without alias.
    pub fn expr_tokens(&self, ctx: &mut RenderContext) -> Result<TokenStream> {
        let mut ts = TokenStream::new();

        if let Some(aggregate) = self.aggregate {
            let name = ctx.dialect().aggregate_name(aggregate)?;
            ts.push(Token::Raw(name.into())).lparen();
            if self.distinct {
                ts.push(Token::Distinct).space();
            }
        }

        match &self.source {
            FieldSource::Column { table, name } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone())).push(Token::Dot);
                }
                ts.push(Token::Ident(name.clone()));
            }
            FieldSource::All { table } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone())).push(Token::Dot);
                }
                ts.push(Token::Star);
            }
            FieldSource::Function(sql) => {
                ts.push(Token::Raw(sql.clone()));
            }
            FieldSource::Query(command) => {
                ts.lparen().append(&command.to_tokens(ctx)?).rparen();
            }
        }

        if self.aggregate.is_some() {
            ts.rparen();
        }

        Ok(ts)
    }

    /// Tokens for the field as it appears in a SELECT list.
    pub fn to_tokens(&self, ctx: &mut RenderContext) -> Result<TokenStream> {
        let mut ts = self.expr_tokens(ctx)?;
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        Ok(ts)
    }
}

// =============================================================================
// ORDER BY
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct OrderField {
    pub field: QueryField,
    pub direction: SortDirection,
}

impl OrderField {
    pub fn new(field: QueryField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(QueryField::column(column), SortDirection::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(QueryField::column(column), SortDirection::Desc)
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.field = self.field.with_table(table);
        self
    }

    /// Direction to emit, flipped when `reversed` without touching `self`.
    pub fn effective_direction(&self, reversed: bool) -> SortDirection {
        if reversed {
            self.direction.reversed()
        } else {
            self.direction
        }
    }

    pub fn to_tokens(&self, ctx: &mut RenderContext, reversed: bool) -> Result<TokenStream> {
        let mut ts = self.field.expr_tokens(ctx)?;
        ts.space().push(direction_token(self.effective_direction(reversed)));
        Ok(ts)
    }

    /// Tokens referring to this field from a SELECT wrapped around the one
    /// that produced it. Only columns and aliased fields can be referenced.
    pub fn outer_tokens(&self, reversed: bool) -> Result<TokenStream> {
        let name = self.field.output_name().ok_or_else(|| {
            Error::InvalidPagination(
                "paging through a subquery requires ORDER BY columns or aliased fields".into(),
            )
        })?;
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(name.to_string()))
            .space()
            .push(direction_token(self.effective_direction(reversed)));
        Ok(ts)
    }
}

fn direction_token(direction: SortDirection) -> Token {
    match direction {
        SortDirection::Asc => Token::Asc,
        SortDirection::Desc => Token::Desc,
    }
}

// =============================================================================
// GROUP BY
// =============================================================================

/// A GROUP BY entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupByField {
    Column { table: Option<String>, name: String },
    Function(String),
}

impl GroupByField {
    pub fn column(name: impl Into<String>) -> Self {
        GroupByField::Column {
            table: None,
            name: name.into(),
        }
    }

    pub fn table_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        GroupByField::Column {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    pub fn function(sql: impl Into<String>) -> Result<Self> {
        let sql = sql.into();
        if sql.trim().is_empty() {
            return Err(Error::MissingArgument("function"));
        }
        Ok(GroupByField::Function(sql))
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        match self {
            GroupByField::Column { table, name } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone())).push(Token::Dot);
                }
                ts.push(Token::Ident(name.clone()));
            }
            GroupByField::Function(sql) => {
                ts.push(Token::Raw(sql.clone()));
            }
        }
        ts
    }
}

// =============================================================================
// Joins
// =============================================================================

/// Type of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

/// The other side of a join.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinTarget {
    Table(String),
    /// Subquery with its synthetic alias index.
    Query { command: Box<Select>, alias_index: u32 },
}

/// A FROM-clause extension joining one table's field to another side.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub current_table: String,
    pub current_field: String,
    pub target: JoinTarget,
    pub other_field: String,
}

impl Join {
    pub fn new(
        kind: JoinKind,
        current_table: impl Into<String>,
        current_field: impl Into<String>,
        other_table: impl Into<String>,
        other_field: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            current_table: current_table.into(),
            current_field: current_field.into(),
            target: JoinTarget::Table(other_table.into()),
            other_field: other_field.into(),
        }
    }

    /// Name the other side is referenced by in the ON clause.
    pub fn other_name(&self) -> String {
        match &self.target {
            JoinTarget::Table(table) => table.clone(),
            JoinTarget::Query { alias_index, .. } => join_alias(*alias_index),
        }
    }

    pub fn to_tokens(&self, ctx: &mut RenderContext) -> Result<TokenStream> {
        let mut ts = TokenStream::new();

        match self.kind {
            JoinKind::Inner => ts.push(Token::Inner),
            JoinKind::Left => ts.push(Token::Left),
            JoinKind::Right => ts.push(Token::Right),
            JoinKind::Full => ts.push(Token::Full).space().push(Token::Outer),
        };
        ts.space().push(Token::Join).space();

        match &self.target {
            JoinTarget::Table(table) => {
                ts.push(Token::Ident(table.clone()));
            }
            JoinTarget::Query {
                command,
                alias_index,
            } => {
                ts.lparen().append(&command.to_tokens(ctx)?).rparen();
                push_alias(&mut ts, ctx.dialect(), &join_alias(*alias_index));
            }
        }

        ts.space().push(Token::On).space();
        if !self.current_table.is_empty() {
            ts.push(Token::Ident(self.current_table.clone()))
                .push(Token::Dot);
        }
        ts.push(Token::Ident(self.current_field.clone()))
            .space()
            .push(Token::Eq)
            .space()
            .push(Token::Ident(self.other_name()))
            .push(Token::Dot)
            .push(Token::Ident(self.other_field.clone()));

        Ok(ts)
    }
}

/// Synthetic alias of a joined subquery.
pub fn join_alias(index: u32) -> String {
    format!("JT_{}", index)
}

/// ` AS alias`, or ` alias` where the dialect rejects `AS` on table aliases.
pub(crate) fn push_alias(ts: &mut TokenStream, dialect: Dialect, alias: &str) {
    ts.space();
    if dialect.supports_table_alias_as() {
        ts.push(Token::As).space();
    }
    ts.push(Token::Ident(alias.to_string()));
}
