//! SELECT statement model.
//!
//! A [`Select`] is built with consuming builder calls and rendered any number
//! of times. Rendering assembles clauses in ANSI order:
//!
//! ```text
//! SELECT [DISTINCT] <fields|*> FROM <source> [<joins>] [WHERE ...]
//!   [GROUP BY ...] [HAVING ...] [ORDER BY ...]
//! ```
//!
//! Pagination is delegated to the dialect, which may wrap or rewrite the
//! base query. See [`crate::sql::dialect`] for the strategy per backend.

use tracing::debug;

use super::condition::{self, Condition};
use super::dialect::{helpers, Dialect, SqlDialect};
use super::field::{push_alias, FieldSource, GroupByField, Join, JoinKind, JoinTarget, OrderField, QueryField};
use super::render::RenderContext;
use super::statement::{Command, Statement, StatementKind};
use super::token::{Token, TokenStream};
use super::value::Value;
use crate::error::{Error, Result};
use crate::executor::{Executor, Row};
use crate::mapping::ColumnResolver;
use crate::predicate::{Predicate, PredicateTranslator};

/// Alias given to a grouped or distinct query wrapped by [`Select::count_query`].
pub const COUNT_SOURCE: &str = "COUNT_SRC";

// =============================================================================
// Pagination
// =============================================================================

/// Row range requested from a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pagination {
    #[default]
    Unbounded,
    /// First `n` rows.
    Top(u64),
    /// `size` rows starting at the zero-based `offset`.
    Limit { offset: u64, size: u64 },
    /// One-based page of `size` rows.
    Page { size: u64, index: u64 },
    /// Page with the total record count of the unpaged query already known.
    PageWithCount {
        size: u64,
        index: u64,
        record_count: u64,
    },
}

/// Zero-based start row and row count of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: u64,
    pub size: u64,
}

impl Pagination {
    /// Row range, `None` when unbounded.
    pub fn window(&self) -> Option<PageWindow> {
        match *self {
            Pagination::Unbounded => None,
            Pagination::Top(n) => Some(PageWindow { start: 0, size: n }),
            Pagination::Limit { offset, size } => Some(PageWindow {
                start: offset,
                size,
            }),
            Pagination::Page { size, index }
            | Pagination::PageWithCount { size, index, .. } => Some(PageWindow {
                start: index.saturating_sub(1).saturating_mul(size),
                size,
            }),
        }
    }

    pub fn record_count(&self) -> Option<u64> {
        match *self {
            Pagination::PageWithCount { record_count, .. } => Some(record_count),
            _ => None,
        }
    }
}

fn validate_size(size: u64) -> Result<()> {
    if size == 0 {
        return Err(Error::InvalidPagination("page size must be at least 1".into()));
    }
    Ok(())
}

fn validate_page(size: u64, index: u64) -> Result<()> {
    validate_size(size)?;
    if index == 0 {
        return Err(Error::InvalidPagination(
            "page index is one-based and must be at least 1".into(),
        ));
    }
    Ok(())
}

// =============================================================================
// Rendering options
// =============================================================================

/// Knobs dialects use to reshape the base query while paginating.
#[derive(Debug, Clone, Default)]
pub struct BaseOptions {
    /// Flip every ORDER BY direction.
    pub reversed: bool,
    /// Emit `TOP n` after `SELECT [DISTINCT]`.
    pub top: Option<u64>,
    /// Tokens placed before the regular field list.
    pub leading_field: Option<TokenStream>,
    /// Leave out the ORDER BY clause.
    pub omit_order: bool,
    /// AND an always-false predicate into WHERE.
    pub always_empty: bool,
}

impl BaseOptions {
    pub fn ordered(reversed: bool) -> Self {
        Self {
            reversed,
            ..Default::default()
        }
    }
}

// =============================================================================
// Select
// =============================================================================

/// What a SELECT reads from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table(String),
    Query(Box<Select>),
}

/// SELECT statement.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct Select {
    dialect: Dialect,
    source: Source,
    source_alias: Option<String>,
    fields: Vec<QueryField>,
    distinct: bool,
    joins: Vec<Join>,
    filter: Option<Condition>,
    group_by: Vec<GroupByField>,
    having: Option<Condition>,
    order_by: Vec<OrderField>,
    pagination: Pagination,
    /// Alias counter for joined subqueries; wraps to zero on overflow.
    next_join_index: u32,
}

impl Select {
    /// `SELECT * FROM <table>`
    pub fn new(dialect: Dialect, table: impl Into<String>) -> Self {
        Self::with_source(dialect, Source::Table(table.into()))
    }

    /// `SELECT * FROM (<inner>)`; name it with [`Select::alias`].
    pub fn from_select(dialect: Dialect, inner: Select) -> Self {
        Self::with_source(dialect, Source::Query(Box::new(inner)))
    }

    fn with_source(dialect: Dialect, source: Source) -> Self {
        Self {
            dialect,
            source,
            source_alias: None,
            fields: Vec::new(),
            distinct: false,
            joins: Vec::new(),
            filter: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            pagination: Pagination::Unbounded,
            next_join_index: 0,
        }
    }

    /// Alias the FROM source.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.source_alias = Some(alias.into());
        self
    }

    // === Fields ===

    pub fn field(mut self, field: QueryField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = QueryField>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Add plain columns by name.
    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.fields
            .extend(columns.into_iter().map(QueryField::column));
        self
    }

    pub fn column(self, column: impl Into<String>) -> Self {
        self.field(QueryField::column(column))
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // === Joins ===

    /// Join the FROM source's `current_field` to `other_table.other_field`.
    ///
    /// An unaliased subquery source has no name; use [`Select::join_from`]
    /// to qualify the current side explicitly.
    pub fn join(
        self,
        kind: JoinKind,
        current_field: impl Into<String>,
        other_table: impl Into<String>,
        other_field: impl Into<String>,
    ) -> Self {
        let current_table = self.source_name().unwrap_or_default().to_string();
        self.join_with(Join::new(
            kind,
            current_table,
            current_field,
            other_table,
            other_field,
        ))
    }

    /// Join with an explicit current table, for chains across joined tables.
    pub fn join_from(
        self,
        kind: JoinKind,
        current_table: impl Into<String>,
        current_field: impl Into<String>,
        other_table: impl Into<String>,
        other_field: impl Into<String>,
    ) -> Self {
        self.join_with(Join::new(
            kind,
            current_table,
            current_field,
            other_table,
            other_field,
        ))
    }

    /// Join a subquery; it is aliased `JT_<n>` with `n` unique in this statement.
    pub fn join_select(
        mut self,
        kind: JoinKind,
        current_field: impl Into<String>,
        command: Select,
        other_field: impl Into<String>,
    ) -> Self {
        let alias_index = self.next_join_index;
        self.next_join_index = self.next_join_index.wrapping_add(1);
        let current_table = self.source_name().unwrap_or_default().to_string();
        self.join_with(Join {
            kind,
            current_table,
            current_field: current_field.into(),
            target: JoinTarget::Query {
                command: Box::new(command),
                alias_index,
            },
            other_field: other_field.into(),
        })
    }

    pub fn join_with(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    // === Filtering ===

    /// AND a condition into WHERE; `None` leaves WHERE unchanged.
    pub fn filter(mut self, condition: impl Into<Option<Condition>>) -> Self {
        self.filter = condition::and(self.filter.take(), condition);
        self
    }

    /// OR a condition into WHERE; `None` leaves WHERE unchanged.
    pub fn filter_or(mut self, condition: impl Into<Option<Condition>>) -> Self {
        self.filter = condition::or(self.filter.take(), condition);
        self
    }

    /// Translate a predicate expression and AND it into WHERE.
    pub fn where_predicate<R: ColumnResolver + ?Sized>(
        self,
        translator: &PredicateTranslator<'_, R>,
        predicate: &Predicate,
    ) -> Result<Self> {
        let condition = translator.translate(predicate)?;
        Ok(self.filter(condition))
    }

    /// Add a GROUP BY entry; duplicates are ignored.
    pub fn group_by(mut self, field: GroupByField) -> Self {
        if !self.group_by.contains(&field) {
            self.group_by.push(field);
        }
        self
    }

    pub fn group_by_column(self, column: impl Into<String>) -> Self {
        self.group_by(GroupByField::column(column))
    }

    /// AND a condition into HAVING.
    pub fn having(mut self, condition: impl Into<Option<Condition>>) -> Self {
        self.having = condition::and(self.having.take(), condition);
        self
    }

    // === Ordering ===

    pub fn order_by(mut self, field: OrderField) -> Self {
        self.order_by.push(field);
        self
    }

    pub fn order_by_asc(self, column: impl Into<String>) -> Self {
        self.order_by(OrderField::asc(column))
    }

    pub fn order_by_desc(self, column: impl Into<String>) -> Self {
        self.order_by(OrderField::desc(column))
    }

    // === Pagination ===

    /// First `n` rows.
    pub fn top(mut self, n: u64) -> Result<Self> {
        validate_size(n)?;
        self.pagination = Pagination::Top(n);
        Ok(self)
    }

    /// `size` rows starting at the zero-based `offset`.
    pub fn limit(mut self, offset: u64, size: u64) -> Result<Self> {
        validate_size(size)?;
        self.pagination = Pagination::Limit { offset, size };
        Ok(self)
    }

    /// One-based page `index` of `size` rows.
    pub fn page(mut self, size: u64, index: u64) -> Result<Self> {
        validate_page(size, index)?;
        self.pagination = Pagination::Page { size, index };
        Ok(self)
    }

    /// Page with the total record count of the unpaged query already known,
    /// so count-dependent dialects need no extra round trip.
    pub fn page_with_count(mut self, size: u64, index: u64, record_count: u64) -> Result<Self> {
        validate_page(size, index)?;
        self.pagination = Pagination::PageWithCount {
            size,
            index,
            record_count,
        };
        Ok(self)
    }

    /// Drop any pagination.
    pub fn unbounded(mut self) -> Self {
        self.pagination = Pagination::Unbounded;
        self
    }

    // === Accessors ===

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Name the FROM source is referenced by: its alias, else the table name.
    pub fn source_name(&self) -> Option<&str> {
        match (&self.source_alias, &self.source) {
            (Some(alias), _) => Some(alias),
            (None, Source::Table(table)) => Some(table),
            (None, Source::Query(_)) => None,
        }
    }

    pub fn field_list(&self) -> &[QueryField] {
        &self.fields
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn filter_condition(&self) -> Option<&Condition> {
        self.filter.as_ref()
    }

    pub fn group_by_fields(&self) -> &[GroupByField] {
        &self.group_by
    }

    pub fn having_condition(&self) -> Option<&Condition> {
        self.having.as_ref()
    }

    pub fn order_by_fields(&self) -> &[OrderField] {
        &self.order_by
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    // === Rendering ===

    /// Render as a root statement.
    ///
    /// `reversed` flips every ORDER BY direction in the output without
    /// touching the stored order fields.
    pub fn render(&self, reversed: bool) -> Result<Command> {
        self.render_command(None, reversed)
    }

    /// Render with the total record count of the unpaged query known.
    pub fn render_with_count(&self, record_count: u64, reversed: bool) -> Result<Command> {
        self.render_command(Some(record_count), reversed)
    }

    fn render_command(&self, record_count: Option<u64>, reversed: bool) -> Result<Command> {
        let mut ctx = RenderContext::new(self.dialect);
        let ts = self.render_tokens(&mut ctx, record_count, reversed)?;
        Ok(Command::from_tokens(StatementKind::Select, &ts, ctx))
    }

    /// Tokens for this query embedded in another statement. Parameters bind
    /// into the enclosing statement's context.
    pub fn to_tokens(&self, ctx: &mut RenderContext) -> Result<TokenStream> {
        self.render_tokens(ctx, None, false)
    }

    fn render_tokens(
        &self,
        ctx: &mut RenderContext,
        record_count: Option<u64>,
        reversed: bool,
    ) -> Result<TokenStream> {
        match self.pagination.window() {
            None => self.base_tokens(ctx, &BaseOptions::ordered(reversed)),
            Some(window) => {
                let record_count = record_count.or(self.pagination.record_count());
                let dialect = ctx.dialect();
                dialect.paginate(self, ctx, window, record_count, reversed)
            }
        }
    }

    /// The unpaged query, reshaped by `options`.
    pub fn base_tokens(&self, ctx: &mut RenderContext, options: &BaseOptions) -> Result<TokenStream> {
        let mut ts = TokenStream::new();

        ts.push(Token::Select).space();
        if self.distinct {
            ts.push(Token::Distinct).space();
        }
        if let Some(n) = options.top {
            ts.push(Token::Top).space().push(helpers::row_count(n)?).space();
        }

        // Field list
        let mut first = true;
        if let Some(leading) = &options.leading_field {
            ts.append(leading);
            first = false;
        }
        if self.fields.is_empty() {
            if !first {
                ts.comma();
            }
            ts.push(Token::Star);
        }
        for field in &self.fields {
            if !first {
                ts.comma();
            }
            ts.append(&field.to_tokens(ctx)?);
            first = false;
        }

        // FROM and joins
        ts.space().push(Token::From).space();
        self.push_from(&mut ts, ctx)?;

        // WHERE
        match (&self.filter, options.always_empty) {
            (Some(filter), false) => {
                ts.space()
                    .push(Token::Where)
                    .space()
                    .append(&filter.to_tokens(ctx)?);
            }
            (Some(filter), true) => {
                ts.space()
                    .push(Token::Where)
                    .space()
                    .append(&filter.to_tokens(ctx)?)
                    .space()
                    .push(Token::And)
                    .space()
                    .push(Token::Raw(ALWAYS_FALSE.into()));
            }
            (None, true) => {
                ts.space()
                    .push(Token::Where)
                    .space()
                    .push(Token::Raw(ALWAYS_FALSE.into()));
            }
            (None, false) => {}
        }

        // GROUP BY
        if !self.group_by.is_empty() {
            ts.space().push(Token::GroupBy).space();
            for (i, field) in self.group_by.iter().enumerate() {
                if i > 0 {
                    ts.comma();
                }
                ts.append(&field.to_tokens());
            }
        }

        // HAVING
        if let Some(having) = &self.having {
            ts.space()
                .push(Token::Having)
                .space()
                .append(&having.to_tokens(ctx)?);
        }

        // ORDER BY
        if !options.omit_order {
            if let Some(order) = self.order_tokens(ctx, options.reversed)? {
                ts.space().push(Token::OrderBy).space().append(&order);
            }
        }

        Ok(ts)
    }

    /// FROM source with joins; every join past the first wraps the previous
    /// ones in parentheses: `((A JOIN B ON ..) JOIN C ON ..) JOIN D ON ..`.
    fn push_from(&self, ts: &mut TokenStream, ctx: &mut RenderContext) -> Result<()> {
        for _ in 1..self.joins.len() {
            ts.lparen();
        }

        match &self.source {
            Source::Table(table) => {
                ts.push(Token::Ident(table.clone()));
            }
            Source::Query(inner) => {
                ts.lparen().append(&inner.to_tokens(ctx)?).rparen();
            }
        }
        if let Some(alias) = &self.source_alias {
            push_alias(ts, ctx.dialect(), alias);
        }

        let last = self.joins.len().saturating_sub(1);
        for (i, join) in self.joins.iter().enumerate() {
            ts.space().append(&join.to_tokens(ctx)?);
            if i < last {
                ts.rparen();
            }
        }
        Ok(())
    }

    /// Comma-separated ORDER BY list, `None` when there is no order.
    pub fn order_tokens(&self, ctx: &mut RenderContext, reversed: bool) -> Result<Option<TokenStream>> {
        if self.order_by.is_empty() {
            return Ok(None);
        }
        let mut ts = TokenStream::new();
        for (i, order) in self.order_by.iter().enumerate() {
            if i > 0 {
                ts.comma();
            }
            ts.append(&order.to_tokens(ctx, reversed)?);
        }
        Ok(Some(ts))
    }

    /// ORDER BY list referring to this query's output columns from a query
    /// wrapped around it. Every order field must be projected under the name
    /// the outer query uses, unless the field list selects `*`.
    pub fn outer_order_tokens(&self, reversed: bool) -> Result<Option<TokenStream>> {
        if self.order_by.is_empty() {
            return Ok(None);
        }
        let mut ts = TokenStream::new();
        for (i, order) in self.order_by.iter().enumerate() {
            if let Some(name) = order.field.output_name() {
                if !self.projects(name) {
                    return Err(Error::InvalidPagination(format!(
                        "ORDER BY {} is not in the field list of the paged query",
                        name
                    )));
                }
            }
            if i > 0 {
                ts.comma();
            }
            ts.append(&order.outer_tokens(reversed)?);
        }
        Ok(Some(ts))
    }

    /// Whether a query wrapped around this one can see an output column `name`.
    fn projects(&self, name: &str) -> bool {
        self.fields.is_empty()
            || self.fields.iter().any(|field| {
                (matches!(field.source, FieldSource::All { .. }) && field.aggregate.is_none())
                    || field
                        .output_name()
                        .is_some_and(|output| output.eq_ignore_ascii_case(name))
            })
    }

    // === Derived queries ===

    /// `SELECT COUNT(*)` over the same source, joins and filters.
    ///
    /// Distinct and grouped queries are wrapped so the count is of result rows.
    pub fn count_query(&self) -> Select {
        let mut base = self.clone();
        base.order_by.clear();
        base.pagination = Pagination::Unbounded;

        if base.distinct || !base.group_by.is_empty() {
            Select::from_select(self.dialect, base)
                .alias(COUNT_SOURCE)
                .field(QueryField::count_all())
        } else {
            base.fields = vec![QueryField::count_all()];
            base
        }
    }

    /// `SELECT MAX(column)` over the same source, joins and filters.
    pub fn max_query(&self, column: impl Into<String>) -> Select {
        self.aggregate_query(QueryField::max(column))
    }

    /// `SELECT MIN(column)` over the same source, joins and filters.
    pub fn min_query(&self, column: impl Into<String>) -> Select {
        self.aggregate_query(QueryField::min(column))
    }

    fn aggregate_query(&self, field: QueryField) -> Select {
        let mut query = self.clone();
        query.order_by.clear();
        query.pagination = Pagination::Unbounded;
        query.distinct = false;
        query.fields = vec![field];
        query
    }

    /// The same query limited to its first row.
    pub fn first_row_query(&self) -> Select {
        let mut query = self.clone();
        query.pagination = Pagination::Top(1);
        query
    }

    // === Execution ===

    /// Number of rows the unpaged query returns.
    pub fn count(&self, executor: &mut dyn Executor) -> Result<u64> {
        let value = executor.scalar(&self.count_query().render(false)?)?;
        let count = i64::try_from(value)?;
        u64::try_from(count).map_err(|_| Error::ValueConversion {
            expected: "u64",
            actual: "negative integer",
        })
    }

    /// Largest value of `column`; `None` when there are no rows.
    pub fn max<T>(&self, executor: &mut dyn Executor, column: impl Into<String>) -> Result<Option<T>>
    where
        T: TryFrom<Value, Error = Error>,
    {
        scalar_as(executor, &self.max_query(column))
    }

    /// Smallest value of `column`; `None` when there are no rows.
    pub fn min<T>(&self, executor: &mut dyn Executor, column: impl Into<String>) -> Result<Option<T>>
    where
        T: TryFrom<Value, Error = Error>,
    {
        scalar_as(executor, &self.min_query(column))
    }

    pub fn first_row(&self, executor: &mut dyn Executor) -> Result<Option<Row>> {
        let rows = executor.query(&self.first_row_query().render(false)?)?;
        Ok(rows.into_iter().next())
    }

    /// Command for a paged query, fetching the record count first when the
    /// dialect needs it and it is not already known.
    ///
    /// The count and the page are separate round trips; rows changing in
    /// between can shift the page boundary.
    fn paged_command(&self, executor: &mut dyn Executor) -> Result<Command> {
        match self.pagination.window() {
            Some(window)
                if window.start > 0
                    && self.dialect.requires_record_count()
                    && self.pagination.record_count().is_none() =>
            {
                let count = self.count(executor)?;
                debug!(
                    dialect = %self.dialect,
                    count,
                    start = window.start,
                    size = window.size,
                    "fetched record count for paging"
                );
                self.render_with_count(count, false)
            }
            _ => self.render(false),
        }
    }
}

const ALWAYS_FALSE: &str = "(1 = 0)";

fn scalar_as<T>(executor: &mut dyn Executor, query: &Select) -> Result<Option<T>>
where
    T: TryFrom<Value, Error = Error>,
{
    let value = executor.scalar(&query.render(false)?)?;
    if value.is_null() {
        return Ok(None);
    }
    T::try_from(value).map(Some)
}

impl Statement for Select {
    fn kind(&self) -> StatementKind {
        StatementKind::Select
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn to_command(&self) -> Result<Command> {
        self.render(false)
    }

    fn query_rows(&self, executor: &mut dyn Executor) -> Result<Vec<Row>> {
        let command = self.paged_command(executor)?;
        executor.query(&command)
    }

    fn query_scalar(&self, executor: &mut dyn Executor) -> Result<Value> {
        let command = self.paged_command(executor)?;
        executor.scalar(&command)
    }

    fn query_first_row(&self, executor: &mut dyn Executor) -> Result<Option<Row>> {
        self.first_row(executor)
    }
}
