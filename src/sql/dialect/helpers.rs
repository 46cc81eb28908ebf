//! Shared building blocks for dialect implementations.
//!
//! These are pure functions that dialects can use to avoid duplicating
//! common formatting and pagination logic.

use crate::error::{Error, Result};
use crate::sql::field::{push_alias, Aggregate};
use crate::sql::render::RenderContext;
use crate::sql::select::{BaseOptions, PageWindow, Select};
use crate::sql::token::{Token, TokenStream};

use super::SqlDialect;

/// Alias of the ranked subquery used by window-style paging.
pub const PAGE_TABLE: &str = "PAGE_TABLE";
/// Synthetic sequential column added by window-style paging.
pub const PAGE_ROW_NUMBER: &str = "PAGE_ROW_NUMBER";

// =============================================================================
// Aggregates
// =============================================================================

/// Aggregates every backend understands; the rest are rejected.
pub fn aggregate_common(dialect: &'static str, aggregate: Aggregate) -> Result<&'static str> {
    match aggregate {
        Aggregate::Count
        | Aggregate::Sum
        | Aggregate::Max
        | Aggregate::Min
        | Aggregate::Avg => Ok(aggregate.name()),
        other => Err(Error::unsupported(
            dialect,
            format!("{} aggregate", other.name()),
        )),
    }
}

/// STDEV/STDEVP/VAR/VARP under their ANSI sample/population names.
pub fn aggregate_ansi_statistics(
    dialect: &'static str,
    aggregate: Aggregate,
) -> Result<&'static str> {
    match aggregate {
        Aggregate::StDev => Ok("STDDEV_SAMP"),
        Aggregate::StDevP => Ok("STDDEV_POP"),
        Aggregate::Var => Ok("VAR_SAMP"),
        Aggregate::VarP => Ok("VAR_POP"),
        other => aggregate_common(dialect, other),
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Integer literal for a row count or offset. Values past `i64::MAX` have
/// no literal form on any backend.
pub fn row_count(n: u64) -> Result<Token> {
    i64::try_from(n)
        .map(Token::LitInt)
        .map_err(|_| Error::InvalidPagination(format!("row count {} is out of range", n)))
}

/// `<base> LIMIT <size>[ OFFSET <start>]`
pub fn paginate_limit_offset(
    select: &Select,
    ctx: &mut RenderContext,
    window: PageWindow,
    reversed: bool,
) -> Result<TokenStream> {
    let mut ts = select.base_tokens(ctx, &BaseOptions::ordered(reversed))?;
    ts.space()
        .append(&emit_limit_offset_standard(Some(window.size), Some(window.start))?);
    Ok(ts)
}

/// Emit standard `LIMIT n OFFSET m` syntax; a zero offset is omitted.
pub fn emit_limit_offset_standard(limit: Option<u64>, offset: Option<u64>) -> Result<TokenStream> {
    let mut ts = TokenStream::new();
    let offset = offset.filter(|off| *off > 0);

    if let Some(lim) = limit {
        ts.push(Token::Limit).space().push(row_count(lim)?);
    }

    if let Some(off) = offset {
        if limit.is_some() {
            ts.space();
        }
        ts.push(Token::Offset).space().push(row_count(off)?);
    }

    Ok(ts)
}

/// `SELECT [DISTINCT ]TOP <take> ...` over the base query.
pub fn paginate_top(
    select: &Select,
    ctx: &mut RenderContext,
    take: u64,
    reversed: bool,
) -> Result<TokenStream> {
    let options = BaseOptions {
        top: Some(take),
        ..BaseOptions::ordered(reversed)
    };
    select.base_tokens(ctx, &options)
}

/// The base query with an always-false predicate ANDed into WHERE.
pub fn empty_result(select: &Select, ctx: &mut RenderContext, reversed: bool) -> Result<TokenStream> {
    let options = BaseOptions {
        always_empty: true,
        ..BaseOptions::ordered(reversed)
    };
    select.base_tokens(ctx, &options)
}

/// `SELECT [TOP n ]* FROM (<inner>)[ AS alias]`
pub fn select_all_from(
    inner: &TokenStream,
    top: Option<u64>,
    alias: Option<&str>,
    ctx: &RenderContext,
) -> Result<TokenStream> {
    let mut ts = TokenStream::new();
    ts.push(Token::Select).space();
    if let Some(n) = top {
        ts.push(Token::Top).space().push(row_count(n)?).space();
    }
    ts.push(Token::Star)
        .space()
        .push(Token::From)
        .space()
        .lparen()
        .append(inner)
        .rparen();
    if let Some(alias) = alias {
        push_alias(&mut ts, ctx.dialect(), alias);
    }
    Ok(ts)
}

/// ` WHERE <column> BETWEEN <start + 1> AND <start + size>`
pub fn push_row_number_range(ts: &mut TokenStream, column: &str, window: PageWindow) -> Result<()> {
    let first = row_count(window.start.saturating_add(1))?;
    let last = row_count(window.start.saturating_add(window.size))?;
    ts.space()
        .push(Token::Where)
        .space()
        .push(Token::Ident(column.to_string()))
        .space()
        .push(Token::Between)
        .space()
        .push(first)
        .space()
        .push(Token::And)
        .space()
        .push(last);
    Ok(())
}

/// ` ORDER BY <tokens>` when there is anything to order by.
pub fn push_order_by(ts: &mut TokenStream, order: Option<TokenStream>) {
    if let Some(order) = order {
        ts.space()
            .push(Token::OrderBy)
            .space()
            .append(&order);
    }
}

/// Fail with an unsupported-feature error for `dialect`.
pub fn unsupported<T>(dialect: &dyn SqlDialect, feature: &str) -> Result<T> {
    Err(Error::unsupported(dialect.name(), feature))
}
