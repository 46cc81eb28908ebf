//! SQL Server dialect.
//!
//! SQL Server pages with `TOP n` when the page starts at the first row. Deeper
//! pages are ranked with `ROW_NUMBER() OVER(ORDER BY ...)` inside a derived
//! table and filtered on the synthetic row number. Distinct and grouped
//! queries are wrapped once more so the ranking numbers their result rows.

use super::helpers::{self, PAGE_ROW_NUMBER, PAGE_TABLE};
use super::{DatePart, PagingStrategy, SqlDialect};
use crate::error::Result;
use crate::sql::field::{push_alias, Aggregate};
use crate::sql::render::RenderContext;
use crate::sql::select::{BaseOptions, PageWindow, Select};
use crate::sql::token::{Token, TokenStream};

/// Alias of a distinct or grouped query ranked by deep paging.
const PAGE_SOURCE: &str = "PAGE_SRC";

/// SQL Server dialect.
#[derive(Debug, Clone, Copy)]
pub struct SqlServer;

impl SqlDialect for SqlServer {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn paging_strategy(&self) -> PagingStrategy {
        PagingStrategy::TopNative
    }

    fn aggregate_name(&self, aggregate: Aggregate) -> Result<&'static str> {
        match aggregate {
            Aggregate::StDev | Aggregate::StDevP | Aggregate::Var | Aggregate::VarP => {
                Ok(aggregate.name())
            }
            other => helpers::aggregate_common(self.name(), other),
        }
    }

    fn paginate(
        &self,
        select: &Select,
        ctx: &mut RenderContext,
        window: PageWindow,
        _record_count: Option<u64>,
        reversed: bool,
    ) -> Result<TokenStream> {
        if window.start == 0 {
            return helpers::paginate_top(select, ctx, window.size, reversed);
        }

        let inner = if select.is_distinct() || !select.group_by_fields().is_empty() {
            // Rank the rows DISTINCT / GROUP BY produce, not the source rows:
            // SELECT ROW_NUMBER() OVER(..) AS PAGE_ROW_NUMBER,PAGE_SRC.* FROM (<base>) AS PAGE_SRC
            let ranking = row_number(select.outer_order_tokens(reversed)?);
            let options = BaseOptions {
                omit_order: true,
                ..BaseOptions::ordered(reversed)
            };
            let base = select.base_tokens(ctx, &options)?;

            let mut ts = TokenStream::new();
            ts.push(Token::Select)
                .space()
                .append(&ranking)
                .comma()
                .push(Token::Ident(PAGE_SOURCE.into()))
                .push(Token::Dot)
                .push(Token::Star)
                .space()
                .push(Token::From)
                .space()
                .lparen()
                .append(&base)
                .rparen();
            push_alias(&mut ts, ctx.dialect(), PAGE_SOURCE);
            ts
        } else {
            let options = BaseOptions {
                leading_field: Some(row_number(select.order_tokens(ctx, reversed)?)),
                omit_order: true,
                ..BaseOptions::ordered(reversed)
            };
            select.base_tokens(ctx, &options)?
        };

        let mut ts = helpers::select_all_from(&inner, None, Some(PAGE_TABLE), ctx)?;
        helpers::push_row_number_range(&mut ts, PAGE_ROW_NUMBER, window)?;
        ts.space()
            .push(Token::OrderBy)
            .space()
            .push(Token::Ident(PAGE_ROW_NUMBER.into()));
        Ok(ts)
    }

    fn identity_query(&self) -> Result<String> {
        Ok("SELECT SCOPE_IDENTITY()".into())
    }

    fn is_null(&self, expr: &str, default: &str) -> String {
        format!("ISNULL({},{})", expr, default)
    }

    fn trim(&self, expr: &str) -> String {
        format!("LTRIM(RTRIM({}))", expr)
    }

    fn length(&self, expr: &str) -> String {
        format!("LEN({})", expr)
    }

    fn current_timestamp(&self) -> String {
        "GETDATE()".into()
    }

    fn date_part(&self, expr: &str, part: DatePart) -> String {
        let name = match part {
            DatePart::Year => "year",
            DatePart::Quarter => "quarter",
            DatePart::Month => "month",
            DatePart::Week => "week",
            DatePart::DayOfYear => "dayofyear",
            DatePart::Day => "day",
            DatePart::Weekday => "weekday",
            DatePart::Hour => "hour",
            DatePart::Minute => "minute",
            DatePart::Second => "second",
        };
        format!("DATEPART({},{})", name, expr)
    }
}

/// `ROW_NUMBER() OVER(ORDER BY <order>) AS PAGE_ROW_NUMBER`; an unordered
/// query is numbered in arbitrary order.
fn row_number(order: Option<TokenStream>) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::Raw("ROW_NUMBER() OVER(".into()))
        .push(Token::OrderBy)
        .space();
    match order {
        Some(order) => ts.append(&order),
        None => ts.push(Token::Raw("(SELECT NULL)".into())),
    };
    ts.rparen()
        .space()
        .push(Token::As)
        .space()
        .push(Token::Ident(PAGE_ROW_NUMBER.into()));
    ts
}
