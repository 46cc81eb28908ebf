//! Oracle SQL dialect.
//!
//! Oracle differences from the other backends:
//! - `:` parameter prefix
//! - No `AS` before table or subquery aliases
//! - Pagination through the ROWNUM pseudo-column
//! - NVL() for null replacement, SYSDATE for the current timestamp
//! - No generic identity retrieval (sequences are used instead)

use super::helpers::{self, PAGE_ROW_NUMBER};
use super::{DatePart, PagingStrategy, SqlDialect};
use crate::error::Result;
use crate::sql::field::Aggregate;
use crate::sql::render::RenderContext;
use crate::sql::select::{BaseOptions, PageWindow, Select};
use crate::sql::token::{Token, TokenStream};

const PAGE_INNER: &str = "PAGE_INNER";

/// Oracle SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Oracle;

impl SqlDialect for Oracle {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn parameter_prefix(&self) -> &'static str {
        ":"
    }

    fn paging_strategy(&self) -> PagingStrategy {
        PagingStrategy::RowNumber
    }

    fn supports_table_alias_as(&self) -> bool {
        false
    }

    fn aggregate_name(&self, aggregate: Aggregate) -> Result<&'static str> {
        match aggregate {
            Aggregate::StDev => Ok("STDDEV"),
            Aggregate::StDevP => Ok("STDDEV_POP"),
            Aggregate::Var => Ok("VARIANCE"),
            Aggregate::VarP => Ok("VAR_POP"),
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
        let base = select.base_tokens(ctx, &BaseOptions::ordered(reversed))?;

        if window.start == 0 {
            // SELECT * FROM (<base>) WHERE ROWNUM <= n
            let mut ts = helpers::select_all_from(&base, None, None, ctx)?;
            ts.space()
                .push(Token::Where)
                .space()
                .push(Token::Raw("ROWNUM".into()))
                .space()
                .push(Token::Lte)
                .space()
                .push(helpers::row_count(window.size)?);
            return Ok(ts);
        }

        // SELECT PAGE_INNER.*,ROWNUM PAGE_ROW_NUMBER FROM (<base>) PAGE_INNER
        let mut numbered = TokenStream::new();
        numbered
            .push(Token::Select)
            .space()
            .push(Token::Ident(PAGE_INNER.into()))
            .push(Token::Dot)
            .push(Token::Star)
            .comma()
            .push(Token::Raw("ROWNUM".into()))
            .space()
            .push(Token::Ident(PAGE_ROW_NUMBER.into()))
            .space()
            .push(Token::From)
            .space()
            .lparen()
            .append(&base)
            .rparen()
            .space()
            .push(Token::Ident(PAGE_INNER.into()));

        let mut ts = helpers::select_all_from(&numbered, None, None, ctx)?;
        helpers::push_row_number_range(&mut ts, PAGE_ROW_NUMBER, window)?;
        Ok(ts)
    }

    fn identity_query(&self) -> Result<String> {
        helpers::unsupported(self, "identity retrieval")
    }

    fn is_null(&self, expr: &str, default: &str) -> String {
        format!("NVL({},{})", expr, default)
    }

    fn substring(&self, expr: &str, start: u32, length: u32) -> String {
        format!("SUBSTR({},{},{})", expr, start, length)
    }

    fn current_timestamp(&self) -> String {
        "SYSDATE".into()
    }

    fn date_part(&self, expr: &str, part: DatePart) -> String {
        let format = match part {
            DatePart::Year => "YYYY",
            DatePart::Quarter => "Q",
            DatePart::Month => "MM",
            DatePart::Week => "WW",
            DatePart::DayOfYear => "DDD",
            DatePart::Day => "DD",
            DatePart::Weekday => "D",
            DatePart::Hour => "HH24",
            DatePart::Minute => "MI",
            DatePart::Second => "SS",
        };
        format!("TO_NUMBER(TO_CHAR({},'{}'))", expr, format)
    }
}
