//! Microsoft Access (Jet/ACE) SQL dialect.
//!
//! Access has `TOP n` but no way to skip rows. Pages past the first are
//! carved out of nested TOP queries, which needs the total record count of
//! the unpaged query:
//!
//! - `start >= count`: the base query with an always-false predicate.
//! - front half: take the first `start + take` rows, keep the last `take` of
//!   them by re-sorting in reversed order, then restore the requested order.
//! - back half: take the last `count - start` rows by sorting in reversed
//!   order, keep the first `take` of them in the requested order.

use super::helpers;
use super::{DatePart, PagingStrategy, SqlDialect};
use crate::error::{Error, Result};
use crate::sql::field::Aggregate;
use crate::sql::render::RenderContext;
use crate::sql::select::{PageWindow, Select};
use crate::sql::token::TokenStream;

const PAGE_INNER: &str = "PAGE_INNER";
const PAGE_OUTER: &str = "PAGE_OUTER";

/// Microsoft Access SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Access;

impl SqlDialect for Access {
    fn name(&self) -> &'static str {
        "access"
    }

    fn paging_strategy(&self) -> PagingStrategy {
        PagingStrategy::CountDependent
    }

    fn aggregate_name(&self, aggregate: Aggregate) -> Result<&'static str> {
        Ok(aggregate.name())
    }

    fn paginate(
        &self,
        select: &Select,
        ctx: &mut RenderContext,
        window: PageWindow,
        record_count: Option<u64>,
        reversed: bool,
    ) -> Result<TokenStream> {
        if window.start == 0 {
            return helpers::paginate_top(select, ctx, window.size, reversed);
        }

        let count = match record_count {
            Some(count) => count,
            None => {
                return helpers::unsupported(
                    self,
                    "paging past the first page without a record count",
                )
            }
        };

        if window.start >= count || window.size == 0 {
            return helpers::empty_result(select, ctx, reversed);
        }

        if select.order_by_fields().is_empty() {
            return Err(Error::InvalidPagination(
                "paging past the first page requires an ORDER BY".into(),
            ));
        }

        let remaining = count - window.start;
        let take = window.size.min(remaining);
        let forward = select.outer_order_tokens(reversed)?;
        let backward = select.outer_order_tokens(!reversed)?;

        if window.start <= count / 2 {
            // SELECT * FROM (
            //   SELECT TOP take * FROM (SELECT TOP start+take ... ORDER BY o) AS PAGE_INNER
            //   ORDER BY o_rev
            // ) AS PAGE_OUTER ORDER BY o
            let head = helpers::paginate_top(select, ctx, window.start + take, reversed)?;
            let mut tail = helpers::select_all_from(&head, Some(take), Some(PAGE_INNER), ctx)?;
            helpers::push_order_by(&mut tail, backward);

            let mut ts = helpers::select_all_from(&tail, None, Some(PAGE_OUTER), ctx)?;
            helpers::push_order_by(&mut ts, forward);
            Ok(ts)
        } else {
            // SELECT TOP take * FROM (SELECT TOP count-start ... ORDER BY o_rev) AS PAGE_INNER
            // ORDER BY o
            let rest = helpers::paginate_top(select, ctx, remaining, !reversed)?;
            let mut ts = helpers::select_all_from(&rest, Some(take), Some(PAGE_INNER), ctx)?;
            helpers::push_order_by(&mut ts, forward);
            Ok(ts)
        }
    }

    fn identity_query(&self) -> Result<String> {
        Ok("SELECT @@IDENTITY".into())
    }

    fn is_null(&self, expr: &str, default: &str) -> String {
        format!("IIF(ISNULL({0}),{1},{0})", expr, default)
    }

    fn upper(&self, expr: &str) -> String {
        format!("UCASE({})", expr)
    }

    fn lower(&self, expr: &str) -> String {
        format!("LCASE({})", expr)
    }

    fn length(&self, expr: &str) -> String {
        format!("LEN({})", expr)
    }

    fn substring(&self, expr: &str, start: u32, length: u32) -> String {
        format!("MID({},{},{})", expr, start, length)
    }

    fn date_part(&self, expr: &str, part: DatePart) -> String {
        let interval = match part {
            DatePart::Year => "yyyy",
            DatePart::Quarter => "q",
            DatePart::Month => "m",
            DatePart::Week => "ww",
            DatePart::DayOfYear => "y",
            DatePart::Day => "d",
            DatePart::Weekday => "w",
            DatePart::Hour => "h",
            DatePart::Minute => "n",
            DatePart::Second => "s",
        };
        format!("DATEPART('{}',{})", interval, expr)
    }
}
