//! MySQL SQL dialect.
//!
//! MySQL differences from the other backends:
//! - `LIMIT n` / `LIMIT start,n` for pagination
//! - IFNULL() for null replacement
//! - CHAR_LENGTH() for character counts (LENGTH() counts bytes)
//! - Dedicated YEAR()/MONTH()/... functions for date parts
//! - LAST_INSERT_ID() for identity retrieval

use super::helpers;
use super::{DatePart, SqlDialect};
use crate::error::Result;
use crate::sql::field::Aggregate;
use crate::sql::render::RenderContext;
use crate::sql::select::{BaseOptions, PageWindow, Select};
use crate::sql::token::{Token, TokenStream};

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn aggregate_name(&self, aggregate: Aggregate) -> Result<&'static str> {
        helpers::aggregate_ansi_statistics(self.name(), aggregate)
    }

    fn paginate(
        &self,
        select: &Select,
        ctx: &mut RenderContext,
        window: PageWindow,
        _record_count: Option<u64>,
        reversed: bool,
    ) -> Result<TokenStream> {
        let mut ts = select.base_tokens(ctx, &BaseOptions::ordered(reversed))?;
        ts.space().push(Token::Limit).space();
        if window.start > 0 {
            ts.push(helpers::row_count(window.start)?).comma();
        }
        ts.push(helpers::row_count(window.size)?);
        Ok(ts)
    }

    fn identity_query(&self) -> Result<String> {
        Ok("SELECT LAST_INSERT_ID()".into())
    }

    fn is_null(&self, expr: &str, default: &str) -> String {
        format!("IFNULL({},{})", expr, default)
    }

    fn length(&self, expr: &str) -> String {
        format!("CHAR_LENGTH({})", expr)
    }

    fn date_part(&self, expr: &str, part: DatePart) -> String {
        let function = match part {
            DatePart::Year => "YEAR",
            DatePart::Quarter => "QUARTER",
            DatePart::Month => "MONTH",
            DatePart::Week => "WEEK",
            DatePart::DayOfYear => "DAYOFYEAR",
            DatePart::Day => "DAY",
            DatePart::Weekday => "DAYOFWEEK",
            DatePart::Hour => "HOUR",
            DatePart::Minute => "MINUTE",
            DatePart::Second => "SECOND",
        };
        format!("{}({})", function, expr)
    }
}
