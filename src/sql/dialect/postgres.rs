//! PostgreSQL SQL dialect.
//!
//! PostgreSQL is the most ANSI-compliant backend supported:
//! - `LIMIT n OFFSET m` pagination
//! - COALESCE() for null replacement
//! - DATE_PART() with textual part names
//! - LASTVAL() for identity retrieval

use super::helpers;
use super::{DatePart, SqlDialect};
use crate::error::Result;
use crate::sql::field::Aggregate;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn aggregate_name(&self, aggregate: Aggregate) -> Result<&'static str> {
        helpers::aggregate_ansi_statistics(self.name(), aggregate)
    }

    // Uses default paginate (LIMIT ... OFFSET ...)

    fn identity_query(&self) -> Result<String> {
        Ok("SELECT LASTVAL()".into())
    }

    fn is_null(&self, expr: &str, default: &str) -> String {
        format!("COALESCE({},{})", expr, default)
    }

    fn date_part(&self, expr: &str, part: DatePart) -> String {
        let name = match part {
            DatePart::Year => "year",
            DatePart::Quarter => "quarter",
            DatePart::Month => "month",
            DatePart::Week => "week",
            DatePart::DayOfYear => "doy",
            DatePart::Day => "day",
            DatePart::Weekday => "dow",
            DatePart::Hour => "hour",
            DatePart::Minute => "minute",
            DatePart::Second => "second",
        };
        format!("DATE_PART('{}',{})", name, expr)
    }
}
