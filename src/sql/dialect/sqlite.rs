//! SQLite SQL dialect.
//!
//! SQLite has no date/time type; date parts are pulled out of the text
//! representation with STRFTIME() and cast back to integers. STRFTIME has no
//! quarter specifier, so the quarter is derived from the month.

use super::{DatePart, SqlDialect};
use crate::error::Result;

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    // Uses default paginate (LIMIT ... OFFSET ...)

    fn identity_query(&self) -> Result<String> {
        Ok("SELECT LAST_INSERT_ROWID()".into())
    }

    fn is_null(&self, expr: &str, default: &str) -> String {
        format!("IFNULL({},{})", expr, default)
    }

    fn substring(&self, expr: &str, start: u32, length: u32) -> String {
        format!("SUBSTR({},{},{})", expr, start, length)
    }

    fn current_timestamp(&self) -> String {
        "DATETIME('now','localtime')".into()
    }

    fn date_part(&self, expr: &str, part: DatePart) -> String {
        let specifier = match part {
            DatePart::Quarter => {
                return format!("((CAST(STRFTIME('%m',{}) AS INTEGER)+2)/3)", expr);
            }
            DatePart::Year => "%Y",
            DatePart::Month => "%m",
            DatePart::Week => "%W",
            DatePart::DayOfYear => "%j",
            DatePart::Day => "%d",
            DatePart::Weekday => "%w",
            DatePart::Hour => "%H",
            DatePart::Minute => "%M",
            DatePart::Second => "%S",
        };
        format!("CAST(STRFTIME('{}',{}) AS INTEGER)", specifier, expr)
    }
}
