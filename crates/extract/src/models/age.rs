use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fmt::{Display, Formatter, Result as FmtResult};
use time::format_description::well_known::Iso8601;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Coarse "time ago" bucket for displaying update timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Age {
    /// Less than a minute ago (or in the future, for skewed clocks)
    JustNow,
    Minutes(u64),
    Hours(u64),
    Days(u64),
}
impl Age {
    /// Buckets the time elapsed between `then` and `now`.
    pub fn between(then: OffsetDateTime, now: OffsetDateTime) -> Self {
        let seconds = (now - then).whole_seconds();
        // Non-negative from here on, so the casts can't wrap.
        match seconds {
            s if s < MINUTE => Age::JustNow,
            s if s < HOUR => Age::Minutes((s / MINUTE) as u64),
            s if s < DAY => Age::Hours((s / HOUR) as u64),
            s => Age::Days((s / DAY) as u64),
        }
    }

    /// Parses the timestamp formats the site uses.
    ///
    /// Accepts ISO-8601 with an offset (`2024-05-01T10:20:30+07:00`), and the
    /// offset-less `2024-05-01T10:20:30` / `2024-05-01 10:20:30` forms, which
    /// are assumed to be UTC.
    pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime> {
        let value = value.trim();
        if let Ok(parsed) = OffsetDateTime::parse(value, &Iso8601::DEFAULT) {
            return Ok(parsed);
        }
        let spaced = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        let separated = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        PrimitiveDateTime::parse(value, spaced)
            .or_else(|_| PrimitiveDateTime::parse(value, separated))
            .map(PrimitiveDateTime::assume_utc)
            .or_raise(|| ErrorKind::ParseError {
                field: "updated_at",
                value: value.to_string(),
            })
    }
}
impl Display for Age {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let (amount, unit) = match self {
            Age::JustNow => return write!(f, "just now"),
            Age::Minutes(n) => (n, "minute"),
            Age::Hours(n) => (n, "hour"),
            Age::Days(n) => (n, "day"),
        };
        let plural = if *amount == 1 { "" } else { "s" };
        write!(f, "{amount} {unit}{plural} ago")
    }
}
