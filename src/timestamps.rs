//! Timestamp helpers for CMS-style date columns.
//!
//! Each post date is stored twice: once in UTC and once in the site's local
//! time. Either may hold the zero sentinel `0000-00-00 00:00:00` (drafts
//! commonly have no UTC publish date), so readers go through [`resolve`].

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

pub const STORED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const ZERO_DATE: &str = "0000-00-00 00:00:00";

/// Source of "now" for every time-dependent computation.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// Build the site offset from a minute count, falling back to UTC when the
/// value is out of range.
pub fn site_offset(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}

/// Parse a stored timestamp. Empty and zeroed values yield `None`.
pub fn parse_stored(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() || raw == ZERO_DATE {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, STORED_FORMAT).ok()
}

/// Resolve a (UTC, local) column pair to an absolute time.
///
/// The UTC value wins when it is set. Otherwise the local value is shifted
/// by the site offset. When neither is usable, `now` is returned.
pub fn resolve(gmt: &str, local: &str, offset: FixedOffset, now: DateTime<Utc>) -> DateTime<Utc> {
    if let Some(naive) = parse_stored(gmt) {
        return Utc.from_utc_datetime(&naive);
    }
    parse_stored(local)
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

/// Format an absolute time as the site-local stored representation.
pub fn to_local_stored(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format(STORED_FORMAT).to_string()
}

/// Whole days elapsed from `then` to `now`, never negative.
pub fn days_since(now: DateTime<Utc>, then: DateTime<Utc>) -> u64 {
    (now - then).num_days().max(0) as u64
}
