use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Inclusive calendar-date range handed to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The last `days` calendar days ending at `now_utc`'s date. Trading-day gaps (weekends,
/// holidays) are left to the provider, which simply returns fewer bars.
pub fn lookback(now_utc: DateTime<Utc>, days: i64) -> DateRange {
    let end = now_utc.date_naive();
    DateRange {
        start: end - Duration::days(days.max(0)),
        end,
    }
}
