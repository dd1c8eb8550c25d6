use chrono::{DateTime, Timelike, Utc};
use ltv_core::{CoreError, Event, EventKind};

const WEEK_SECS: i64 = 7 * 24 * 60 * 60;

/// Site visits mark a customer's visits; without any, orders stand in.
pub fn visit_marker(events: &[Event]) -> EventKind {
    if events.iter().any(|e| e.kind == EventKind::SiteVisit) {
        EventKind::SiteVisit
    } else {
        EventKind::Order
    }
}

pub fn visit_times(events: &[Event], marker: EventKind) -> Result<Vec<DateTime<Utc>>, CoreError> {
    events
        .iter()
        .filter(|e| e.kind == marker)
        .map(|e| {
            e.event_time
                .ok_or_else(|| CoreError::missing(marker, "event_time"))
        })
        .collect()
}

/// Number of weekly occurrences from `first` through `last`.
///
/// Occurrences fall on `first + 7k days` with `first` truncated to whole
/// seconds; a single instant still counts one week.
pub fn weekly_occurrences(first: DateTime<Utc>, last: DateTime<Utc>) -> u64 {
    let start = first.with_nanosecond(0).unwrap_or(first);
    let span = (last - start).num_seconds().max(0);
    (span / WEEK_SECS) as u64 + 1
}
