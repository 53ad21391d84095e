//! Timesheet/calendar reconciliation.
//!
//! # Algorithm Summary
//!
//! A timesheet entry is *covered* when some calendar event contains it, with
//! both bounds inclusive. Containment, not overlap: an entry that starts
//! before an event or runs a minute past it is not covered.
//!
//! 1. Every entry covered by no event is **extra**.
//! 2. Every event that covers no entry is **missing**.
//!
//! Each side is an existential scan of the other, so the cost is O(n*m). Both
//! inputs are human-scale (a few days of timesheet rows), so nothing is sorted
//! or indexed and input order is preserved in the output.

use serde::Serialize;

use crate::entry::{CalendarEvent, TimesheetEntry};
use crate::types::Timed;

/// Discrepancies between a timesheet and a calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscrepancyReport {
    /// Timesheet entries no calendar event contains, in timesheet order.
    pub extra_entries: Vec<TimesheetEntry>,

    /// Calendar events containing no timesheet entry, in calendar order.
    pub missing_entries: Vec<CalendarEvent>,
}

impl DiscrepancyReport {
    /// Returns true when the timesheet and the calendar agree.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.extra_entries.is_empty() && self.missing_entries.is_empty()
    }
}

/// Reconciles timesheet entries against calendar events.
///
/// Pure function of its inputs; either slice may be empty.
#[must_use]
pub fn reconcile(entries: &[TimesheetEntry], events: &[CalendarEvent]) -> DiscrepancyReport {
    let extra_entries: Vec<_> = entries
        .iter()
        .filter(|entry| !events.iter().any(|event| covers(event, *entry)))
        .cloned()
        .collect();

    let missing_entries: Vec<_> = events
        .iter()
        .filter(|event| !entries.iter().any(|entry| covers(*event, entry)))
        .cloned()
        .collect();

    tracing::debug!(
        entries = entries.len(),
        events = events.len(),
        extra = extra_entries.len(),
        missing = missing_entries.len(),
        "reconciled timesheet"
    );

    DiscrepancyReport {
        extra_entries,
        missing_entries,
    }
}

fn covers<O: Timed, I: Timed>(outer: &O, inner: &I) -> bool {
    outer.interval().contains(inner.interval())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

    use crate::offset::default_offset;
    use crate::types::Interval;

    fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        default_offset()
            .with_ymd_and_hms(2025, 3, 10, hour, minute, 0)
            .unwrap()
    }

    fn span(start: (u32, u32), end: (u32, u32)) -> Interval {
        Interval::new(at(start.0, start.1), at(end.0, end.1)).unwrap()
    }

    fn entry(start: (u32, u32), end: (u32, u32), project: &str) -> TimesheetEntry {
        TimesheetEntry::new(
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            span(start, end),
            Some(project.to_string()),
        )
    }

    fn event(start: (u32, u32), end: (u32, u32), summary: &str) -> CalendarEvent {
        CalendarEvent::new(span(start, end), Some(summary.to_string()))
    }

    #[test]
    fn empty_calendar_makes_every_entry_extra() {
        let entries = vec![entry((9, 0), (10, 0), "ProjA")];
        let report = reconcile(&entries, &[]);
        assert_eq!(report.extra_entries, entries);
        assert!(report.missing_entries.is_empty());
    }

    #[test]
    fn empty_timesheet_makes_every_event_missing() {
        let events = vec![event((9, 0), (11, 0), "Standup")];
        let report = reconcile(&[], &events);
        assert!(report.extra_entries.is_empty());
        assert_eq!(report.missing_entries, events);
    }

    #[test]
    fn both_empty_is_clean() {
        let report = reconcile(&[], &[]);
        assert!(report.is_clean());
    }

    #[test]
    fn contained_entry_matches_both_ways() {
        let report = reconcile(
            &[entry((9, 0), (10, 0), "ProjA")],
            &[event((9, 0), (12, 0), "Block")],
        );
        assert!(report.is_clean());
    }

    #[test]
    fn identical_bounds_match() {
        let report = reconcile(
            &[entry((9, 0), (11, 0), "ProjA")],
            &[event((9, 0), (11, 0), "Block")],
        );
        assert!(report.is_clean());
    }

    #[test]
    fn one_minute_past_the_end_does_not_match() {
        let report = reconcile(
            &[entry((9, 0), (11, 1), "ProjA")],
            &[event((9, 0), (11, 0), "Block")],
        );
        assert_eq!(report.extra_entries.len(), 1);
        assert_eq!(report.missing_entries.len(), 1);
    }

    #[test]
    fn partial_overlap_is_not_containment() {
        let entries = vec![entry((8, 30), (10, 0), "ProjA")];
        let events = vec![event((9, 0), (11, 0), "Block")];
        let report = reconcile(&entries, &events);
        assert_eq!(report.extra_entries, entries);
        assert_eq!(report.missing_entries, events);
    }

    #[test]
    fn straddling_adjacent_events_is_extra() {
        let report = reconcile(
            &[entry((9, 30), (10, 30), "ProjA")],
            &[event((9, 0), (10, 0), "First"), event((10, 0), (11, 0), "Second")],
        );
        assert_eq!(report.extra_entries.len(), 1);
        let missing: Vec<_> = report.missing_entries.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(missing, vec!["First", "Second"]);
    }

    #[test]
    fn zero_length_intervals_match_when_contained() {
        let report = reconcile(
            &[entry((9, 0), (9, 0), "Ping"), entry((10, 0), (10, 0), "Edge")],
            &[event((9, 0), (9, 0), "Instant"), event((9, 30), (10, 0), "Block")],
        );
        assert!(report.is_clean());
    }

    #[test]
    fn duplicates_are_judged_independently() {
        let entries = vec![
            entry((9, 0), (10, 0), "ProjA"),
            entry((9, 0), (10, 0), "ProjA"),
            entry((13, 0), (14, 0), "ProjB"),
            entry((13, 0), (14, 0), "ProjB"),
        ];
        let report = reconcile(&entries, &[event((8, 0), (12, 0), "Morning")]);
        assert_eq!(report.extra_entries, entries[2..].to_vec());
        assert!(report.missing_entries.is_empty());
    }

    #[test]
    fn output_preserves_input_order() {
        let entries = vec![
            entry((15, 0), (16, 0), "C"),
            entry((9, 0), (10, 0), "A"),
            entry((12, 0), (13, 0), "B"),
        ];
        let events = vec![
            event((18, 0), (19, 0), "Z"),
            event((7, 0), (8, 0), "X"),
            event((17, 0), (17, 30), "Y"),
        ];
        let report = reconcile(&entries, &events);
        let extra: Vec<_> = report.extra_entries.iter().map(|e| e.project.as_str()).collect();
        let missing: Vec<_> = report.missing_entries.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(extra, vec!["C", "A", "B"]);
        assert_eq!(missing, vec!["Z", "X", "Y"]);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let entries = vec![entry((9, 0), (10, 0), "A"), entry((8, 0), (9, 30), "B")];
        let events = vec![event((9, 0), (12, 0), "Block"), event((14, 0), (15, 0), "Sync")];
        assert_eq!(reconcile(&entries, &events), reconcile(&entries, &events));
    }

    #[test]
    fn offsets_do_not_affect_matching() {
        let utc = FixedOffset::east_opt(0).unwrap();
        // 03:30Z..06:30Z == 09:00..12:00 at +05:30
        let event = CalendarEvent::new(
            Interval::new(
                utc.with_ymd_and_hms(2025, 3, 10, 3, 30, 0).unwrap(),
                utc.with_ymd_and_hms(2025, 3, 10, 6, 30, 0).unwrap(),
            )
            .unwrap(),
            None,
        );
        let report = reconcile(&[entry((9, 0), (12, 0), "ProjA")], &[event]);
        assert!(report.is_clean());
    }

    #[test]
    fn extra_if_and_only_if_no_event_contains_entry() {
        let entries: Vec<_> = (0..12)
            .map(|i| entry((8 + i / 2, (i % 2) * 30), (9 + i / 2, 0), "E"))
            .collect();
        let events = vec![
            event((8, 0), (10, 0), "A"),
            event((11, 30), (13, 0), "B"),
            event((14, 0), (14, 0), "C"),
        ];
        let report = reconcile(&entries, &events);

        for e in &entries {
            let contained = events.iter().any(|ev| ev.interval.contains(&e.interval));
            assert_eq!(report.extra_entries.contains(e), !contained, "{}", e.interval);
        }
        for ev in &events {
            let covers_any = entries.iter().any(|e| ev.interval.contains(&e.interval));
            assert_eq!(report.missing_entries.contains(ev), !covers_any, "{}", ev.interval);
        }
    }
}
