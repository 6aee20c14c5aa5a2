//! Pure, re-run-on-demand computations over merged feed data.
//!
//! The main feed and the conversation view are both views over the same
//! merged set; there is never a second merge with different rules.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::{FilterSet, TimelineEvent};

/// Merge heterogeneous event batches into one ordered sequence.
///
/// Batches are concatenated in the order given, deduplicated by id keeping
/// the first occurrence, then stable-sorted by timestamp descending. The
/// stable sort is what preserves source order for equal timestamps.
pub fn merge<I>(batches: I) -> Vec<TimelineEvent>
where
    I: IntoIterator<Item = Vec<TimelineEvent>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut events: Vec<TimelineEvent> = Vec::new();

    for batch in batches {
        for event in batch {
            // A second occurrence of a known id is silently dropped,
            // not an error.
            if seen.insert(event.id.clone()) {
                events.push(event);
            }
        }
    }

    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events
}

/// Keep the events the active filter set lets through.
pub fn apply_filters<'a>(
    events: &'a [TimelineEvent],
    filters: &FilterSet,
) -> Vec<&'a TimelineEvent> {
    events.iter().filter(|e| filters.allows(e.kind())).collect()
}

/// One calendar day of the conversation view.
#[derive(Debug)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    /// Oldest first, so the day reads like a conversation.
    pub events: Vec<&'a TimelineEvent>,
}

/// Group an already newest-first sequence by calendar day: newest day
/// first, ascending within each day.
pub fn group_by_day<'a, I>(events: I) -> Vec<DayGroup<'a>>
where
    I: IntoIterator<Item = &'a TimelineEvent>,
{
    let mut groups: Vec<DayGroup<'a>> = Vec::new();

    for event in events {
        let date = event.timestamp.date_naive();
        match groups.last_mut() {
            Some(group) if group.date == date => group.events.push(event),
            _ => groups.push(DayGroup {
                date,
                events: vec![event],
            }),
        }
    }

    // Input was newest-first, so each day collected newest-first too.
    for group in &mut groups {
        group.events.reverse();
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventKind;
    use crate::store::ingest::decode_batch;
    use serde_json::json;

    fn event(id: &str, ts: &str, kind: &str) -> TimelineEvent {
        TimelineEvent::from_value(&json!({
            "id": id,
            "kind": kind,
            "title": id,
            "timestamp": ts,
        }))
        .unwrap()
    }

    fn ids(events: &[TimelineEvent]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_merge_sorts_newest_first() {
        let merged = merge(vec![
            vec![event("a", "2026-03-01T10:00:00Z", "message")],
            vec![
                event("b", "2026-03-03T10:00:00Z", "risk"),
                event("c", "2026-03-02T10:00:00Z", "roi"),
            ],
        ]);
        assert_eq!(ids(&merged), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_merge_is_idempotent_over_duplicate_batches() {
        let batch = vec![
            event("a", "2026-03-01T10:00:00Z", "message"),
            event("b", "2026-03-02T10:00:00Z", "comment"),
        ];
        let once = merge(vec![batch.clone()]);
        let twice = merge(vec![batch.clone(), batch]);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn test_merge_keeps_first_occurrence_of_duplicate_id() {
        let first = event("a", "2026-03-01T10:00:00Z", "message");
        let mut second = event("a", "2026-03-05T10:00:00Z", "risk");
        second.title = "later copy".to_string();

        let merged = merge(vec![vec![first], vec![second]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind(), EventKind::Message);
    }

    #[test]
    fn test_equal_timestamps_preserve_source_order() {
        let ts = "2026-03-01T10:00:00Z";
        let merged = merge(vec![
            vec![event("first", ts, "message"), event("second", ts, "roi")],
            vec![event("third", ts, "risk")],
        ]);
        assert_eq!(ids(&merged), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_filters_pass_exempt_kinds() {
        let events = merge(vec![vec![
            event("m", "2026-03-01T10:00:00Z", "message"),
            event("s", "2026-03-02T10:00:00Z", "session"),
            event("f", "2026-03-03T10:00:00Z", "field_change"),
        ]]);

        let mut filters = FilterSet::new();
        filters.toggle(EventKind::Roi);

        let visible = apply_filters(&events, &filters);
        let visible_ids: Vec<_> = visible.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(visible_ids, vec!["f", "s"]);
    }

    #[test]
    fn test_unknown_kind_survives_merge_and_empty_filter() {
        let batch = decode_batch(&[json!({
            "id": "u1",
            "kind": "from_the_future",
            "title": "?",
            "timestamp": "2026-03-01T10:00:00Z",
        })]);
        let merged = merge(vec![batch]);
        assert_eq!(merged.len(), 1);
        assert!(FilterSet::new().allows(merged[0].kind()));
    }

    #[test]
    fn test_group_by_day() {
        let events = merge(vec![vec![
            event("a", "2026-03-01T09:00:00Z", "message"),
            event("b", "2026-03-01T17:00:00Z", "comment"),
            event("c", "2026-03-02T08:00:00Z", "risk"),
        ]]);
        let refs: Vec<&TimelineEvent> = events.iter().collect();
        let groups = group_by_day(refs);

        assert_eq!(groups.len(), 2);
        // Newest day first.
        assert_eq!(groups[0].date.to_string(), "2026-03-02");
        // Ascending inside the day.
        let day_ids: Vec<_> = groups[1].events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(day_ids, vec!["a", "b"]);
    }
}
