//! Decoding of producer batches at the feed boundary.

use crate::models::TimelineEvent;

/// Decode one wire batch, event by event.
///
/// A malformed entry (unparseable timestamp, unreadable shape) is fatal for
/// that single event only: it is dropped with a warning and the rest of the
/// batch continues.
pub fn decode_batch(values: &[serde_json::Value]) -> Vec<TimelineEvent> {
    values
        .iter()
        .filter_map(|value| match TimelineEvent::from_value(value) {
            Ok(event) => Some(event),
            Err(err) => {
                tracing::warn!("dropping event from batch: {err}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_malformed_entry_does_not_poison_batch() {
        let values = vec![
            json!({
                "id": "good-1",
                "kind": "message",
                "title": "ok",
                "timestamp": "2026-03-01T10:00:00Z",
            }),
            json!({
                "id": "bad",
                "kind": "message",
                "title": "broken clock",
                "timestamp": "yesterday-ish",
            }),
            json!({
                "id": "good-2",
                "kind": "session",
                "title": "ok too",
                "timestamp": "2026-03-02T10:00:00Z",
            }),
        ];

        let events = decode_batch(&values);
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["good-1", "good-2"]);
    }
}
