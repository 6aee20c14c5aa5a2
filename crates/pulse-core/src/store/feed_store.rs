use std::collections::HashSet;

use crate::config::FeedConfig;
use crate::events::DetectionAdvisory;
use crate::models::{CommentOrigin, EventKind, FilterSet, TimelineEvent};
use crate::push::{PushChange, PushOp};
use crate::store::views::{self, DayGroup};

/// What a reconciler fold actually did to the in-memory feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Inserted,
    Updated,
    Removed,
    /// Duplicate insert echo or delete/update for an id never seen.
    /// Both are expected channel behavior, not errors.
    Ignored,
}

/// Result of folding one push change.
#[derive(Debug)]
pub struct FoldResult {
    pub applied: Applied,
    pub advisory: Option<DetectionAdvisory>,
}

/// Single source of truth for one subject's feed.
///
/// Owns the merged event sequence plus the explicit per-feed state the
/// aggregator and highlight navigator operate on: active filters, display
/// window, viewer identity. All queries are synchronous and pure; all
/// mutation goes through named commands on this type.
pub struct FeedStore {
    subject_id: String,
    /// Merged, deduplicated, newest first.
    events: Vec<TimelineEvent>,
    ids: HashSet<String>,
    filters: FilterSet,
    /// `Some(n)` shows the first n filtered entries; `None` shows all.
    window: Option<usize>,
    initial_window: usize,
    viewer_id: Option<String>,
}

impl FeedStore {
    pub fn new(subject_id: impl Into<String>, config: &FeedConfig) -> Self {
        Self {
            subject_id: subject_id.into(),
            events: Vec::new(),
            ids: HashSet::new(),
            filters: FilterSet::new(),
            window: Some(config.initial_window),
            initial_window: config.initial_window,
            viewer_id: None,
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Identify the local viewer, so their own live-inserted comments do
    /// not raise advisories.
    pub fn set_viewer(&mut self, user_id: impl Into<String>) {
        self.viewer_id = Some(user_id.into());
    }

    pub fn viewer_id(&self) -> Option<&str> {
        self.viewer_id.as_deref()
    }

    // ===== Loading and queries =====

    /// Replace the feed contents with a fresh merge of the given batches.
    pub fn load_batches(&mut self, batches: Vec<Vec<TimelineEvent>>) {
        self.events = views::merge(batches);
        self.ids = self.events.iter().map(|e| e.id.clone()).collect();
    }

    /// The full merged sequence, newest first.
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn find(&self, id: &str) -> Option<&TimelineEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Main feed view: filtered, newest first, truncated to the window.
    pub fn visible(&self) -> Vec<&TimelineEvent> {
        let mut filtered = views::apply_filters(&self.events, &self.filters);
        if let Some(limit) = self.window {
            filtered.truncate(limit);
        }
        filtered
    }

    /// Conversation view over the same visible entries, grouped by day.
    pub fn day_groups(&self) -> Vec<DayGroup<'_>> {
        views::group_by_day(self.visible())
    }

    /// Position of an id in the filtered (un-windowed) sequence. `None`
    /// means the entry is absent or filtered out by kind.
    pub fn filtered_position(&self, id: &str) -> Option<usize> {
        views::apply_filters(&self.events, &self.filters)
            .iter()
            .position(|e| e.id == id)
    }

    // ===== Filters and window =====

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn toggle_filter(&mut self, kind: EventKind) -> &FilterSet {
        self.filters.toggle(kind)
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn window_limit(&self) -> Option<usize> {
        self.window
    }

    /// Lift the display window from the initial truncation to "all".
    pub fn reveal_older(&mut self) {
        self.window = None;
    }

    /// Restore the initial truncated window (used when switching subjects).
    pub fn reset_window(&mut self) {
        self.window = Some(self.initial_window);
    }

    // ===== Live update reconciliation =====

    /// Fold one push change into the merged feed, preserving merge
    /// invariants. Folds are applied strictly in delivery order.
    pub fn apply(&mut self, change: PushChange) -> FoldResult {
        match change.op {
            PushOp::Insert => self.fold_insert(change.event),
            PushOp::Update => self.fold_update(change.event),
            PushOp::Delete => self.fold_delete(&change.event.id),
        }
    }

    fn fold_insert(&mut self, event: TimelineEvent) -> FoldResult {
        if self.ids.contains(&event.id) {
            // Server echo of an optimistic local insert.
            tracing::debug!(id = %event.id, "ignoring duplicate insert");
            return FoldResult {
                applied: Applied::Ignored,
                advisory: None,
            };
        }

        let advisory = self.detection_advisory(&event);
        self.insert_sorted(event);
        FoldResult {
            applied: Applied::Inserted,
            advisory,
        }
    }

    fn fold_update(&mut self, event: TimelineEvent) -> FoldResult {
        let Some(pos) = self.events.iter().position(|e| e.id == event.id) else {
            // Never saw this id: treat as insert.
            return self.fold_insert(event);
        };

        if self.events[pos].timestamp == event.timestamp {
            self.events[pos] = event;
        } else {
            // The occurrence time moved; re-position to keep the order
            // invariant intact.
            self.events.remove(pos);
            self.insert_sorted(event);
        }
        FoldResult {
            applied: Applied::Updated,
            advisory: None,
        }
    }

    fn fold_delete(&mut self, id: &str) -> FoldResult {
        if !self.ids.remove(id) {
            // Desynced channel; a delete for an unknown id is a no-op.
            tracing::debug!(id = %id, "delete for unknown id, ignoring");
            return FoldResult {
                applied: Applied::Ignored,
                advisory: None,
            };
        }
        self.events.retain(|e| e.id != id);
        FoldResult {
            applied: Applied::Removed,
            advisory: None,
        }
    }

    /// Insert keeping newest-first order. An event equal in timestamp to
    /// existing entries lands after them: delivery order is its insertion
    /// order.
    fn insert_sorted(&mut self, event: TimelineEvent) {
        self.ids.insert(event.id.clone());
        let pos = self
            .events
            .partition_point(|e| e.timestamp >= event.timestamp);
        self.events.insert(pos, event);
    }

    /// A comment inserted by automated detection on someone else's behalf
    /// gets a one-shot advisory cue for the viewer.
    fn detection_advisory(&self, event: &TimelineEvent) -> Option<DetectionAdvisory> {
        let meta = event.as_comment()?;
        if meta.origin != CommentOrigin::Detection {
            return None;
        }
        if self.viewer_id.as_deref() == Some(meta.author_id.as_str()) {
            return None;
        }
        Some(DetectionAdvisory {
            comment_id: event.id.clone(),
            author_name: meta.author_name.clone(),
            title: event.title.clone(),
        })
    }
}
