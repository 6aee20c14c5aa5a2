use std::collections::HashSet;

use super::event::EventKind;

/// The set of event kinds currently selected for display.
///
/// Empty means "no filter, show all". `session` and `field_change` are
/// system narration and always pass regardless of the set's contents.
/// Owned by one feed instance, never ambient global state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    active: HashSet<EventKind>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn contains(&self, kind: EventKind) -> bool {
        self.active.contains(&kind)
    }

    /// Add the kind if absent, remove it if present. Returns the updated
    /// set so callers can re-render from it.
    pub fn toggle(&mut self, kind: EventKind) -> &FilterSet {
        if !self.active.remove(&kind) {
            self.active.insert(kind);
        }
        self
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn allows(&self, kind: EventKind) -> bool {
        self.active.is_empty() || kind.is_exempt() || self.active.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_allows_everything() {
        let filters = FilterSet::new();
        assert!(filters.allows(EventKind::Message));
        assert!(filters.allows(EventKind::Other));
    }

    #[test]
    fn test_exempt_kinds_always_pass() {
        let mut filters = FilterSet::new();
        filters.toggle(EventKind::Roi);
        assert!(filters.allows(EventKind::Session));
        assert!(filters.allows(EventKind::FieldChange));
        assert!(!filters.allows(EventKind::Message));
        assert!(filters.allows(EventKind::Roi));
    }

    #[test]
    fn test_toggle_twice_removes() {
        let mut filters = FilterSet::new();
        filters.toggle(EventKind::Risk);
        assert!(filters.contains(EventKind::Risk));
        filters.toggle(EventKind::Risk);
        assert!(filters.is_empty());
    }
}
