use crate::highlight::HighlightPhase;

/// One-shot advisory raised when automated detection files a comment on a
/// feed the viewer is watching. Ephemeral UI cue, fire-and-forget, never
/// persisted; routed notifications are a separate, stored concept.
#[derive(Debug, Clone)]
pub struct DetectionAdvisory {
    pub comment_id: String,
    pub author_name: String,
    pub title: String,
}

/// Outbound cues the runtime emits to the surrounding shell.
#[derive(Debug)]
pub enum FeedEvent {
    /// The merged feed changed; re-render from the store.
    FeedChanged,
    /// Bring the given entry into view.
    ScrollTo { event_id: String },
    /// The highlight machine moved.
    HighlightChanged {
        target: Option<String>,
        phase: HighlightPhase,
    },
    Advisory(DetectionAdvisory),
}
