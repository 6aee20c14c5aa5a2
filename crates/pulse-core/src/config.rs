use std::time::Duration;

use crate::constants::{DEFAULT_INITIAL_WINDOW, HIGHLIGHT_FADE_MS, HIGHLIGHT_GLOW_MS};

/// Tuning knobs for one feed instance.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// How many entries the truncated main view shows initially.
    pub initial_window: usize,
    /// Dwell time of the highlight glow phase.
    pub highlight_glow: Duration,
    /// Duration of the highlight fade phase.
    pub highlight_fade: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            initial_window: DEFAULT_INITIAL_WINDOW,
            highlight_glow: Duration::from_millis(HIGHLIGHT_GLOW_MS),
            highlight_fade: Duration::from_millis(HIGHLIGHT_FADE_MS),
        }
    }
}
