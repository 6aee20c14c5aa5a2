//! Timed emphasis of a deep-linked feed entry.
//!
//! One three-state machine per feed instance: `idle → glow → fading →
//! idle`, driven by a single generation-guarded timer. The navigator is
//! pure; the runtime arms real timers from the [`TimerRequest`]s it
//! returns and feeds expiries back in. A superseded timer that still fires
//! carries a stale generation and is ignored, so chained or leaked
//! timeouts cannot occur.

use std::time::Duration;

use crate::config::FeedConfig;
use crate::models::Anchor;
use crate::store::FeedStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightPhase {
    Idle,
    Glow,
    Fading,
}

/// Ask the runtime to fire `timer_elapsed(generation)` after the delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub generation: u64,
    pub after: Duration,
}

/// What the runtime must do after a transition.
#[derive(Debug, PartialEq, Eq)]
pub enum HighlightEffect {
    /// Target located: scroll it into view and arm the glow timer.
    Begin {
        event_id: String,
        /// True when the window had to be lifted to reach the target.
        revealed: bool,
        timer: TimerRequest,
    },
    /// Glow dwell over: arm the fade timer.
    StartFade { timer: TimerRequest },
    /// Fade over: emphasis cleared.
    Cleared,
    /// Unknown target or stale timer; nothing to do.
    None,
}

pub struct HighlightNavigator {
    phase: HighlightPhase,
    target: Option<String>,
    /// Bumped on every accepted anchor; timers carry the generation they
    /// were armed under.
    generation: u64,
    glow: Duration,
    fade: Duration,
}

impl HighlightNavigator {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            phase: HighlightPhase::Idle,
            target: None,
            generation: 0,
            glow: config.highlight_glow,
            fade: config.highlight_fade,
        }
    }

    pub fn phase(&self) -> HighlightPhase {
        self.phase
    }

    /// The entry currently emphasized. Cleared only on the final
    /// transition back to idle.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// An anchor arrived for this feed. Last request wins: any in-flight
    /// glow or fade is superseded and the machine restarts at glow for the
    /// new target. An unlocatable target (wrong subject, filtered out,
    /// nonexistent) is a silent no-op.
    pub fn anchor_received(&mut self, anchor: &Anchor, store: &mut FeedStore) -> HighlightEffect {
        if anchor.subject_id != store.subject_id() {
            return HighlightEffect::None;
        }
        let Some(position) = store.filtered_position(&anchor.event_id) else {
            return HighlightEffect::None;
        };

        let revealed = match store.window_limit() {
            Some(limit) if position >= limit => {
                store.reveal_older();
                true
            }
            _ => false,
        };

        self.generation += 1;
        self.phase = HighlightPhase::Glow;
        self.target = Some(anchor.event_id.clone());

        HighlightEffect::Begin {
            event_id: anchor.event_id.clone(),
            revealed,
            timer: TimerRequest {
                generation: self.generation,
                after: self.glow,
            },
        }
    }

    /// A timer armed under `generation` expired.
    pub fn timer_elapsed(&mut self, generation: u64) -> HighlightEffect {
        if generation != self.generation {
            // Armed for a target that has since been superseded.
            return HighlightEffect::None;
        }

        match self.phase {
            HighlightPhase::Idle => HighlightEffect::None,
            HighlightPhase::Glow => {
                self.phase = HighlightPhase::Fading;
                HighlightEffect::StartFade {
                    timer: TimerRequest {
                        generation,
                        after: self.fade,
                    },
                }
            }
            HighlightPhase::Fading => {
                self.phase = HighlightPhase::Idle;
                self.target = None;
                HighlightEffect::Cleared
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimelineEvent;
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

    fn loaded_store(count: usize) -> FeedStore {
        let mut store = FeedStore::new("client-42", &FeedConfig::default());
        let batch: Vec<TimelineEvent> = (0..count)
            .map(|i| {
                event(
                    &format!("e{i}"),
                    &format!("2026-03-01T10:{:02}:00Z", count - 1 - i),
                    "message",
                )
            })
            .collect();
        store.load_batches(vec![batch]);
        store
    }

    fn navigator() -> HighlightNavigator {
        HighlightNavigator::new(&FeedConfig::default())
    }

    #[test]
    fn test_full_lifecycle() {
        let mut store = loaded_store(3);
        let mut nav = navigator();
        let anchor = Anchor::comment("client-42", "e1");

        let effect = nav.anchor_received(&anchor, &mut store);
        let timer = match effect {
            HighlightEffect::Begin {
                event_id,
                revealed,
                timer,
            } => {
                assert_eq!(event_id, "e1");
                assert!(!revealed);
                timer
            }
            other => panic!("expected Begin, got {:?}", other),
        };
        assert_eq!(nav.phase(), HighlightPhase::Glow);
        assert_eq!(nav.target(), Some("e1"));

        let fade_timer = match nav.timer_elapsed(timer.generation) {
            HighlightEffect::StartFade { timer } => timer,
            other => panic!("expected StartFade, got {:?}", other),
        };
        assert_eq!(nav.phase(), HighlightPhase::Fading);
        // Target survives the fade phase.
        assert_eq!(nav.target(), Some("e1"));

        assert_eq!(
            nav.timer_elapsed(fade_timer.generation),
            HighlightEffect::Cleared
        );
        assert_eq!(nav.phase(), HighlightPhase::Idle);
        assert_eq!(nav.target(), None);
    }

    #[test]
    fn test_unknown_target_is_silent_noop() {
        let mut store = loaded_store(3);
        let mut nav = navigator();
        let anchor = Anchor::comment("client-42", "missing");

        assert_eq!(nav.anchor_received(&anchor, &mut store), HighlightEffect::None);
        assert_eq!(nav.phase(), HighlightPhase::Idle);
    }

    #[test]
    fn test_foreign_subject_is_silent_noop() {
        let mut store = loaded_store(3);
        let mut nav = navigator();
        let anchor = Anchor::comment("someone-else", "e1");

        assert_eq!(nav.anchor_received(&anchor, &mut store), HighlightEffect::None);
    }

    #[test]
    fn test_filtered_out_target_is_silent_noop() {
        let mut store = loaded_store(3);
        store.toggle_filter(crate::models::EventKind::Risk);
        let mut nav = navigator();
        let anchor = Anchor::comment("client-42", "e1");

        assert_eq!(nav.anchor_received(&anchor, &mut store), HighlightEffect::None);
        assert_eq!(nav.phase(), HighlightPhase::Idle);
    }

    #[test]
    fn test_target_outside_window_forces_reveal() {
        // 15 events, window of 10; target the oldest.
        let mut store = loaded_store(15);
        let mut nav = navigator();
        let anchor = Anchor::comment("client-42", "e14");

        match nav.anchor_received(&anchor, &mut store) {
            HighlightEffect::Begin { revealed, .. } => assert!(revealed),
            other => panic!("expected Begin, got {:?}", other),
        }
        assert_eq!(store.window_limit(), None);
        assert_eq!(store.visible().len(), 15);
    }

    #[test]
    fn test_new_anchor_supersedes_inflight_highlight() {
        let mut store = loaded_store(3);
        let mut nav = navigator();

        let first = match nav.anchor_received(&Anchor::comment("client-42", "e0"), &mut store) {
            HighlightEffect::Begin { timer, .. } => timer,
            other => panic!("expected Begin, got {:?}", other),
        };

        // Second anchor while the first glow is still pending.
        match nav.anchor_received(&Anchor::comment("client-42", "e2"), &mut store) {
            HighlightEffect::Begin { event_id, .. } => assert_eq!(event_id, "e2"),
            other => panic!("expected Begin, got {:?}", other),
        }
        assert_eq!(nav.target(), Some("e2"));

        // The superseded timer fires late and must change nothing.
        assert_eq!(nav.timer_elapsed(first.generation), HighlightEffect::None);
        assert_eq!(nav.phase(), HighlightPhase::Glow);
        assert_eq!(nav.target(), Some("e2"));
    }

    #[test]
    fn test_timer_in_idle_is_ignored() {
        let mut nav = navigator();
        assert_eq!(nav.timer_elapsed(0), HighlightEffect::None);
    }
}
