//! Feed-wide constants
//!
//! Centralized location for magic values that are used across
//! multiple modules.

/// Number of entries the feed shows before "reveal older" is used.
pub const DEFAULT_INITIAL_WINDOW: usize = 10;

/// How long a highlighted entry glows before it starts fading, in milliseconds.
pub const HIGHLIGHT_GLOW_MS: u64 = 2500;

/// Duration of the highlight fade-out, in milliseconds.
pub const HIGHLIGHT_FADE_MS: u64 = 500;

/// Maximum number of characters quoted in a notification body.
pub const NOTIFICATION_BODY_MAX_CHARS: usize = 100;

/// Marker appended to a truncated notification body.
pub const ELLIPSIS: &str = "…";

/// Fragment prefix used by deep-link anchors (`.../<subject>#comment-<id>`).
pub const ANCHOR_FRAGMENT_PREFIX: &str = "comment-";

/// Path prefix under which client feeds are addressed.
pub const CLIENT_PATH_PREFIX: &str = "/clients";
