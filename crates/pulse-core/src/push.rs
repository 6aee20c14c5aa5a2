//! Change notifications delivered by the backend push channel.
//!
//! The transport is a collaborator: all the core assumes is a reliable,
//! at-least-once channel that preserves delivery order per event id. The
//! reconciler applies folds in the order they arrive and never reorders.

use serde::{Deserialize, Serialize};

use crate::models::TimelineEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushOp {
    Insert,
    Update,
    Delete,
}

/// One `{op, event}` tuple scoped to the comment sub-stream of a subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushChange {
    pub op: PushOp,
    pub event: TimelineEvent,
}
