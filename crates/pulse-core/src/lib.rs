//! Unified client timeline core: merge independent event streams into one
//! ordered, filterable feed, route comment @mentions to notifications,
//! fold live push updates in without duplicates, and drive the timed
//! highlight of deep-linked entries.

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod highlight;
pub mod mentions;
pub mod models;
pub mod notify;
pub mod push;
pub mod runtime;
pub mod store;

pub use config::FeedConfig;
pub use error::FeedError;
pub use events::{DetectionAdvisory, FeedEvent};
pub use highlight::{HighlightNavigator, HighlightPhase};
pub use models::{Anchor, EventKind, FilterSet, Notification, TimelineEvent, UserEntry};
pub use runtime::{CommentComposer, FeedHandle, FeedRuntime, FeedUpdate, SubmitReceipt};
pub use store::{FeedStore, JsonDataStore};
