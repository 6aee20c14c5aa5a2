pub mod event;
pub mod filter;
pub mod notification;
pub mod user;

pub use event::{
    CommentMeta, CommentOrigin, EventKind, EventPayload, FileRef, FormAnswer, MessageDirection,
    RiskLevel, TimelineEvent,
};
pub use filter::FilterSet;
pub use notification::{Anchor, Notification};
pub use user::UserEntry;
