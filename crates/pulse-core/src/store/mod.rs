pub mod feed_store;
pub mod ingest;
pub mod persist;
pub mod views;

pub use feed_store::{Applied, FeedStore, FoldResult};
pub use ingest::decode_batch;
pub use persist::{
    CommentRecord, CommentStore, InMemoryStore, JsonDataStore, NewComment, NotificationStore,
};
pub use views::{apply_filters, group_by_day, merge, DayGroup};
