/// Errors surfaced by the feed core.
///
/// Per-event problems inside a batch are handled skip-and-continue at the
/// ingest boundary; `MalformedEvent` exists so that boundary can log and
/// report what it dropped. The other variants are failures a caller of
/// `submit_comment` can actually act on.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// One event could not be decoded (bad timestamp, unreadable shape).
    /// The rest of the batch continues.
    #[error("malformed event {id}: {reason}")]
    MalformedEvent { id: String, reason: String },

    /// The comment record could not be persisted. Fatal for that submission;
    /// mentions are not parsed and no notifications are created.
    #[error("failed to persist comment: {0}")]
    CommentPersist(#[source] anyhow::Error),

    /// The notification batch could not be persisted. Reported to the
    /// caller, but the already-created comment stands.
    #[error("failed to dispatch notifications: {0}")]
    NotificationDispatch(#[source] anyhow::Error),
}

impl FeedError {
    /// Build a `MalformedEvent` from whatever id could be recovered.
    pub fn malformed(id: Option<String>, reason: impl ToString) -> Self {
        Self::MalformedEvent {
            id: id.unwrap_or_else(|| "<unknown>".to_string()),
            reason: reason.to_string(),
        }
    }
}
