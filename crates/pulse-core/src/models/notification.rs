use serde::{Deserialize, Serialize};

use crate::constants::{
    ANCHOR_FRAGMENT_PREFIX, CLIENT_PATH_PREFIX, ELLIPSIS, NOTIFICATION_BODY_MAX_CHARS,
};

/// A stable deep-link address for one feed entry: a path scoped to the
/// subject plus a fragment naming the target event
/// (`/clients/<subject>#comment-<eventId>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub subject_id: String,
    pub event_id: String,
}

impl Anchor {
    pub fn comment(subject_id: impl Into<String>, event_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            event_id: event_id.into(),
        }
    }

    pub fn to_url(&self) -> String {
        format!(
            "{}/{}#{}{}",
            CLIENT_PATH_PREFIX, self.subject_id, ANCHOR_FRAGMENT_PREFIX, self.event_id
        )
    }

    /// Parse an incoming deep link. Returns `None` for anything that does
    /// not carry a `#comment-<id>` fragment.
    pub fn parse(url: &str) -> Option<Self> {
        let (path, fragment) = url.split_once('#')?;
        let event_id = fragment.strip_prefix(ANCHOR_FRAGMENT_PREFIX)?;
        if event_id.is_empty() {
            return None;
        }
        let subject_id = path.rsplit('/').next().filter(|s| !s.is_empty())?;
        Some(Self::comment(subject_id, event_id))
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_url())
    }
}

/// A persisted mention notification. Created once at comment-submission
/// time, never mutated by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub recipient_user_id: String,
    pub title: String,
    /// Truncated quote of the comment body.
    pub body: String,
    /// Deep-link URL to the source comment.
    pub anchor: String,
    pub triggered_by_user_id: String,
    pub source_type: String,
    pub source_id: String,
}

impl Notification {
    pub fn comment_mention(
        recipient_user_id: impl Into<String>,
        author_id: &str,
        author_name: &str,
        subject_id: &str,
        comment_id: &str,
        text: &str,
    ) -> Self {
        Self {
            recipient_user_id: recipient_user_id.into(),
            title: format!("{} mentioned you in a comment", author_name),
            body: truncate_body(text),
            anchor: Anchor::comment(subject_id, comment_id).to_url(),
            triggered_by_user_id: author_id.to_string(),
            source_type: "comment".to_string(),
            source_id: comment_id.to_string(),
        }
    }
}

/// Quote at most `NOTIFICATION_BODY_MAX_CHARS` characters of the comment,
/// marking the cut with an ellipsis.
pub fn truncate_body(text: &str) -> String {
    if text.chars().count() <= NOTIFICATION_BODY_MAX_CHARS {
        return text.to_string();
    }
    let mut body: String = text.chars().take(NOTIFICATION_BODY_MAX_CHARS).collect();
    body.push_str(ELLIPSIS);
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_body() {
        let text = "x".repeat(150);
        let body = truncate_body(&text);
        assert_eq!(body.chars().count(), NOTIFICATION_BODY_MAX_CHARS + 1);
        assert!(body.ends_with(ELLIPSIS));
        assert_eq!(&body[..NOTIFICATION_BODY_MAX_CHARS], &text[..NOTIFICATION_BODY_MAX_CHARS]);
    }

    #[test]
    fn test_short_body_untouched() {
        let text = "y".repeat(80);
        assert_eq!(truncate_body(&text), text);
    }

    #[test]
    fn test_exact_limit_untouched() {
        let text = "z".repeat(100);
        assert_eq!(truncate_body(&text), text);
    }

    #[test]
    fn test_anchor_roundtrip() {
        let anchor = Anchor::comment("client-42", "c-abc");
        let url = anchor.to_url();
        assert_eq!(url, "/clients/client-42#comment-c-abc");
        assert_eq!(Anchor::parse(&url), Some(anchor));
    }

    #[test]
    fn test_anchor_parse_rejects_foreign_fragments() {
        assert_eq!(Anchor::parse("/clients/client-42#section-top"), None);
        assert_eq!(Anchor::parse("/clients/client-42"), None);
        assert_eq!(Anchor::parse("/clients/client-42#comment-"), None);
    }
}
