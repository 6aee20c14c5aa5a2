use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// The closed set of feed entry kinds.
///
/// `Other` is the fallback for wire kinds this build does not know about:
/// such events still merge, sort and filter normally and render with a
/// default presentation. They are never dropped for being unrecognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Message,
    Roi,
    Risk,
    Recommendation,
    Session,
    Comment,
    FieldChange,
    LifeEvent,
    Financial,
    Followup,
    FormResponse,
    #[serde(other)]
    Other,
}

impl EventKind {
    /// Kinds treated as structural narration rather than content: they
    /// bypass the active filter set entirely.
    pub fn is_exempt(self) -> bool {
        matches!(self, Self::Session | Self::FieldChange)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Roi => "roi",
            Self::Risk => "risk",
            Self::Recommendation => "recommendation",
            Self::Session => "session",
            Self::Comment => "comment",
            Self::FieldChange => "field_change",
            Self::LifeEvent => "life_event",
            Self::Financial => "financial",
            Self::Followup => "followup",
            Self::FormResponse => "form_response",
            Self::Other => "other",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "message" => Some(Self::Message),
            "roi" => Some(Self::Roi),
            "risk" => Some(Self::Risk),
            "recommendation" => Some(Self::Recommendation),
            "session" => Some(Self::Session),
            "comment" => Some(Self::Comment),
            "field_change" => Some(Self::FieldChange),
            "life_event" => Some(Self::LifeEvent),
            "financial" => Some(Self::Financial),
            "followup" => Some(Self::Followup),
            "form_response" => Some(Self::FormResponse),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    #[default]
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Where a comment came from: typed by a person, or raised by automated
/// detection (risk scans, churn signals) on the person's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentOrigin {
    #[default]
    User,
    Detection,
}

/// Reference to a file attached to a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Comment-specific metadata. Comments are the only kind the core creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentMeta {
    pub author_id: String,
    pub author_name: String,
    #[serde(default)]
    pub origin: CommentOrigin,
    #[serde(default)]
    pub attachment: Option<FileRef>,
}

/// One answered question of a submitted form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormAnswer {
    pub question: String,
    pub answer: String,
}

/// Kind-specific metadata, discriminated by the wire `kind` field.
///
/// Everything except `Comment` is read-only display data handed to us by
/// external producers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    Message {
        #[serde(default)]
        direction: MessageDirection,
        #[serde(default)]
        channel: Option<String>,
    },
    Roi {
        #[serde(default)]
        impact: Option<String>,
        #[serde(default)]
        category: Option<String>,
    },
    Risk {
        #[serde(default)]
        level: Option<RiskLevel>,
        #[serde(default)]
        category: Option<String>,
    },
    Recommendation {
        #[serde(default)]
        category: Option<String>,
    },
    Session {
        #[serde(default)]
        recurring: bool,
    },
    Comment(CommentMeta),
    FieldChange {
        #[serde(default)]
        field: String,
        #[serde(default)]
        old_value: Option<String>,
        #[serde(default)]
        new_value: Option<String>,
    },
    LifeEvent {
        #[serde(default)]
        category: Option<String>,
    },
    Financial {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        amount: Option<f64>,
    },
    Followup {
        #[serde(default)]
        assignee: Option<String>,
        #[serde(default)]
        completed: bool,
    },
    FormResponse {
        #[serde(default)]
        form: Option<String>,
        #[serde(default)]
        answers: Vec<FormAnswer>,
    },
    #[serde(other)]
    Other,
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Message { .. } => EventKind::Message,
            Self::Roi { .. } => EventKind::Roi,
            Self::Risk { .. } => EventKind::Risk,
            Self::Recommendation { .. } => EventKind::Recommendation,
            Self::Session { .. } => EventKind::Session,
            Self::Comment(_) => EventKind::Comment,
            Self::FieldChange { .. } => EventKind::FieldChange,
            Self::LifeEvent { .. } => EventKind::LifeEvent,
            Self::Financial { .. } => EventKind::Financial,
            Self::Followup { .. } => EventKind::Followup,
            Self::FormResponse { .. } => EventKind::FormResponse,
            Self::Other => EventKind::Other,
        }
    }
}

/// One entry of the unified client timeline.
///
/// `id` is stable across re-fetch and live updates and unique within a
/// feed instance; a later occurrence of a known id is silently dropped by
/// the merge, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// When the event occurred, not when it was fetched. RFC 3339 on the wire.
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl TimelineEvent {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    pub fn as_comment(&self) -> Option<&CommentMeta> {
        match &self.payload {
            EventPayload::Comment(meta) => Some(meta),
            _ => None,
        }
    }

    /// Decode a single wire event.
    ///
    /// Batch ingestion calls this per entry so one malformed timestamp (or
    /// otherwise undecodable event) drops that event alone, not the batch.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, FeedError> {
        serde_json::from_value(value.clone()).map_err(|e| {
            let id = value
                .get("id")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            FeedError::malformed(id, e)
        })
    }

    /// Build the optimistic local representation of a freshly submitted
    /// comment. Title is derived from the first line of the body.
    pub fn new_comment(
        id: String,
        author_id: String,
        author_name: String,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let title = derive_title(text);
        Self {
            id,
            title,
            description: Some(text.to_string()),
            timestamp,
            payload: EventPayload::Comment(CommentMeta {
                author_id,
                author_name,
                origin: CommentOrigin::User,
                attachment: None,
            }),
        }
    }
}

/// First line of the text, truncated to 50 chars ("Untitled" if empty).
fn derive_title(text: &str) -> String {
    let title = text
        .lines()
        .next()
        .unwrap_or("Untitled")
        .chars()
        .take(50)
        .collect::<String>()
        .trim()
        .to_string();

    if title.is_empty() {
        "Untitled".to_string()
    } else {
        title
    }
}
