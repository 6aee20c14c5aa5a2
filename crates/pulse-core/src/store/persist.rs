//! Persistence collaborators for the two records the core creates.
//!
//! Schema design belongs to the backend; the core only needs "create a
//! comment, get its id back" and "create a notification batch". The traits
//! take `&self` so implementations decide their own interior locking.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Notification;

/// A comment as handed to persistence: text, author, subject.
#[derive(Debug, Clone)]
pub struct NewComment<'a> {
    pub subject_id: &'a str,
    pub author_id: &'a str,
    pub text: &'a str,
}

/// The persisted comment record, as echoed back by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub subject_id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

pub trait CommentStore {
    /// Create one comment record and return its generated id.
    fn create_comment(&self, comment: &NewComment<'_>) -> Result<CommentRecord>;
}

pub trait NotificationStore {
    /// Persist the batch as one logical operation.
    fn create_batch(&self, notifications: &[Notification]) -> Result<()>;
}

fn generate_comment_id() -> String {
    format!("comment-{}", Uuid::new_v4())
}

fn build_record(comment: &NewComment<'_>) -> CommentRecord {
    CommentRecord {
        id: generate_comment_id(),
        subject_id: comment.subject_id.to_string(),
        author_id: comment.author_id.to_string(),
        text: comment.text.to_string(),
        created_at: Utc::now(),
    }
}

// =============================================================================
// InMemoryStore - tests and demos
// =============================================================================

#[derive(Default)]
pub struct InMemoryStore {
    comments: Mutex<Vec<CommentRecord>>,
    notifications: Mutex<Vec<Notification>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comments(&self) -> Vec<CommentRecord> {
        self.comments.lock().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }
}

impl CommentStore for InMemoryStore {
    fn create_comment(&self, comment: &NewComment<'_>) -> Result<CommentRecord> {
        let record = build_record(comment);
        self.comments.lock().push(record.clone());
        Ok(record)
    }
}

impl NotificationStore for InMemoryStore {
    fn create_batch(&self, notifications: &[Notification]) -> Result<()> {
        self.notifications.lock().extend_from_slice(notifications);
        Ok(())
    }
}

// =============================================================================
// JsonDataStore - flat-file persistence for the CLI shell
// =============================================================================

/// Comment and notification records persisted to JSON files under one
/// directory. Whole-file rewrite per operation; adequate for a local shell.
pub struct JsonDataStore {
    comments_path: PathBuf,
    notifications_path: PathBuf,
    lock: Mutex<()>,
}

impl JsonDataStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = data_dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating data dir {}", dir.display()))?;
        Ok(Self {
            comments_path: dir.join("comments.json"),
            notifications_path: dir.join("notifications.json"),
            lock: Mutex::new(()),
        })
    }

    fn load<T: for<'de> Deserialize<'de> + Default>(path: &PathBuf) -> Result<T> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    fn save<T: Serialize>(path: &PathBuf, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))
    }

    pub fn all_comments(&self) -> Result<Vec<CommentRecord>> {
        let _guard = self.lock.lock();
        Self::load(&self.comments_path)
    }

    pub fn all_notifications(&self) -> Result<HashMap<String, Vec<Notification>>> {
        let _guard = self.lock.lock();
        let flat: Vec<Notification> = Self::load(&self.notifications_path)?;
        let mut by_recipient: HashMap<String, Vec<Notification>> = HashMap::new();
        for n in flat {
            by_recipient.entry(n.recipient_user_id.clone()).or_default().push(n);
        }
        Ok(by_recipient)
    }
}

impl CommentStore for JsonDataStore {
    fn create_comment(&self, comment: &NewComment<'_>) -> Result<CommentRecord> {
        let _guard = self.lock.lock();
        let mut records: Vec<CommentRecord> = Self::load(&self.comments_path)?;
        let record = build_record(comment);
        records.push(record.clone());
        Self::save(&self.comments_path, &records)?;
        Ok(record)
    }
}

impl NotificationStore for JsonDataStore {
    fn create_batch(&self, notifications: &[Notification]) -> Result<()> {
        if notifications.is_empty() {
            return Ok(());
        }
        let _guard = self.lock.lock();
        let mut records: Vec<Notification> = Self::load(&self.notifications_path)?;
        records.extend_from_slice(notifications);
        Self::save(&self.notifications_path, &records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn new_comment<'a>() -> NewComment<'a> {
        NewComment {
            subject_id: "client-42",
            author_id: "u1",
            text: "hello",
        }
    }

    #[test]
    fn test_in_memory_comment_gets_unique_id() {
        let store = InMemoryStore::new();
        let a = store.create_comment(&new_comment()).unwrap();
        let b = store.create_comment(&new_comment()).unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("comment-"));
        assert_eq!(store.comments().len(), 2);
    }

    #[test]
    fn test_json_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = JsonDataStore::new(dir.path()).unwrap();

        let record = store.create_comment(&new_comment()).unwrap();
        let notification = Notification::comment_mention(
            "u2", "u1", "Ana", "client-42", &record.id, "hello @Bruno",
        );
        store.create_batch(std::slice::from_ref(&notification)).unwrap();

        // A second store over the same directory sees both records.
        let reopened = JsonDataStore::new(dir.path()).unwrap();
        let comments = reopened.all_comments().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, record.id);

        let by_recipient = reopened.all_notifications().unwrap();
        assert_eq!(by_recipient["u2"].len(), 1);
        assert_eq!(by_recipient["u2"][0].source_id, record.id);
    }

    #[test]
    fn test_json_store_empty_batch_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = JsonDataStore::new(dir.path()).unwrap();
        store.create_batch(&[]).unwrap();
        assert!(!dir.path().join("notifications.json").exists());
    }
}
