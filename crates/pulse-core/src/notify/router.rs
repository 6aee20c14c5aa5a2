//! Deterministic routing of comment mentions to notifications.

use std::collections::HashSet;

use crate::mentions::extract_mentions;
use crate::models::{Notification, UserEntry};
use crate::notify::directory::UserDirectory;

/// A mention resolved against the directory: the name as typed (which may
/// match nobody) plus its candidate identities.
#[derive(Debug, Clone)]
pub struct Mention {
    pub display_name: String,
    pub candidates: Vec<UserEntry>,
}

pub fn resolve_mentions<D: UserDirectory>(directory: &D, names: &[String]) -> Vec<Mention> {
    names
        .iter()
        .map(|name| Mention {
            display_name: name.clone(),
            candidates: directory.lookup(name),
        })
        .collect()
}

/// Flatten resolved mentions into concrete recipients.
///
/// Unresolved names are dropped silently. A name colliding on several
/// directory entries resolves to all of them (over-notifying beats
/// silently picking one); recipients are deduplicated by user id and the
/// author never notifies themselves.
pub fn resolve_recipients<D: UserDirectory>(
    directory: &D,
    names: &[String],
    author_id: &str,
) -> Vec<UserEntry> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut recipients = Vec::new();

    for mention in resolve_mentions(directory, names) {
        if mention.candidates.is_empty() {
            tracing::debug!(name = %mention.display_name, "mention did not resolve, dropping");
            continue;
        }
        for entry in mention.candidates {
            if entry.id == author_id {
                continue;
            }
            if seen.insert(entry.id.clone()) {
                recipients.push(entry);
            }
        }
    }

    recipients
}

/// Build the notification batch for one freshly persisted comment.
///
/// Returns an empty batch when the text mentions nobody resolvable; that
/// is a no-op, never an error. Dispatch of the batch is the caller's
/// concern and is best-effort relative to the comment itself.
pub fn route<D: UserDirectory>(
    directory: &D,
    text: &str,
    comment_id: &str,
    author: &UserEntry,
    subject_id: &str,
) -> Vec<Notification> {
    let names = extract_mentions(text);
    if names.is_empty() {
        return Vec::new();
    }

    resolve_recipients(directory, &names, &author.id)
        .into_iter()
        .map(|recipient| {
            Notification::comment_mention(
                recipient.id,
                &author.id,
                &author.display_name,
                subject_id,
                comment_id,
                text,
            )
        })
        .collect()
}
