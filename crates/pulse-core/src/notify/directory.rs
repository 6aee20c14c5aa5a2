use std::path::Path;

use anyhow::{Context, Result};

use crate::models::UserEntry;

/// Lookup of known users by display name.
///
/// Matching is exact on the whole name, case-insensitive, and may return
/// several identities: display names are not unique. Partial-name matching
/// is deliberately not offered.
pub trait UserDirectory {
    fn lookup(&self, display_name: &str) -> Vec<UserEntry>;
}

/// A directory backed by a fixed list of entries (tests, CLI shell).
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: Vec<UserEntry>,
}

impl StaticDirectory {
    pub fn new(entries: Vec<UserEntry>) -> Self {
        Self { entries }
    }

    /// Load a directory from a JSON array of `{id, display_name}` entries.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading directory {}", path.display()))?;
        let entries: Vec<UserEntry> = serde_json::from_str(&contents)
            .with_context(|| format!("parsing directory {}", path.display()))?;
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[UserEntry] {
        &self.entries
    }
}

impl UserDirectory for StaticDirectory {
    fn lookup(&self, display_name: &str) -> Vec<UserEntry> {
        let wanted = display_name.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.display_name.to_lowercase() == wanted)
            .cloned()
            .collect()
    }
}
