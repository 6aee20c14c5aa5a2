use serde::{Deserialize, Serialize};

/// One entry of the user directory: a resolvable identity.
///
/// Display names are not unique; a lookup may return several entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub id: String,
    pub display_name: String,
}

impl UserEntry {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}
