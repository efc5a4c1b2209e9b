use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TITLE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 1000;
pub const ATTACHMENT_MAX_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Only populated by a single-item fetch of a top-level list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<List>,
}

impl List {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateList {
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub attachment: Option<String>,
}

impl CreateList {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            parent_id: None,
            title: title.into(),
            description: description.into(),
            attachment: None,
        }
    }
}

/// Partial update. `None` (or an empty string, at the storage layer) keeps
/// the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateList {
    pub title: Option<String>,
    pub description: Option<String>,
    pub attachment: Option<String>,
}

impl UpdateList {
    pub fn is_empty(&self) -> bool {
        fn blank(v: &Option<String>) -> bool {
            v.as_deref().map_or(true, str::is_empty)
        }
        blank(&self.title) && blank(&self.description) && blank(&self.attachment)
    }
}
