use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timestamp;

/// A markdown document as stored by the backend.
///
/// `uuid` and `title` are required when decoding; a body without them is a
/// decode error rather than an empty document. The remaining fields may be
/// absent in partial responses (the create endpoint in particular).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub uuid: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Owning user. The backend calls this column `user_uuid`.
    #[serde(default, rename = "user_uuid", alias = "owner_uuid")]
    pub owner_uuid: Option<Uuid>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    /// Used only to order the document list, never for conflict detection.
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    /// A brand-new, empty document owned by `owner`, stamped with `now`.
    pub fn new(title: impl Into<String>, owner: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            content: String::new(),
            owner_uuid: Some(owner),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Case-insensitive substring match on the title.
    pub fn title_matches(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty() || self.title.to_lowercase().contains(&query.to_lowercase())
    }
}

/// The authenticated user, as returned by `/users/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub uuid: Uuid,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Sort `documents` most-recently-updated first.
///
/// The sort is stable: documents with equal `updated_at` keep their
/// relative order. Missing timestamps sort last.
pub fn sort_by_recency(documents: &mut [Document]) {
    documents.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
