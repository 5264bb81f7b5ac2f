use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Document;

/// Body of `POST /documents/create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub uuid: Uuid,
    pub title: String,
    /// Always empty: documents start blank.
    pub content: String,
    pub user_uuid: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreateDocumentRequest {
    pub fn new(title: &str, owner: Uuid, now: DateTime<Utc>) -> Self {
        let doc = Document::new(title, owner, now);
        Self {
            uuid: doc.uuid,
            title: doc.title,
            content: doc.content,
            user_uuid: owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// What the client assumes was stored if the server echoes nothing useful.
    pub fn to_document(&self) -> Document {
        Document {
            uuid: self.uuid,
            title: self.title.clone(),
            content: self.content.clone(),
            owner_uuid: Some(self.user_uuid),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

/// Body of `PUT /documents/update/{uuid}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    pub uuid: Uuid,
    pub title: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

/// Body sent to the markdown render endpoint used by HTML export.
#[derive(Debug, Clone, Serialize)]
pub struct RenderRequest<'a> {
    pub text: &'a str,
    pub mode: &'static str,
}

impl<'a> RenderRequest<'a> {
    pub fn gfm(text: &'a str) -> Self {
        Self { text, mode: "gfm" }
    }
}
