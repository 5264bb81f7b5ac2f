//! In-memory [`DocumentApi`] used by the unit tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use mdedit_shared::{Document, User};

use crate::api::DocumentApi;
use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Fetch(Uuid),
    Create(String),
    Update {
        uuid: Uuid,
        title: String,
        content: String,
    },
    Delete(Uuid),
    Identity,
}

pub struct FakeApi {
    docs: Mutex<Vec<Document>>,
    calls: Mutex<Vec<Call>>,
    user: Mutex<Option<User>>,
    failing: Mutex<HashSet<&'static str>>,
    partial_create: Mutex<bool>,
    update_delay: Mutex<Option<std::time::Duration>>,
    tick: Mutex<i64>,
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
}

pub fn doc_at(title: &str, secs: i64) -> Document {
    let mut doc = Document::new(title, Uuid::nil(), at(secs));
    doc.content = format!("# {title}");
    doc
}

pub fn user() -> User {
    User {
        uuid: Uuid::new_v4(),
        username: "ada".into(),
        email: "ada@example.com".into(),
        created_at: None,
        updated_at: None,
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            docs: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            user: Mutex::new(Some(user())),
            failing: Mutex::new(HashSet::new()),
            partial_create: Mutex::new(false),
            update_delay: Mutex::new(None),
            tick: Mutex::new(1_000),
        }
    }

    pub fn with_docs(docs: Vec<Document>) -> Self {
        let api = Self::new();
        *api.docs.lock().unwrap() = docs;
        api
    }

    pub fn logged_out(self) -> Self {
        *self.user.lock().unwrap() = None;
        self
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn heal(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub fn partial_create(&self) {
        *self.partial_create.lock().unwrap() = true;
    }

    /// Make every update take `delay` before it is applied.
    pub fn slow_updates(&self, delay: std::time::Duration) {
        *self.update_delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn updates(&self) -> Vec<(Uuid, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update { uuid, content, .. } => Some((uuid, content)),
                _ => None,
            })
            .collect()
    }

    pub fn stored(&self, uuid: Uuid) -> Option<Document> {
        self.docs.lock().unwrap().iter().find(|d| d.uuid == uuid).cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: &'static str) -> Result<()> {
        if self.failing.lock().unwrap().contains(op) {
            Err(ClientError::Network(format!("{op}: connection refused")))
        } else {
            Ok(())
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let mut tick = self.tick.lock().unwrap();
        *tick += 1;
        at(*tick)
    }
}

#[async_trait]
impl DocumentApi for FakeApi {
    async fn list_documents(&self) -> Result<Vec<Document>> {
        self.record(Call::List);
        self.check("list")?;
        Ok(self.docs.lock().unwrap().clone())
    }

    async fn fetch_document(&self, uuid: Uuid) -> Result<Document> {
        self.record(Call::Fetch(uuid));
        self.check("fetch")?;
        self.stored(uuid).ok_or(ClientError::Status { status: 500 })
    }

    async fn create_document(&self, title: &str) -> Result<Document> {
        self.record(Call::Create(title.to_string()));
        self.check("create")?;
        let owner = self
            .user
            .lock()
            .unwrap()
            .as_ref()
            .map(|u| u.uuid)
            .ok_or(ClientError::NotAuthenticated)?;

        let doc = Document::new(title, owner, self.now());
        self.docs.lock().unwrap().push(doc.clone());

        if *self.partial_create.lock().unwrap() {
            return Ok(Document {
                uuid: doc.uuid,
                title: doc.title,
                content: String::new(),
                owner_uuid: None,
                created_at: None,
                updated_at: None,
            });
        }
        Ok(doc)
    }

    async fn update_document(&self, uuid: Uuid, title: &str, content: &str) -> Result<Document> {
        self.record(Call::Update {
            uuid,
            title: title.to_string(),
            content: content.to_string(),
        });
        self.check("update")?;
        let delay = *self.update_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let now = self.now();
        let mut docs = self.docs.lock().unwrap();
        let doc = docs
            .iter_mut()
            .find(|d| d.uuid == uuid)
            .ok_or(ClientError::Status { status: 500 })?;
        doc.title = title.to_string();
        doc.content = content.to_string();
        doc.updated_at = Some(now);
        Ok(doc.clone())
    }

    async fn delete_document(&self, uuid: Uuid) -> Result<()> {
        self.record(Call::Delete(uuid));
        self.check("delete")?;
        self.docs.lock().unwrap().retain(|d| d.uuid != uuid);
        Ok(())
    }

    async fn check_identity(&self) -> Option<User> {
        self.record(Call::Identity);
        if self.check("identity").is_err() {
            return None;
        }
        self.user.lock().unwrap().clone()
    }

    fn set_session(&self, token: Option<String>) {
        let mut user = self.user.lock().unwrap();
        match token {
            Some(_) if user.is_none() => *user = Some(crate::testing::user()),
            Some(_) => {}
            None => *user = None,
        }
    }
}
