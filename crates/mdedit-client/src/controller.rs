//! Document list orchestration.
//!
//! Every operation leaves the [`SelectionStore`] consistent: no duplicate
//! uuids, and `selected` always names a listed document (or nothing).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use mdedit_shared::constants::MSG_DOCUMENT_DELETED;
use mdedit_shared::types::sort_by_recency;
use mdedit_shared::Document;

use crate::api::DocumentApi;
use crate::autosave::AutosavePipeline;
use crate::error::{ClientError, Result};
use crate::events::Notifier;
use crate::selection::SelectionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Update(Uuid),
}

/// What the document panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Idle,
    DrawerOpen,
    DialogOpen(DialogMode),
}

pub struct DocumentListController {
    api: Arc<dyn DocumentApi>,
    store: SelectionStore,
    autosave: AutosavePipeline,
    notifier: Arc<Notifier>,
    notice_duration: Duration,
    panel: PanelState,
    query: String,
}

impl DocumentListController {
    pub fn new(
        api: Arc<dyn DocumentApi>,
        store: SelectionStore,
        autosave: AutosavePipeline,
        notifier: Arc<Notifier>,
        notice_duration: Duration,
    ) -> Self {
        Self {
            api,
            store,
            autosave,
            notifier,
            notice_duration,
            panel: PanelState::Idle,
            query: String::new(),
        }
    }

    pub fn panel(&self) -> PanelState {
        self.panel
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    // ---------------------------------------------------------------------
    // Panel state machine
    // ---------------------------------------------------------------------

    /// Open the document drawer and reconcile the list with the server.
    pub async fn open_drawer(&mut self) -> Result<usize> {
        self.panel = PanelState::DrawerOpen;
        self.refresh().await
    }

    pub fn close_drawer(&mut self) {
        self.panel = PanelState::Idle;
    }

    pub fn open_dialog(&mut self, mode: DialogMode) -> Result<()> {
        if let DialogMode::Update(uuid) = mode {
            if !self.store.snapshot().contains(uuid) {
                return Err(ClientError::Invalid(format!("unknown document {uuid}")));
            }
        }
        self.panel = PanelState::DialogOpen(mode);
        Ok(())
    }

    pub fn cancel_dialog(&mut self) {
        if matches!(self.panel, PanelState::DialogOpen(_)) {
            self.panel = PanelState::DrawerOpen;
        }
    }

    /// Confirm the open dialog with `title`. The dialog stays open on failure.
    pub async fn submit_dialog(&mut self, title: &str) -> Result<Document> {
        let doc = match self.panel {
            PanelState::DialogOpen(DialogMode::Create) => self.create(title).await?,
            PanelState::DialogOpen(DialogMode::Update(uuid)) => self.rename(uuid, title).await?,
            _ => return Err(ClientError::Invalid("no dialog is open".into())),
        };
        self.panel = PanelState::DrawerOpen;
        Ok(doc)
    }

    // ---------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------

    /// Replace the list with the server's, then repair the selection.
    /// On failure the current list is kept.
    pub async fn refresh(&self) -> Result<usize> {
        let docs = dedup_by_uuid(self.api.list_documents().await?);
        let count = docs.len();

        let selected = self
            .store
            .selected()
            .and_then(|s| docs.iter().find(|d| d.uuid == s.uuid).cloned())
            .or_else(|| first_by_recency(&docs));

        self.store.set_documents(docs);
        self.store.set_selected(selected);

        debug!(count, "Document list refreshed");
        Ok(count)
    }

    /// Load the full document and make it the selection.
    pub async fn select(&mut self, uuid: Uuid) -> Result<Document> {
        if let Err(e) = self.autosave.flush().await {
            warn!(error = %e, "Could not save pending edit before switching");
        }

        let doc = self.api.fetch_document(uuid).await?;

        let mut docs = self.store.documents();
        upsert(&mut docs, doc.clone());
        self.store.set_documents(docs);
        self.store.set_selected(Some(doc.clone()));
        self.panel = PanelState::Idle;

        info!(uuid = %uuid, title = %doc.title, "Document selected");
        Ok(doc)
    }

    pub async fn create(&mut self, title: &str) -> Result<Document> {
        let title = validate_title(title)?;

        if let Err(e) = self.autosave.flush().await {
            warn!(error = %e, "Could not save pending edit before creating");
        }

        let created = self.api.create_document(title).await?;

        // The create response may be partial; the server copy is canonical.
        let doc = match self.api.fetch_document(created.uuid).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(uuid = %created.uuid, error = %e, "Re-fetch after create failed, using create response");
                created
            }
        };

        let mut docs = self.store.documents();
        upsert(&mut docs, doc.clone());
        self.store.set_documents(docs);
        self.store.set_selected(Some(doc.clone()));

        info!(uuid = %doc.uuid, title = %doc.title, "Document created");
        Ok(doc)
    }

    pub async fn update(&mut self, uuid: Uuid, title: &str, content: &str) -> Result<Document> {
        let doc = self.api.update_document(uuid, title, content).await?;

        let mut docs = self.store.documents();
        if let Some(entry) = docs.iter_mut().find(|d| d.uuid == uuid) {
            *entry = doc.clone();
        }
        self.store.set_documents(docs);

        if self.store.selected().is_some_and(|s| s.uuid == uuid) {
            self.store.set_selected(Some(doc.clone()));
        }

        info!(uuid = %uuid, title = %doc.title, "Document updated");
        Ok(doc)
    }

    /// Change a document's title, keeping its content.
    pub async fn rename(&mut self, uuid: Uuid, title: &str) -> Result<Document> {
        let title = validate_title(title)?;

        if let Err(e) = self.autosave.flush().await {
            warn!(error = %e, "Could not save pending edit before renaming");
        }

        let content = self
            .store
            .snapshot()
            .find(uuid)
            .map(|d| d.content.clone())
            .ok_or_else(|| ClientError::Invalid(format!("unknown document {uuid}")))?;

        self.update(uuid, title, &content).await
    }

    /// Delete remotely, evict locally, and repair the selection.
    pub async fn delete(&mut self, uuid: Uuid) -> Result<()> {
        self.api.delete_document(uuid).await?;
        self.autosave.cancel_for(uuid);

        let state = self.store.snapshot();
        let was_selected = state.selected_uuid() == Some(uuid);

        let mut docs = state.documents;
        docs.retain(|d| d.uuid != uuid);
        let next = if was_selected {
            first_by_recency(&docs)
        } else {
            state.selected
        };

        self.store.set_documents(docs);
        self.store.set_selected(next);

        self.notifier.show(MSG_DOCUMENT_DELETED, self.notice_duration);
        Ok(())
    }

    /// Filter the visible list by title. An empty query shows everything.
    pub fn search(&mut self, query: &str) {
        self.query = query.trim().to_string();
    }

    /// The list as displayed: filtered by the query, most recent first.
    pub fn visible(&self) -> Vec<Document> {
        let mut docs: Vec<Document> = self
            .store
            .documents()
            .into_iter()
            .filter(|d| d.title_matches(&self.query))
            .collect();
        sort_by_recency(&mut docs);
        docs
    }
}

fn validate_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ClientError::Invalid("title must not be empty".into()));
    }
    Ok(title)
}

fn first_by_recency(docs: &[Document]) -> Option<Document> {
    let mut sorted = docs.to_vec();
    sort_by_recency(&mut sorted);
    sorted.into_iter().next()
}

fn upsert(docs: &mut Vec<Document>, doc: Document) {
    match docs.iter_mut().find(|d| d.uuid == doc.uuid) {
        Some(entry) => *entry = doc,
        None => docs.push(doc),
    }
}

fn dedup_by_uuid(docs: Vec<Document>) -> Vec<Document> {
    let mut seen = HashSet::new();
    docs.into_iter().filter(|d| seen.insert(d.uuid)).collect()
}
