//! Shared view state: the known documents and the current selection.
//!
//! [`SelectionStore`] is a cheap-to-clone handle. The session creates one and
//! passes it to every component that needs it, so each test can start from a
//! fresh store. Writes are plain structural replacement; keeping `selected`
//! consistent with `documents` is the controller's job.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use uuid::Uuid;

use mdedit_shared::Document;

/// Snapshot of the shared view state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Canonical list, in fetch/insertion order. Display order is derived.
    pub documents: Vec<Document>,
    pub selected: Option<Document>,
}

impl SelectionState {
    pub fn selected_uuid(&self) -> Option<Uuid> {
        self.selected.as_ref().map(|d| d.uuid)
    }

    pub fn contains(&self, uuid: Uuid) -> bool {
        self.documents.iter().any(|d| d.uuid == uuid)
    }

    pub fn find(&self, uuid: Uuid) -> Option<&Document> {
        self.documents.iter().find(|d| d.uuid == uuid)
    }
}

/// What changed, for subscribers that redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Documents,
    Selected,
}

#[derive(Clone)]
pub struct SelectionStore {
    state: Arc<Mutex<SelectionState>>,
    changes: broadcast::Sender<SelectionChange>,
}

impl SelectionStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            state: Arc::new(Mutex::new(SelectionState::default())),
            changes,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SelectionState> {
        // State is replaced wholesale, so a poisoned guard still holds a
        // consistent value.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notify(&self, change: SelectionChange) {
        // No receivers is fine.
        let _ = self.changes.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SelectionChange> {
        self.changes.subscribe()
    }

    pub fn snapshot(&self) -> SelectionState {
        self.lock().clone()
    }

    pub fn documents(&self) -> Vec<Document> {
        self.lock().documents.clone()
    }

    pub fn selected(&self) -> Option<Document> {
        self.lock().selected.clone()
    }

    pub fn set_documents(&self, documents: Vec<Document>) {
        self.lock().documents = documents;
        self.notify(SelectionChange::Documents);
    }

    pub fn set_selected(&self, selected: Option<Document>) {
        self.lock().selected = selected;
        self.notify(SelectionChange::Selected);
    }

    /// Apply `f` to the list entry with `uuid` and to the selection if it is
    /// the same document. Returns `false` when the document is not listed.
    pub fn patch_document<F>(&self, uuid: Uuid, f: F) -> bool
    where
        F: Fn(&mut Document),
    {
        let (listed, selected) = {
            let mut state = self.lock();
            let listed = match state.documents.iter_mut().find(|d| d.uuid == uuid) {
                Some(doc) => {
                    f(doc);
                    true
                }
                None => false,
            };
            let selected = match state.selected.as_mut().filter(|d| d.uuid == uuid) {
                Some(doc) => {
                    f(doc);
                    true
                }
                None => false,
            };
            (listed, selected)
        };

        if listed {
            self.notify(SelectionChange::Documents);
        }
        if selected {
            self.notify(SelectionChange::Selected);
        }
        listed
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}
