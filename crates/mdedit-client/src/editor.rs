//! The live text buffer and its preview.

use tracing::debug;
use uuid::Uuid;

use mdedit_shared::constants::MSG_NO_DOCUMENTS;
use mdedit_shared::Document;

use crate::autosave::{AutosavePipeline, Edit};
use crate::preview;
use crate::selection::SelectionStore;

pub struct EditorSurface {
    store: SelectionStore,
    autosave: AutosavePipeline,
    buffer: String,
    loaded: Option<Uuid>,
    preview_enabled: bool,
}

impl EditorSurface {
    pub fn new(store: SelectionStore, autosave: AutosavePipeline) -> Self {
        Self {
            store,
            autosave,
            buffer: String::new(),
            loaded: None,
            preview_enabled: false,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Uuid of the document the buffer was loaded from.
    pub fn loaded(&self) -> Option<Uuid> {
        self.loaded
    }

    pub fn preview_enabled(&self) -> bool {
        self.preview_enabled
    }

    pub fn load(&mut self, document: &Document) {
        self.buffer = document.content.clone();
        self.loaded = Some(document.uuid);
        debug!(uuid = %document.uuid, len = self.buffer.len(), "Buffer loaded");
    }

    /// Load the store's selection, or empty the buffer when nothing is selected.
    pub fn load_selected(&mut self) -> Option<Uuid> {
        match self.store.selected() {
            Some(doc) => self.load(&doc),
            None => {
                self.buffer.clear();
                self.loaded = None;
            }
        }
        self.loaded
    }

    /// Replace the buffer, as a keystroke would. Returns whether a save was
    /// scheduled.
    pub fn set_content(&mut self, text: impl Into<String>) -> bool {
        self.buffer = text.into();

        let Some(selected) = self.store.selected() else {
            return false;
        };
        self.loaded = Some(selected.uuid);
        self.autosave.schedule(Edit {
            uuid: selected.uuid,
            title: selected.title,
            content: self.buffer.clone(),
        });
        true
    }

    pub fn append(&mut self, text: &str) -> bool {
        let mut content = std::mem::take(&mut self.buffer);
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(text);
        self.set_content(content)
    }

    /// Rendered buffer, only while the preview pane is enabled.
    pub fn preview(&self) -> Option<String> {
        self.preview_enabled.then(|| preview::render(&self.buffer))
    }

    pub fn toggle_preview(&mut self) -> bool {
        self.preview_enabled = !self.preview_enabled;
        self.preview_enabled
    }

    /// Message shown instead of the editor when there is nothing to edit.
    pub fn empty_state(&self) -> Option<&'static str> {
        self.store
            .documents()
            .is_empty()
            .then_some(MSG_NO_DOCUMENTS)
    }

    /// Close the editor, dropping any unsaved edit.
    pub fn close(&mut self) {
        self.autosave.cancel();
        self.buffer.clear();
        self.loaded = None;
    }
}
