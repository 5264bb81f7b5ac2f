//! Debounced persistence of editor changes.
//!
//! Every keystroke produces an [`Edit`]. The pipeline keeps exactly one
//! pending save task, tagged with the uuid of the document the edit was made
//! in. A new edit aborts the pending task and starts a fresh timer, so only
//! the last edit of a burst reaches the server. Saves run one at a time.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use mdedit_shared::Document;

use crate::api::DocumentApi;
use crate::error::Result;
use crate::events::{emit_event, AppEvent, EventSender};
use crate::selection::SelectionStore;

/// Buffer state at the moment of a keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub uuid: Uuid,
    pub title: String,
    pub content: String,
}

struct Pending {
    seq: u64,
    edit: Edit,
    handle: JoinHandle<()>,
}

struct Inner {
    api: Arc<dyn DocumentApi>,
    store: SelectionStore,
    events: EventSender,
    delay: Duration,
    pending: Mutex<Option<Pending>>,
    seq: Mutex<u64>,
    /// Held for the duration of each save so requests go out in order.
    save_lock: tokio::sync::Mutex<()>,
}

#[derive(Clone)]
pub struct AutosavePipeline {
    inner: Arc<Inner>,
}

impl AutosavePipeline {
    pub fn new(
        api: Arc<dyn DocumentApi>,
        store: SelectionStore,
        events: EventSender,
        delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                events,
                delay,
                pending: Mutex::new(None),
                seq: Mutex::new(0),
                save_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Uuid of the document with an unsaved edit, if any.
    pub fn pending_uuid(&self) -> Option<Uuid> {
        self.inner
            .pending
            .lock()
            .ok()
            .and_then(|p| p.as_ref().map(|p| p.edit.uuid))
    }

    /// Record an edit and (re)start the debounce timer.
    ///
    /// An unsaved edit for a *different* document is saved right away
    /// instead of being dropped.
    pub fn schedule(&self, edit: Edit) {
        let seq = self.inner.next_seq();
        let uuid = edit.uuid;

        let previous = self.inner.take_pending();
        if let Some(prev) = previous {
            prev.handle.abort();
            if prev.edit.uuid != uuid {
                debug!(from = %prev.edit.uuid, to = %uuid, "Saving edit for previous document");
                let inner = self.inner.clone();
                tokio::spawn(async move {
                    let _ = inner.persist(prev.edit).await;
                });
            }
        }

        let inner = self.inner.clone();
        let delay = self.inner.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Claim under the save lock so `flush` can wait for this save.
            let _guard = inner.save_lock.lock().await;
            if let Some(edit) = inner.claim(seq) {
                let _ = inner.save(edit).await;
            }
        });

        if let Ok(mut pending) = self.inner.pending.lock() {
            *pending = Some(Pending { seq, edit, handle });
        }
    }

    /// Save the pending edit now. `Ok(None)` when nothing was pending.
    /// Returns only after any save already in flight has finished.
    pub async fn flush(&self) -> Result<Option<Document>> {
        let Some(pending) = self.inner.take_pending() else {
            let _guard = self.inner.save_lock.lock().await;
            return Ok(None);
        };
        pending.handle.abort();
        self.inner.persist(pending.edit).await
    }

    /// Drop the pending edit without saving it.
    pub fn cancel(&self) -> bool {
        match self.inner.take_pending() {
            Some(pending) => {
                pending.handle.abort();
                debug!(uuid = %pending.edit.uuid, "Pending save cancelled");
                true
            }
            None => false,
        }
    }

    /// Drop the pending edit only if it belongs to `uuid`.
    pub fn cancel_for(&self, uuid: Uuid) -> bool {
        if self.pending_uuid() == Some(uuid) {
            self.cancel()
        } else {
            false
        }
    }
}

impl Inner {
    fn next_seq(&self) -> u64 {
        let mut seq = self.seq.lock().unwrap_or_else(|e| e.into_inner());
        *seq += 1;
        *seq
    }

    fn take_pending(&self) -> Option<Pending> {
        self.pending.lock().ok().and_then(|mut p| p.take())
    }

    /// Take the pending edit if it is still the one scheduled as `seq`.
    fn claim(&self, seq: u64) -> Option<Edit> {
        let mut pending = self.pending.lock().ok()?;
        if pending.as_ref().map(|p| p.seq) != Some(seq) {
            return None;
        }
        pending.take().map(|p| p.edit)
    }

    async fn persist(&self, edit: Edit) -> Result<Option<Document>> {
        let _guard = self.save_lock.lock().await;
        self.save(edit).await
    }

    /// Send one edit. Callers hold `save_lock`.
    async fn save(&self, edit: Edit) -> Result<Option<Document>> {
        if !self.store.snapshot().contains(edit.uuid) {
            debug!(uuid = %edit.uuid, "Document no longer listed, skipping save");
            return Ok(None);
        }

        match self
            .api
            .update_document(edit.uuid, &edit.title, &edit.content)
            .await
        {
            Ok(saved) => {
                let updated_at = saved.updated_at.unwrap_or_else(Utc::now);
                self.store.patch_document(edit.uuid, |doc| {
                    doc.content = edit.content.clone();
                    doc.updated_at = Some(updated_at);
                });
                info!(uuid = %edit.uuid, len = edit.content.len(), "Autosaved");
                emit_event(&self.events, AppEvent::DocumentSaved { uuid: edit.uuid });
                Ok(Some(saved))
            }
            Err(e) => {
                warn!(uuid = %edit.uuid, error = %e, "Autosave failed");
                emit_event(&self.events, AppEvent::SaveFailed { uuid: edit.uuid });
                Err(e)
            }
        }
    }
}
