//! Session state shared by all shell commands.
//!
//! A [`Session`] owns one of everything: the backend client, the selection
//! store, the autosave pipeline, the controller and the editor. Components
//! receive clones of the store and event channel at construction, so a
//! session (and every test) starts from clean state.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use mdedit_shared::User;
use mdedit_store::{Database, Preferences};

use crate::api::{DocumentApi, RemoteDocumentClient};
use crate::autosave::AutosavePipeline;
use crate::config::ClientConfig;
use crate::controller::DocumentListController;
use crate::editor::EditorSurface;
use crate::error::{ClientError, Result};
use crate::events::{event_channel, AppEvent, EventSender, Notifier};
use crate::export::Exporter;
use crate::selection::SelectionStore;

pub struct Session {
    pub config: ClientConfig,
    pub controller: DocumentListController,
    pub editor: EditorSurface,
    api: Arc<dyn DocumentApi>,
    db: Database,
    store: SelectionStore,
    events: EventSender,
    notifier: Arc<Notifier>,
    autosave: AutosavePipeline,
    exporter: Exporter,
    /// Set only by a successful identity check.
    user: Option<User>,
    dark_mode: bool,
}

impl Session {
    /// Connect to the configured backend and check who we are.
    pub async fn start(config: ClientConfig) -> Result<Self> {
        let api = Arc::new(RemoteDocumentClient::new(&config)?);
        let db = match config.db_path {
            Some(ref path) => Database::open_at(path)?,
            None => Database::new()?,
        };

        let mut session = Self::with_parts(config, api, db)?;
        session.authenticate().await;
        Ok(session)
    }

    /// Assemble a session from an already built backend and database.
    pub fn with_parts(config: ClientConfig, api: Arc<dyn DocumentApi>, db: Database) -> Result<Self> {
        let prefs = db.load_preferences().unwrap_or_else(|e| {
            warn!(error = %e, "Preferences unreadable, using defaults");
            Preferences::default()
        });
        let store = SelectionStore::new();
        let events = event_channel();
        let notifier = Arc::new(Notifier::new(events.clone()));
        let autosave = AutosavePipeline::new(
            api.clone(),
            store.clone(),
            events.clone(),
            config.autosave_delay,
        );
        let controller = DocumentListController::new(
            api.clone(),
            store.clone(),
            autosave.clone(),
            notifier.clone(),
            config.notice_duration,
        );
        let editor = EditorSurface::new(store.clone(), autosave.clone());
        let exporter = Exporter::new(&config)?;

        Ok(Self {
            config,
            controller,
            editor,
            api,
            db,
            store,
            events,
            notifier,
            autosave,
            exporter,
            user: None,
            dark_mode: prefs.dark_mode,
        })
    }

    /// Run the identity check. Unauthenticated sessions issue no document
    /// calls; authenticated ones load the document list.
    pub async fn authenticate(&mut self) -> Option<&User> {
        match self.api.check_identity().await {
            Some(user) => {
                if let Err(e) = self.db.set_user_uuid(user.uuid) {
                    warn!(error = %e, "Could not remember user");
                }
                info!(user = %user.uuid, "Session authenticated");
                self.user = Some(user);

                if let Err(e) = self.controller.refresh().await {
                    warn!(error = %e, "Initial document list unavailable");
                }
                self.sync_editor();
            }
            None => {
                info!("Session is not authenticated");
                self.user = None;
                self.reset();
            }
        }
        self.user.as_ref()
    }

    /// Install a session cookie value and re-check identity.
    pub async fn login(&mut self, token: &str) -> Result<&User> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ClientError::Invalid("session token must not be empty".into()));
        }
        self.api.set_session(Some(token.to_string()));
        self.authenticate().await.ok_or(ClientError::NotAuthenticated)
    }

    /// Forget credentials and local state. Returns the backend logout URL.
    pub fn logout(&mut self) -> String {
        self.editor.close();
        self.api.set_session(None);
        if let Err(e) = self.db.clear_user_uuid() {
            warn!(error = %e, "Could not clear remembered user");
        }
        self.user = None;
        self.reset();
        info!("Logged out");
        self.config.logout_url()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn require_user(&self) -> Result<&User> {
        self.user.as_ref().ok_or(ClientError::NotAuthenticated)
    }

    /// Home view text.
    pub fn greeting(&self) -> String {
        match self.user {
            Some(ref user) => format!("Welcome, {}!", user.username),
            None => format!(
                "Not logged in. Sign in at {} and run `login <auth_session cookie>`.",
                self.config.login_url()
            ),
        }
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn set_dark_mode(&mut self, enabled: bool) -> Result<()> {
        self.db.set_dark_mode(enabled)?;
        self.dark_mode = enabled;
        Ok(())
    }

    /// Reload the editor buffer if the selection moved to another document.
    pub fn sync_editor(&mut self) {
        let selected = self.store.snapshot().selected_uuid();
        if self.editor.loaded() != selected {
            self.editor.load_selected();
        }
    }

    /// Save pending edits, then export the selected document as it appears
    /// in the editor.
    pub async fn export_selected(&mut self) -> Result<PathBuf> {
        if let Err(e) = self.autosave.flush().await {
            warn!(error = %e, "Exporting with unsaved changes");
        }

        let mut doc = self
            .store
            .selected()
            .ok_or_else(|| ClientError::Invalid("no document selected".into()))?;
        if self.editor.loaded() == Some(doc.uuid) {
            doc.content = self.editor.buffer().to_string();
        }
        self.exporter.export(&doc).await
    }

    /// Persist whatever is still pending before the process exits.
    pub async fn shutdown(&mut self) {
        match self.autosave.flush().await {
            Ok(Some(doc)) => info!(uuid = %doc.uuid, "Saved pending edit on exit"),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Pending edit lost on exit"),
        }
    }

    fn reset(&mut self) {
        self.autosave.cancel();
        self.store.set_selected(None);
        self.store.set_documents(Vec::new());
        self.controller.close_drawer();
        self.controller.search("");
        self.editor.load_selected();
    }
}
