use std::fmt;

use tracing::debug;
use uuid::Uuid;

use mdedit_shared::Document;

use crate::controller::{DialogMode, PanelState};
use crate::state::Session;

/// One line of the document drawer.
#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub index: usize,
    pub uuid: Uuid,
    pub title: String,
    pub updated: String,
    pub selected: bool,
}

impl DocumentRow {
    pub fn from_document(index: usize, doc: &Document, selected: Option<Uuid>) -> Self {
        Self {
            index,
            uuid: doc.uuid,
            title: doc.title.clone(),
            updated: doc
                .updated_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            selected: selected == Some(doc.uuid),
        }
    }
}

impl fmt::Display for DocumentRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.selected { '*' } else { ' ' };
        let uuid = self.uuid.to_string();
        let short = &uuid[..8];
        write!(
            f,
            "{marker} {:>3}. {:<32} {}  {short}",
            self.index, self.title, self.updated
        )
    }
}

fn render_list(session: &Session) -> String {
    let selected = session.store().snapshot().selected_uuid();
    let rows: Vec<String> = session
        .controller
        .visible()
        .iter()
        .enumerate()
        .map(|(i, doc)| DocumentRow::from_document(i + 1, doc, selected).to_string())
        .collect();

    if rows.is_empty() {
        return match session.controller.query() {
            "" => "No documents.".to_string(),
            query => format!("No documents match \"{query}\"."),
        };
    }
    rows.join("\n")
}

/// Accepts a 1-based index into the drawer, a uuid, or an exact title.
fn resolve(session: &Session, arg: &str) -> Result<Uuid, String> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err("Expected a document number, uuid or title".into());
    }

    let visible = session.controller.visible();
    if let Ok(index) = arg.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| visible.get(i))
            .map(|d| d.uuid)
            .ok_or_else(|| format!("No document #{index}"));
    }
    if let Ok(uuid) = Uuid::parse_str(arg) {
        return Ok(uuid);
    }
    visible
        .iter()
        .find(|d| d.title.eq_ignore_ascii_case(arg))
        .map(|d| d.uuid)
        .ok_or_else(|| format!("No document titled \"{arg}\""))
}

pub async fn list(session: &mut Session) -> Result<String, String> {
    session.require_user().map_err(|e| e.to_string())?;

    let refreshed = session.controller.open_drawer().await;
    session.sync_editor();

    let list = render_list(session);
    match refreshed {
        Ok(_) => Ok(list),
        Err(e) => Err(format!("Could not refresh documents: {e}\n{list}")),
    }
}

pub async fn open(session: &mut Session, arg: &str) -> Result<String, String> {
    session.require_user().map_err(|e| e.to_string())?;
    let uuid = resolve(session, arg)?;

    let doc = session
        .controller
        .select(uuid)
        .await
        .map_err(|e| format!("Failed to open document: {e}"))?;
    session.editor.load(&doc);

    debug!(uuid = %uuid, "Opened from shell");
    Ok(format!("# {}\n\n{}", doc.title, doc.content))
}

pub async fn create(session: &mut Session, title: &str) -> Result<String, String> {
    session.require_user().map_err(|e| e.to_string())?;

    if session.controller.panel() == PanelState::Idle {
        session
            .controller
            .open_drawer()
            .await
            .map_err(|e| format!("Could not refresh documents: {e}"))?;
    }
    session
        .controller
        .open_dialog(DialogMode::Create)
        .map_err(|e| e.to_string())?;

    match session.controller.submit_dialog(title).await {
        Ok(doc) => {
            session.editor.load(&doc);
            session.controller.close_drawer();
            Ok(format!("Created \"{}\"", doc.title))
        }
        Err(e) => {
            session.controller.cancel_dialog();
            Err(format!("Failed to create document: {e}"))
        }
    }
}

pub async fn rename(session: &mut Session, args: &str) -> Result<String, String> {
    session.require_user().map_err(|e| e.to_string())?;

    let (target, title) = args
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| "Usage: rename <document> <new title>".to_string())?;
    let uuid = resolve(session, target)?;

    session
        .controller
        .open_dialog(DialogMode::Update(uuid))
        .map_err(|e| e.to_string())?;

    match session.controller.submit_dialog(title).await {
        Ok(doc) => {
            session.controller.close_drawer();
            Ok(format!("Renamed to \"{}\"", doc.title))
        }
        Err(e) => {
            session.controller.cancel_dialog();
            Err(format!("Failed to rename document: {e}"))
        }
    }
}

pub async fn remove(session: &mut Session, arg: &str) -> Result<String, String> {
    session.require_user().map_err(|e| e.to_string())?;
    let uuid = resolve(session, arg)?;

    session
        .controller
        .delete(uuid)
        .await
        .map_err(|e| format!("Failed to delete document: {e}"))?;
    session.sync_editor();

    Ok(session
        .notifier()
        .current()
        .map(|n| n.message)
        .unwrap_or_else(|| "Deleted".to_string()))
}

pub fn search(session: &mut Session, query: &str) -> Result<String, String> {
    session.require_user().map_err(|e| e.to_string())?;
    session.controller.search(query);
    Ok(render_list(session))
}
