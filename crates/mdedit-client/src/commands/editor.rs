use crate::state::Session;

/// `\n` typed on the command line becomes a real line break.
fn unescape(text: &str) -> String {
    text.replace("\\n", "\n")
}

fn require_document(session: &Session) -> Result<(), String> {
    session.require_user().map_err(|e| e.to_string())?;
    if let Some(msg) = session.editor.empty_state() {
        return Err(msg.to_string());
    }
    if session.store().selected().is_none() {
        return Err("No document selected, use `open`".into());
    }
    Ok(())
}

pub fn write(session: &mut Session, text: &str) -> Result<String, String> {
    require_document(session)?;
    session.sync_editor();
    session.editor.set_content(unescape(text));
    Ok(format!("{} characters", session.editor.buffer().chars().count()))
}

pub fn append(session: &mut Session, text: &str) -> Result<String, String> {
    require_document(session)?;
    session.sync_editor();
    session.editor.append(&unescape(text));
    Ok(format!("{} characters", session.editor.buffer().chars().count()))
}

pub fn show(session: &mut Session) -> Result<String, String> {
    session.require_user().map_err(|e| e.to_string())?;
    if let Some(msg) = session.editor.empty_state() {
        return Ok(msg.to_string());
    }
    session.sync_editor();

    let title = session
        .store()
        .selected()
        .map(|d| d.title)
        .unwrap_or_else(|| "(no document)".to_string());
    Ok(format!("# {title}\n\n{}", session.editor.buffer()))
}

pub fn preview(session: &Session) -> Result<String, String> {
    session
        .editor
        .preview()
        .ok_or_else(|| "Preview is off, use `toggle-preview`".to_string())
}

pub fn toggle_preview(session: &mut Session) -> Result<String, String> {
    let on = session.editor.toggle_preview();
    Ok(format!("Preview {}", if on { "on" } else { "off" }))
}

pub async fn export(session: &mut Session) -> Result<String, String> {
    require_document(session)?;
    let path = session
        .export_selected()
        .await
        .map_err(|e| format!("Failed to export document: {e}"))?;
    Ok(format!("Exported to {}", path.display()))
}
