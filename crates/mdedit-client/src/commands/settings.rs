use tracing::info;

use crate::state::Session;

/// `dark` toggles; `dark on` / `dark off` set explicitly.
pub fn dark(session: &mut Session, arg: &str) -> Result<String, String> {
    let enabled = match arg.trim() {
        "" => !session.dark_mode(),
        "on" | "true" | "1" => true,
        "off" | "false" | "0" => false,
        other => return Err(format!("Expected on or off, got \"{other}\"")),
    };

    session
        .set_dark_mode(enabled)
        .map_err(|e| format!("Failed to save settings: {e}"))?;

    info!(enabled, "Dark mode updated");
    Ok(format!("Dark mode {}", if enabled { "on" } else { "off" }))
}
