use tracing::info;

use crate::state::Session;

pub async fn login(session: &mut Session, token: &str) -> Result<String, String> {
    session
        .login(token)
        .await
        .map_err(|e| format!("Login failed: {e}"))?;
    info!("Logged in from shell");
    Ok(session.greeting())
}

pub fn logout(session: &mut Session) -> Result<String, String> {
    let url = session.logout();
    Ok(format!("Logged out. Close the backend session at {url}"))
}

pub fn whoami(session: &Session) -> Result<String, String> {
    match session.user() {
        Some(user) if user.email.is_empty() => Ok(format!("{} ({})", user.username, user.uuid)),
        Some(user) => Ok(format!("{} <{}> ({})", user.username, user.email, user.uuid)),
        None => Ok(session.greeting()),
    }
}

pub fn dismiss(session: &Session) -> Result<String, String> {
    if session.notifier().dismiss() {
        Ok("Dismissed".into())
    } else {
        Ok("Nothing to dismiss".into())
    }
}
