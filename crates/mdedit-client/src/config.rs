//! Client configuration loaded from environment variables.
//!
//! All settings have defaults so the client can start against a local
//! backend with zero configuration.

use std::path::PathBuf;
use std::time::Duration;

use mdedit_shared::constants::{
    AUTOSAVE_DELAY, DEFAULT_RENDER_URL, DEFAULT_SERVER_URL, NOTICE_DURATION,
};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the document backend.
    /// Env: `MDEDIT_SERVER_URL`
    /// Default: `http://localhost:8080`
    pub server_url: String,

    /// Value of the `auth_session` cookie issued by the backend after login.
    /// Env: `MDEDIT_SESSION`
    /// Default: none (the session starts logged out).
    pub session_token: Option<String>,

    /// Quiet period after the last edit before it is persisted.
    /// Env: `MDEDIT_AUTOSAVE_MS`
    pub autosave_delay: Duration,

    /// How long transient notices stay visible.
    /// Env: `MDEDIT_NOTICE_MS`
    pub notice_duration: Duration,

    /// Markdown render endpoint used for HTML export.
    /// Env: `MDEDIT_RENDER_URL`
    pub render_url: String,

    /// Directory exported HTML files are written to.
    /// Env: `MDEDIT_EXPORT_DIR`
    /// Default: current directory
    pub export_dir: PathBuf,

    /// Preferences database location.
    /// Env: `MDEDIT_DB_PATH`
    /// Default: none (platform data directory).
    pub db_path: Option<PathBuf>,

    /// Per-request timeout for backend and render calls.
    /// Env: `MDEDIT_REQUEST_TIMEOUT_SECS`
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            session_token: None,
            autosave_delay: AUTOSAVE_DELAY,
            notice_duration: NOTICE_DURATION,
            render_url: DEFAULT_RENDER_URL.to_string(),
            export_dir: PathBuf::from("."),
            db_path: None,
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("MDEDIT_SERVER_URL") {
            let url = url.trim().trim_end_matches('/');
            if url.starts_with("http://") || url.starts_with("https://") {
                config.server_url = url.to_string();
            } else {
                tracing::warn!(value = %url, "Invalid MDEDIT_SERVER_URL, using default");
            }
        }

        if let Some(token) = lookup("MDEDIT_SESSION") {
            let token = token.trim();
            if !token.is_empty() {
                config.session_token = Some(token.to_string());
            }
        }

        if let Some(ms) = parse_millis(&lookup, "MDEDIT_AUTOSAVE_MS") {
            config.autosave_delay = ms;
        }

        if let Some(ms) = parse_millis(&lookup, "MDEDIT_NOTICE_MS") {
            config.notice_duration = ms;
        }

        if let Some(url) = lookup("MDEDIT_RENDER_URL") {
            if !url.trim().is_empty() {
                config.render_url = url.trim().to_string();
            }
        }

        if let Some(dir) = lookup("MDEDIT_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }

        if let Some(path) = lookup("MDEDIT_DB_PATH") {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(val) = lookup("MDEDIT_REQUEST_TIMEOUT_SECS") {
            match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(
                    value = %val,
                    "Invalid MDEDIT_REQUEST_TIMEOUT_SECS, using default"
                ),
            }
        }

        config
    }

    /// Browser URL that starts the OAuth login flow on the backend.
    pub fn login_url(&self) -> String {
        format!("{}{}", self.server_url, mdedit_shared::constants::PATH_AUTH_LOGIN)
    }

    /// Browser URL that ends the backend session.
    pub fn logout_url(&self) -> String {
        format!("{}{}", self.server_url, mdedit_shared::constants::PATH_AUTH_LOGOUT)
    }
}

fn parse_millis<F>(lookup: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let val = lookup(key)?;
    match val.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!(key, value = %val, "Invalid duration, using default");
            None
        }
    }
}
