//! Client-local preferences: the last authenticated user and the dark-mode
//! flag. Both are caches for session continuity across restarts.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tracing::warn;
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;

const KEY_USER_UUID: &str = "user_uuid";
const KEY_DARK_MODE: &str = "dark_mode";

/// Snapshot of every stored preference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub user_uuid: Option<Uuid>,
    pub dark_mode: bool,
}

impl Database {
    pub fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn remove_preference(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    pub fn load_preferences(&self) -> Result<Preferences> {
        // A cache entry that no longer parses is dropped, not fatal.
        let user_uuid = self
            .get_preference(KEY_USER_UUID)?
            .and_then(|raw| match Uuid::parse_str(&raw) {
                Ok(uuid) => Some(uuid),
                Err(e) => {
                    warn!(value = %raw, error = %e, "Ignoring unreadable user uuid");
                    None
                }
            });

        let dark_mode = self
            .get_preference(KEY_DARK_MODE)?
            .is_some_and(|v| v == "true");

        Ok(Preferences {
            user_uuid,
            dark_mode,
        })
    }

    pub fn set_user_uuid(&self, uuid: Uuid) -> Result<()> {
        self.set_preference(KEY_USER_UUID, &uuid.to_string())
    }

    pub fn clear_user_uuid(&self) -> Result<bool> {
        self.remove_preference(KEY_USER_UUID)
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        self.set_preference(KEY_DARK_MODE, if enabled { "true" } else { "false" })
    }
}
