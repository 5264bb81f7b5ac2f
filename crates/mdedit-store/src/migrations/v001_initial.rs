//! v001 -- Initial schema creation.

use rusqlite::Connection;

const UP_SQL: &str = r#"
-- Client-local preferences, one row per key.
CREATE TABLE IF NOT EXISTS preferences (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL            -- RFC-3339
);
"#;

pub fn up(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(UP_SQL)
}
