//! # mdedit-store
//!
//! Local client-side persistence for Markdown Edit, backed by SQLite.
//!
//! Only convenience state lives here: the uuid of the last authenticated
//! user and the dark-mode flag. Documents are never cached locally; the
//! backend is their single source of truth.

pub mod database;
pub mod migrations;
pub mod preferences;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use preferences::Preferences;
