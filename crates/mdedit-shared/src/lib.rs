//! # mdedit-shared
//!
//! Types shared by every Markdown Edit crate: the document and user records
//! exchanged with the backend, the request bodies the client sends, and the
//! constants that pin the REST contract.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod timestamp;
pub mod types;

pub use error::MdEditError;
pub use types::{Document, User};
