use thiserror::Error;

#[derive(Error, Debug)]
pub enum MdEditError {
    #[error("Malformed body: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimestampError {
    #[error("Empty timestamp")]
    Empty,

    #[error("Unrecognised timestamp format: {0}")]
    Format(String),
}
