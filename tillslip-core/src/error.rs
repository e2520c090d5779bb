//! Error types shared by the tillslip crates

use thiserror::Error;

use crate::receipt::ReceiptId;

#[derive(Error, Debug)]
pub enum Error {
    /// The recognition or completion collaborator failed outright.
    #[error("upstream service failed: {0}")]
    Upstream(String),

    /// The structured (AI) response could not be located or parsed as JSON.
    #[error("malformed structured response: {0}")]
    MalformedResponse(String),

    #[error("invalid category configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    #[error("receipt not found: {0}")]
    NotFound(ReceiptId),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
