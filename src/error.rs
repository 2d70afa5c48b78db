//! Error types for the layers around the quiz and drill state machines.
//!
//! The state machines themselves never fail: invalid input is a no-op. What
//! can fail is loading the embedded content, the history database, the
//! config file and logger setup.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content file not embedded: {0}")]
    Missing(String),

    #[error("content file {file} is not valid UTF-8")]
    Encoding { file: String },

    #[error("failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("question {id}: {reason}")]
    InvalidQuestion { id: u32, reason: String },

    #[error("scenario {scenario} step {step}: {reason}")]
    InvalidStep {
        scenario: u32,
        step: u32,
        reason: String,
    },

    #[error("learning module {id}: {reason}")]
    InvalidModule { id: u32, reason: String },

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    #[error("history database error: {0}")]
    History(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config serialization error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
