//! Mailbox error types.

/// Errors produced by the mailbox client and workflow.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("token unavailable: {0}")]
    Token(String),

    #[error("attachment {0} is empty")]
    EmptyAttachment(String),

    #[error("invalid attachment path: {0}")]
    InvalidPath(String),
}
