//! Chunked upload-session client with resume support and progress tracking.
//!
//! [`ChunkedUploader`] drives a [`SliceReader`] through the upload-session
//! protocol one slice at a time and produces a single [`UploadResult`].

mod progress;
mod slicing;
mod source;
mod transport;
mod types;
mod uploader;
mod validation;

pub use progress::{ProgressCallback, ProgressSink, SpeedCalculator, UploadProgress};
pub use slicing::{SliceDescriptor, slice_count, slice_in};
pub use source::SliceReader;
pub use transport::{HttpTransport, SliceResponse, SliceTransport};
pub use types::UploadResult;
pub use uploader::{ChunkedUploader, UploaderConfig};
pub use validation::validate_slice_size;

use chrono::{DateTime, Utc};

/// Errors raised while setting up a transfer.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid slice size {0}: {1}")]
    InvalidSliceSize(u64, &'static str),

    #[error("slice timeout must be non-zero")]
    InvalidTimeout,
}

/// Terminal failure of an upload run.
///
/// Carried inside [`UploadResult::Failed`]; the uploader never retries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UploadError {
    #[error("read error at offset {offset}: expected {expected} bytes, got {available} ({detail})")]
    Read {
        offset: u64,
        expected: u64,
        available: u64,
        detail: String,
    },

    #[error("transport error ({}): {body}", describe_status(.status))]
    Transport { status: Option<u16>, body: String },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("upload session expired at {expired_at}")]
    SessionExpired { expired_at: DateTime<Utc> },

    #[error("cancelled")]
    Cancelled,

    #[error("byte source is empty")]
    EmptySource,
}

fn describe_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {code}"),
        None => "no response".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display_mentions_status() {
        let err = UploadError::Transport {
            status: Some(500),
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "transport error (HTTP 500): boom");

        let err = UploadError::Transport {
            status: None,
            body: "timed out".into(),
        };
        assert_eq!(err.to_string(), "transport error (no response): timed out");
    }
}
