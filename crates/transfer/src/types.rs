use largeattach_protocol::{UploadSession, UploadedItem};

use crate::UploadError;

/// Terminal outcome of one [`ChunkedUploader::upload`](crate::ChunkedUploader::upload) call.
///
/// Created exactly once per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadResult {
    /// The server confirmed the finished remote object.
    Completed {
        item: UploadedItem,
        /// Slice requests issued during this call.
        requests: usize,
        bytes_sent: u64,
    },
    /// The run stopped early. `session` is the last known server state and
    /// can be passed back to `upload` to resume.
    Failed {
        error: UploadError,
        session: UploadSession,
        requests: usize,
        bytes_sent: u64,
    },
}

impl UploadResult {
    /// Returns `true` if the upload completed.
    pub fn succeeded(&self) -> bool {
        matches!(self, UploadResult::Completed { .. })
    }

    /// The finished remote object, if any.
    pub fn item(&self) -> Option<&UploadedItem> {
        match self {
            UploadResult::Completed { item, .. } => Some(item),
            UploadResult::Failed { .. } => None,
        }
    }

    /// The terminal error, if any.
    pub fn error(&self) -> Option<&UploadError> {
        match self {
            UploadResult::Completed { .. } => None,
            UploadResult::Failed { error, .. } => Some(error),
        }
    }

    /// Session state to resume from after a failure.
    pub fn resume_session(&self) -> Option<&UploadSession> {
        match self {
            UploadResult::Completed { .. } => None,
            UploadResult::Failed { session, .. } => Some(session),
        }
    }

    /// Number of slice requests issued.
    pub fn requests(&self) -> usize {
        match self {
            UploadResult::Completed { requests, .. } | UploadResult::Failed { requests, .. } => {
                *requests
            }
        }
    }

    /// Cumulative bytes the server accepted, as last reported to the progress sink.
    pub fn bytes_sent(&self) -> u64 {
        match self {
            UploadResult::Completed { bytes_sent, .. }
            | UploadResult::Failed { bytes_sent, .. } => *bytes_sent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn session() -> UploadSession {
        UploadSession::new("https://example.com/u", Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn completed_accessors() {
        let result = UploadResult::Completed {
            item: UploadedItem {
                id: Some("a1".into()),
                location: None,
                body: serde_json::json!({"id": "a1"}),
            },
            requests: 4,
            bytes_sent: 1_000_000,
        };
        assert!(result.succeeded());
        assert_eq!(result.item().unwrap().id.as_deref(), Some("a1"));
        assert!(result.error().is_none());
        assert!(result.resume_session().is_none());
        assert_eq!(result.requests(), 4);
        assert_eq!(result.bytes_sent(), 1_000_000);
    }

    #[test]
    fn failed_accessors() {
        let result = UploadResult::Failed {
            error: UploadError::Cancelled,
            session: session(),
            requests: 0,
            bytes_sent: 0,
        };
        assert!(!result.succeeded());
        assert!(result.item().is_none());
        assert_eq!(result.error(), Some(&UploadError::Cancelled));
        assert_eq!(result.resume_session().unwrap().upload_url, "https://example.com/u");
    }
}
