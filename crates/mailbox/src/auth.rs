//! Bearer token seam.
//!
//! Acquiring tokens is left to the caller; the client only asks for one
//! before each authenticated request.

use std::future::Future;
use std::pin::Pin;

use crate::error::MailboxError;

/// Supplies bearer tokens for mailbox API requests.
///
/// Never consulted for slice uploads: the upload URL is its own credential.
pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> Pin<Box<dyn Future<Output = Result<String, MailboxError>> + Send + '_>>;
}

/// A fixed, pre-acquired token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TokenProvider for StaticTokenProvider {
    fn access_token(&self) -> Pin<Box<dyn Future<Output = Result<String, MailboxError>> + Send + '_>> {
        Box::pin(async move {
            if self.token.trim().is_empty() {
                return Err(MailboxError::Token("no access token configured".into()));
            }
            Ok(self.token.clone())
        })
    }
}
