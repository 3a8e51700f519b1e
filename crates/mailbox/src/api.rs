//! Mailbox API trait.
//!
//! The workflow only talks to this trait, so it can run against the real
//! service or a recording mock.

use std::future::Future;
use std::pin::Pin;

use largeattach_protocol::{AttachmentItem, DraftMessage, MessageRef, UploadSession};

use crate::error::MailboxError;

/// Boxed future returned by [`MailboxApi`] methods.
pub type MailboxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, MailboxError>> + Send + 'a>>;

/// Operations the large-attachment workflow needs from the mailbox service.
pub trait MailboxApi: Send + Sync {
    /// Creates a draft and returns its server identifier.
    fn create_draft<'a>(&'a self, draft: &'a DraftMessage) -> MailboxFuture<'a, MessageRef>;

    /// Opens an upload session for an attachment of the given size.
    fn create_upload_session<'a>(
        &'a self,
        message_id: &'a str,
        attachment: &'a AttachmentItem,
    ) -> MailboxFuture<'a, UploadSession>;

    /// Sends a previously created draft.
    fn send_message<'a>(&'a self, message_id: &'a str) -> MailboxFuture<'a, ()>;
}
