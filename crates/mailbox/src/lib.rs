//! Mailbox collaborator for the large-attachment flow.
//!
//! This crate wraps the mailbox REST API (create draft, create upload
//! session, send) behind [`MailboxApi`] and composes it with the chunked
//! uploader in [`send_with_large_attachment`].
//!
//! # Pipeline
//!
//! 1. **Draft**: create the message the file is attached to
//! 2. **Session**: open an upload session sized to the file
//! 3. **Upload**: stream the file through [`largeattach_transfer::ChunkedUploader`]
//! 4. **Send**: send the draft once the attachment is confirmed

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod workflow;

// Re-export primary types for convenience.
pub use api::{MailboxApi, MailboxFuture};
pub use auth::{StaticTokenProvider, TokenProvider};
pub use client::GraphClient;
pub use error::MailboxError;
pub use workflow::{AttachmentOptions, WorkflowReport, detect_content_type, send_with_large_attachment};
