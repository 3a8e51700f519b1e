//! Draft, upload, send: the one reusable large-attachment workflow.

use std::path::Path;

use largeattach_protocol::{AttachmentItem, DraftMessage};
use largeattach_transfer::{
    ChunkedUploader, SliceReader, SliceTransport, UploadResult, slice_count,
};
use tracing::{debug, info, warn};

use crate::api::MailboxApi;
use crate::error::MailboxError;

/// Per-run knobs for [`send_with_large_attachment`].
#[derive(Debug, Clone, Default)]
pub struct AttachmentOptions {
    /// Overrides the attachment file name (defaults to the path's file name).
    pub name: Option<String>,
    /// Overrides the MIME type (defaults to [`detect_content_type`]).
    pub content_type: Option<String>,
    /// Leave the message as a draft instead of sending it.
    pub keep_as_draft: bool,
}

/// What happened during one workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowReport {
    pub message_id: String,
    pub attachment_name: String,
    pub attachment_size: u64,
    pub upload: UploadResult,
    pub sent: bool,
}

/// Creates a draft, uploads `path` as its attachment, then sends it.
///
/// An upload failure is not an `Err`: it is reported in
/// [`WorkflowReport::upload`] (with the resumable session) and the message is
/// left unsent. Errors from the mailbox API itself are returned directly.
pub async fn send_with_large_attachment<A, T>(
    api: &A,
    uploader: &ChunkedUploader<T>,
    draft: &DraftMessage,
    path: &Path,
    options: &AttachmentOptions,
) -> Result<WorkflowReport, MailboxError>
where
    A: MailboxApi + ?Sized,
    T: SliceTransport,
{
    let attachment_name = match &options.name {
        Some(name) => name.clone(),
        None => path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| MailboxError::InvalidPath(path.display().to_string()))?,
    };

    let mut reader = SliceReader::open(path).await?;
    let attachment_size = reader.total_size();
    if attachment_size == 0 {
        return Err(MailboxError::EmptyAttachment(attachment_name));
    }

    // 1. Draft
    let message = api.create_draft(draft).await?;
    info!(message_id = %message.id, "draft created");

    // 2. Session
    let mut item = AttachmentItem::file(&attachment_name, attachment_size);
    item.content_type = options
        .content_type
        .clone()
        .or_else(|| detect_content_type(&attachment_name).map(str::to_string));
    let session = api.create_upload_session(&message.id, &item).await?;
    info!(
        name = %attachment_name,
        size = attachment_size,
        expires = %session.expiration_date_time,
        slices = slice_count(attachment_size, uploader.config().max_slice_size()),
        "upload session created"
    );

    // 3. Upload
    let upload = uploader.upload(&session, &mut reader).await;
    debug!(position = reader.position(), "closing attachment file");
    drop(reader);

    // 4. Send
    let sent = if !upload.succeeded() {
        warn!(message_id = %message.id, "upload did not complete, message left as draft");
        false
    } else if options.keep_as_draft {
        info!(message_id = %message.id, "upload complete, keeping draft");
        false
    } else {
        api.send_message(&message.id).await?;
        info!(message_id = %message.id, "message sent");
        true
    };

    Ok(WorkflowReport {
        message_id: message.id,
        attachment_name,
        attachment_size,
        upload,
        sent,
    })
}

/// Guesses a MIME type from the file extension.
pub fn detect_content_type(name: &str) -> Option<&'static str> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("pdf") => Some("application/pdf"),
        Some("zip") => Some("application/zip"),
        Some("docx") => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        Some("xlsx") => Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        Some("pptx") => {
            Some("application/vnd.openxmlformats-officedocument.presentationml.presentation")
        }
        Some("txt") => Some("text/plain"),
        Some("csv") => Some("text/csv"),
        Some("png") => Some("image/png"),
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("gif") => Some("image/gif"),
        Some("mp4") => Some("video/mp4"),
        _ => None,
    }
}
