//! Request and response payloads exchanged with the mailbox API.

use serde::{Deserialize, Serialize};

/// Kind of attachment an upload session is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttachmentType {
    File,
    Item,
    Reference,
}

/// Describes the attachment an upload session will receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentItem {
    pub attachment_type: AttachmentType,
    pub name: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_inline: Option<bool>,
}

impl AttachmentItem {
    /// A regular file attachment of `size` bytes.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            attachment_type: AttachmentType::File,
            name: name.into(),
            size,
            content_type: None,
            is_inline: None,
        }
    }
}

/// Body of `POST .../attachments/createUploadSession`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUploadSessionRequest {
    #[serde(rename = "AttachmentItem")]
    pub attachment_item: AttachmentItem,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Importance {
    Low,
    #[default]
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyType {
    Text,
    #[default]
    Html,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: BodyType,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email_address: EmailAddress,
}

impl Recipient {
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            email_address: EmailAddress {
                address: address.into(),
                name: None,
            },
        }
    }
}

/// The minimal draft the workflow creates before attaching the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftMessage {
    pub subject: String,
    #[serde(default)]
    pub importance: Importance,
    pub body: ItemBody,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to_recipients: Vec<Recipient>,
}

/// Identifier of a message created on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: String,
}
