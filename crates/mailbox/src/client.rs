//! Mailbox REST client.
//!
//! Async HTTP client using `reqwest`, authenticated per request with a
//! bearer token from the injected [`TokenProvider`].

use std::sync::Arc;

use largeattach_protocol::{
    AttachmentItem, CreateUploadSessionRequest, DraftMessage, MessageRef, UploadSession,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::debug;

use crate::api::{MailboxApi, MailboxFuture};
use crate::auth::TokenProvider;
use crate::error::MailboxError;

const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Characters left as-is in a path segment (ids and UPNs).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'@');

/// Mailbox API client bound to one user's mailbox.
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
    user_id: String,
    tokens: Arc<dyn TokenProvider>,
}

impl GraphClient {
    /// Creates a client for `user_id` (object id or user principal name).
    pub fn new(tokens: Arc<dyn TokenProvider>, user_id: impl Into<String>) -> Result<Self, MailboxError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_id: user_id.into(),
            tokens,
        })
    }

    /// Points the client at another API root (sovereign clouds, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn user_path(&self) -> String {
        format!(
            "{}/users/{}",
            self.base_url,
            utf8_percent_encode(&self.user_id, PATH_SEGMENT)
        )
    }

    fn message_path(&self, message_id: &str) -> String {
        format!(
            "{}/messages/{}",
            self.user_path(),
            utf8_percent_encode(message_id, PATH_SEGMENT)
        )
    }

    /// Performs an authenticated POST and returns the response body.
    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: Option<&B>) -> Result<Vec<u8>, MailboxError> {
        let token = self.tokens.access_token().await?;
        let mut req = self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {token}"));
        req = match body {
            Some(b) => req
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(b)?),
            None => req.header(reqwest::header::CONTENT_LENGTH, 0),
        };

        let resp = req.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MailboxError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

impl MailboxApi for GraphClient {
    fn create_draft<'a>(&'a self, draft: &'a DraftMessage) -> MailboxFuture<'a, MessageRef> {
        Box::pin(async move {
            let url = format!("{}/messages", self.user_path());
            let body = self.post(&url, Some(draft)).await?;
            let message: MessageRef = serde_json::from_slice(&body)?;
            debug!(message_id = %message.id, "draft created");
            Ok(message)
        })
    }

    fn create_upload_session<'a>(
        &'a self,
        message_id: &'a str,
        attachment: &'a AttachmentItem,
    ) -> MailboxFuture<'a, UploadSession> {
        Box::pin(async move {
            let url = format!(
                "{}/attachments/createUploadSession",
                self.message_path(message_id)
            );
            let req = CreateUploadSessionRequest {
                attachment_item: attachment.clone(),
            };
            let body = self.post(&url, Some(&req)).await?;
            let session: UploadSession = serde_json::from_slice(&body)?;
            debug!(
                expires = %session.expiration_date_time,
                "upload session created"
            );
            Ok(session)
        })
    }

    fn send_message<'a>(&'a self, message_id: &'a str) -> MailboxFuture<'a, ()> {
        Box::pin(async move {
            let url = format!("{}/send", self.message_path(message_id));
            self.post::<()>(&url, None).await?;
            debug!(message_id, "message sent");
            Ok(())
        })
    }
}
