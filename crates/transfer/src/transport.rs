//! Slice transport: one PUT per slice against the session URL.

use std::future::Future;
use std::pin::Pin;

use largeattach_protocol::ContentRange;
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, LOCATION};
use tracing::trace;

use crate::{TransferError, UploadError};

/// Raw response to a slice request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub location: Option<String>,
}

/// Sends one slice to an upload URL.
///
/// Implementations must not attach credentials: the upload URL is the
/// capability. Using a trait keeps the upload loop testable with mocks.
pub trait SliceTransport: Send + Sync {
    fn put_slice<'a>(
        &'a self,
        upload_url: &'a str,
        range: ContentRange,
        payload: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<SliceResponse, UploadError>> + Send + 'a>>;
}

/// `reqwest`-based transport.
///
/// The client carries no default `Authorization` header, so it must not be
/// shared with an authenticated API client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a dedicated, unauthenticated client.
    pub fn new() -> Result<Self, TransferError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http })
    }
}

impl SliceTransport for HttpTransport {
    fn put_slice<'a>(
        &'a self,
        upload_url: &'a str,
        range: ContentRange,
        payload: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<SliceResponse, UploadError>> + Send + 'a>> {
        Box::pin(async move {
            trace!(content_range = %range, "PUT slice");
            let resp = self
                .http
                .put(upload_url)
                .header(CONTENT_LENGTH, payload.len())
                .header(CONTENT_RANGE, range.to_string())
                .body(payload)
                .send()
                .await
                .map_err(network_error)?;

            let status = resp.status().as_u16();
            let location = resp
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = resp.bytes().await.map_err(network_error)?.to_vec();

            Ok(SliceResponse {
                status,
                body,
                location,
            })
        })
    }
}

fn network_error(e: reqwest::Error) -> UploadError {
    UploadError::Transport {
        status: e.status().map(|s| s.as_u16()),
        body: e.to_string(),
    }
}
