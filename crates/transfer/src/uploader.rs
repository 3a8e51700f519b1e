//! The chunked upload loop.
//!
//! Slices are strictly sequential: each `Content-Range` and the server's
//! `nextExpectedRanges` form a handshake, so slice n+1 is only read once
//! slice n's response has been interpreted.

use std::time::Duration;

use chrono::Utc;
use largeattach_protocol::{ByteRange, DEFAULT_SLICE_SIZE, SliceOutcome, UploadSession};
use tokio::io::{AsyncRead, AsyncSeek};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::progress::ProgressSink;
use crate::slicing::slice_in;
use crate::source::SliceReader;
use crate::transport::SliceTransport;
use crate::types::UploadResult;
use crate::validation::validate_slice_size;
use crate::{TransferError, UploadError};

/// Default bound on a single slice request.
pub const DEFAULT_SLICE_TIMEOUT: Duration = Duration::from_secs(120);

/// Consecutive 202 responses without server-side progress before giving up.
const MAX_STALLED_RESPONSES: u32 = 3;

/// Validated uploader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploaderConfig {
    max_slice_size: u64,
    slice_timeout: Duration,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            max_slice_size: DEFAULT_SLICE_SIZE,
            slice_timeout: DEFAULT_SLICE_TIMEOUT,
        }
    }
}

impl UploaderConfig {
    /// Creates a config, rejecting slice sizes the service would refuse.
    pub fn new(max_slice_size: u64, slice_timeout: Duration) -> Result<Self, TransferError> {
        validate_slice_size(max_slice_size)?;
        if slice_timeout.is_zero() {
            return Err(TransferError::InvalidTimeout);
        }
        Ok(Self {
            max_slice_size,
            slice_timeout,
        })
    }

    pub fn max_slice_size(&self) -> u64 {
        self.max_slice_size
    }

    pub fn slice_timeout(&self) -> Duration {
        self.slice_timeout
    }
}

/// Drives a byte source through an upload session.
///
/// One instance per concurrent upload; nothing is shared between runs.
pub struct ChunkedUploader<T> {
    transport: T,
    config: UploaderConfig,
    progress: Option<ProgressSink>,
    cancel: CancellationToken,
}

impl<T: SliceTransport> ChunkedUploader<T> {
    /// Creates an uploader over `transport`.
    pub fn new(transport: T, config: UploaderConfig) -> Self {
        Self {
            transport,
            config,
            progress: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the progress sink.
    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Uses an externally owned cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns a token that cancels this uploader before its next slice.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Uploads `source` into `session`.
    ///
    /// If `session.next_expected_ranges` is populated (a resumed session),
    /// the loop starts at the lowest expected range. A slice never runs past
    /// the end of the range it was cut from. The source is left
    /// positioned past the last byte read; closing it is up to the caller.
    pub async fn upload<R>(
        &self,
        session: &UploadSession,
        source: &mut SliceReader<R>,
    ) -> UploadResult
    where
        R: AsyncRead + AsyncSeek + Unpin + Send,
    {
        let total = source.total_size();
        let mut run = Run::new(session.clone(), total);

        if total == 0 {
            return run.fail(UploadError::EmptySource);
        }

        let mut window = match session.next_expected_range() {
            Some(range) if range.start >= total => {
                return run.fail(UploadError::Protocol(format!(
                    "session expects offset {} but the source has {total} bytes",
                    range.start
                )));
            }
            Some(range) => range,
            None => ByteRange::from_offset(0),
        };
        if window.start > 0 || window.end.is_some() {
            info!(offset = window.start, total, "resuming upload session");
        }

        let mut stalled = 0u32;

        while let Some(slice) = slice_in(window, total, self.config.max_slice_size) {
            if self.cancel.is_cancelled() {
                return run.fail(UploadError::Cancelled);
            }
            if run.session.is_expired_at(Utc::now()) {
                let expired_at = run.session.expiration_date_time;
                return run.fail(UploadError::SessionExpired { expired_at });
            }

            let payload = match source.read_slice(&slice).await {
                Ok(payload) => payload,
                Err(e) => return run.fail(e),
            };

            let range = slice.content_range(total);
            debug!(content_range = %range, len = slice.payload_len(), "sending slice");

            let sent = tokio::time::timeout(
                self.config.slice_timeout,
                self.transport
                    .put_slice(&run.session.upload_url, range, payload),
            )
            .await;
            run.requests += 1;

            let response = match sent {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => return run.fail(e),
                Err(_) => {
                    return run.fail(UploadError::Transport {
                        status: None,
                        body: format!(
                            "slice {range} timed out after {:?}",
                            self.config.slice_timeout
                        ),
                    });
                }
            };

            match SliceOutcome::interpret(response.status, &response.body, response.location) {
                SliceOutcome::Complete(item) => {
                    self.report(&mut run, slice.next_offset());
                    info!(
                        requests = run.requests,
                        bytes = run.bytes_sent,
                        id = item.id.as_deref().unwrap_or(""),
                        "upload completed"
                    );
                    return UploadResult::Completed {
                        item,
                        requests: run.requests,
                        bytes_sent: run.bytes_sent,
                    };
                }
                SliceOutcome::Partial {
                    next_expected_ranges,
                    expiration_date_time,
                } => {
                    run.session
                        .apply_partial(next_expected_ranges, expiration_date_time);

                    let client_next = slice.next_offset();
                    let (next, confirmed) = match run.session.next_expected_range() {
                        Some(range) => (range, run.session.confirmed_bytes(total).unwrap_or(0)),
                        None => {
                            warn!(
                                offset = client_next,
                                "accepted slice without usable nextExpectedRanges, continuing from local cursor"
                            );
                            let rest = ByteRange {
                                start: client_next,
                                end: window.end.filter(|end| *end >= client_next),
                            };
                            (rest, client_next)
                        }
                    };

                    if next.start > total {
                        return run.fail(UploadError::Protocol(format!(
                            "server expects offset {} beyond total size {total}",
                            next.start
                        )));
                    }
                    if next.start < client_next {
                        warn!(
                            client = client_next,
                            server = next.start,
                            "server asks again for bytes already sent, resuming from server offset"
                        );
                    }

                    if next.start <= window.start {
                        stalled += 1;
                        if stalled >= MAX_STALLED_RESPONSES {
                            return run.fail(UploadError::Protocol(format!(
                                "server made no progress past offset {} after {stalled} slices",
                                next.start
                            )));
                        }
                    } else {
                        stalled = 0;
                    }

                    window = next;
                    self.report(&mut run, confirmed);
                }
                SliceOutcome::Rejected { status, body } => {
                    warn!(status, content_range = %range, "slice rejected");
                    return run.fail(UploadError::Transport {
                        status: Some(status),
                        body,
                    });
                }
            }
        }

        run.fail(UploadError::Protocol(format!(
            "all {total} bytes sent but the server never confirmed completion"
        )))
    }

    /// Reports cumulative progress; only increases are delivered.
    fn report(&self, run: &mut Run, confirmed: u64) {
        if confirmed <= run.bytes_sent {
            return;
        }
        run.bytes_sent = confirmed;
        if let Some(sink) = &self.progress {
            sink.notify(run.bytes_sent, run.total);
        }
    }
}

/// Mutable state of one `upload` call.
struct Run {
    session: UploadSession,
    total: u64,
    requests: usize,
    bytes_sent: u64,
}

impl Run {
    fn new(session: UploadSession, total: u64) -> Self {
        Self {
            session,
            total,
            requests: 0,
            bytes_sent: 0,
        }
    }

    fn fail(self, error: UploadError) -> UploadResult {
        warn!(error = %error, requests = self.requests, "upload failed");
        UploadResult::Failed {
            error,
            session: self.session,
            requests: self.requests,
            bytes_sent: self.bytes_sent,
        }
    }
}
