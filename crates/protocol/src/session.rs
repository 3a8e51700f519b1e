use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::range::ByteRange;

/// An in-progress upload session as returned by `createUploadSession`.
///
/// The `upload_url` is itself the capability: slice requests against it
/// carry no `Authorization` header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSession {
    pub upload_url: String,
    pub expiration_date_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_expected_ranges: Vec<String>,
}

impl UploadSession {
    /// Creates a fresh session with nothing uploaded yet.
    pub fn new(upload_url: impl Into<String>, expiration_date_time: DateTime<Utc>) -> Self {
        Self {
            upload_url: upload_url.into(),
            expiration_date_time,
            next_expected_ranges: Vec::new(),
        }
    }

    /// Returns `true` if the session can no longer accept slices at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration_date_time
    }

    /// Parses `next_expected_ranges`, skipping entries that are not ranges.
    pub fn expected_ranges(&self) -> Vec<ByteRange> {
        self.next_expected_ranges
            .iter()
            .filter_map(|r| r.parse::<ByteRange>().ok())
            .collect()
    }

    /// The lowest range the server still expects.
    ///
    /// `None` means the server reported nothing usable.
    pub fn next_expected_range(&self) -> Option<ByteRange> {
        self.expected_ranges().into_iter().min_by_key(|r| r.start)
    }

    /// Bytes of a `total`-byte object the server no longer expects.
    ///
    /// `None` when no range is usable.
    pub fn confirmed_bytes(&self, total: u64) -> Option<u64> {
        let ranges = self.expected_ranges();
        if ranges.is_empty() {
            return None;
        }
        let missing: u64 = ranges.iter().map(|r| r.len_within(total)).sum();
        Some(total.saturating_sub(missing))
    }

    /// Applies the state carried by a `202 Accepted` slice response.
    pub fn apply_partial(
        &mut self,
        next_expected_ranges: Vec<String>,
        expiration_date_time: Option<DateTime<Utc>>,
    ) {
        self.next_expected_ranges = next_expected_ranges;
        if let Some(exp) = expiration_date_time {
            self.expiration_date_time = exp;
        }
    }
}
