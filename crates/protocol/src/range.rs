//! Byte ranges as they appear in `nextExpectedRanges` and `Content-Range`.

use std::fmt;
use std::str::FromStr;

/// Error returned when a range string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeParseError {
    #[error("missing '-' separator in range: {0:?}")]
    MissingSeparator(String),

    #[error("invalid range bound in {0:?}")]
    InvalidBound(String),

    #[error("range end precedes start: {0:?}")]
    Inverted(String),
}

/// A byte range still expected by the server.
///
/// `end` is inclusive. The service reports open-ended ranges (`"1048576-"`)
/// when everything from `start` to the end of the file is still missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    /// Creates a closed range `[start, end]`.
    pub fn closed(start: u64, end: u64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Creates an open-ended range starting at `start`.
    pub fn from_offset(start: u64) -> Self {
        Self { start, end: None }
    }

    /// Number of bytes covered, given the total object size.
    pub fn len_within(&self, total: u64) -> u64 {
        let end = match self.end {
            Some(end) => end.min(total.saturating_sub(1)),
            None => total.saturating_sub(1),
        };
        if total == 0 || self.start > end {
            0
        } else {
            end - self.start + 1
        }
    }
}

impl FromStr for ByteRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (start, end) = trimmed
            .split_once('-')
            .ok_or_else(|| RangeParseError::MissingSeparator(s.to_string()))?;

        let start: u64 = start
            .trim()
            .parse()
            .map_err(|_| RangeParseError::InvalidBound(s.to_string()))?;

        let end = end.trim();
        if end.is_empty() {
            return Ok(Self::from_offset(start));
        }

        let end: u64 = end
            .parse()
            .map_err(|_| RangeParseError::InvalidBound(s.to_string()))?;
        if end < start {
            return Err(RangeParseError::Inverted(s.to_string()));
        }
        Ok(Self::closed(start, end))
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}-", self.start),
        }
    }
}

/// Value of the `Content-Range` header for one slice request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: u64,
    /// Inclusive.
    pub end: u64,
    pub total: u64,
}

impl ContentRange {
    /// Payload length this header describes.
    pub fn payload_len(&self) -> u64 {
        self.end - self.start + 1
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes {}-{}/{}", self.start, self.end, self.total)
    }
}
