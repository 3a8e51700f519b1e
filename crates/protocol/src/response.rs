//! Interpretation of slice responses.
//!
//! Bodies are parsed defensively: unknown fields are ignored, empty or
//! malformed bodies never fail interpretation on their own.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::constants::{STATUS_ACCEPTED, STATUS_CREATED, STATUS_OK};

/// The finished remote object returned by the final slice.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedItem {
    /// Server-assigned identifier, when the body carries one.
    pub id: Option<String>,
    /// `Location` header of the response, when present.
    pub location: Option<String>,
    /// Raw JSON body (`Null` when empty or not JSON).
    pub body: serde_json::Value,
}

/// What a single slice response means for the upload loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SliceOutcome {
    /// 200/201: the object is finished.
    Complete(UploadedItem),
    /// 202: more bytes are expected.
    Partial {
        next_expected_ranges: Vec<String>,
        expiration_date_time: Option<DateTime<Utc>>,
    },
    /// Anything else.
    Rejected { status: u16, body: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialBody {
    #[serde(default)]
    next_expected_ranges: Vec<String>,
    #[serde(default)]
    expiration_date_time: Option<DateTime<Utc>>,
}

impl SliceOutcome {
    /// Classifies a raw response.
    pub fn interpret(status: u16, body: &[u8], location: Option<String>) -> Self {
        match status {
            STATUS_OK | STATUS_CREATED => {
                let body: serde_json::Value = if body.iter().all(u8::is_ascii_whitespace) {
                    serde_json::Value::Null
                } else {
                    serde_json::from_slice(body).unwrap_or(serde_json::Value::Null)
                };
                let id = body
                    .get("id")
                    .or_else(|| body.get("Id"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                SliceOutcome::Complete(UploadedItem { id, location, body })
            }
            STATUS_ACCEPTED => {
                let parsed: PartialBody = serde_json::from_slice(body).unwrap_or_default();
                SliceOutcome::Partial {
                    next_expected_ranges: parsed.next_expected_ranges,
                    expiration_date_time: parsed.expiration_date_time,
                }
            }
            _ => SliceOutcome::Rejected {
                status,
                body: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }
}
