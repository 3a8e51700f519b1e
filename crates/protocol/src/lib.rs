//! Wire types for the chunked attachment upload-session protocol.
//!
//! Everything here is transport-agnostic: session descriptors, byte ranges,
//! `Content-Range` formatting and defensive parsing of slice responses.

pub mod constants;
pub mod messages;
pub mod range;
pub mod response;
pub mod session;

// Re-export primary types for convenience.
pub use constants::{DEFAULT_SLICE_SIZE, MAX_SLICE_SIZE, SLICE_ALIGNMENT};
pub use messages::{
    AttachmentItem, AttachmentType, BodyType, CreateUploadSessionRequest, DraftMessage,
    EmailAddress, Importance, ItemBody, MessageRef, Recipient,
};
pub use range::{ByteRange, ContentRange, RangeParseError};
pub use response::{SliceOutcome, UploadedItem};
pub use session::UploadSession;
