/// Slice sizes must be a multiple of this many bytes (320 KiB).
pub const SLICE_ALIGNMENT: u64 = 320 * 1024;

/// Default bytes per slice request.
pub const DEFAULT_SLICE_SIZE: u64 = SLICE_ALIGNMENT;

/// Largest slice the service accepts in one request (60 MiB).
pub const MAX_SLICE_SIZE: u64 = 60 * 1024 * 1024;

/// HTTP status returned when the final slice finished the object.
pub const STATUS_OK: u16 = 200;

/// HTTP status returned when the final slice created the object.
pub const STATUS_CREATED: u16 = 201;

/// HTTP status returned for an accepted, non-final slice.
pub const STATUS_ACCEPTED: u16 = 202;
