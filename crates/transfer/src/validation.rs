use largeattach_protocol::{MAX_SLICE_SIZE, SLICE_ALIGNMENT};

use crate::TransferError;

/// Validates a configured slice size against the service's constraints.
///
/// Rejects:
/// - Zero
/// - Sizes that are not a multiple of 320 KiB
/// - Sizes above the 60 MiB per-request ceiling
pub fn validate_slice_size(size: u64) -> Result<(), TransferError> {
    if size == 0 {
        return Err(TransferError::InvalidSliceSize(size, "must be non-zero"));
    }

    if size % SLICE_ALIGNMENT != 0 {
        return Err(TransferError::InvalidSliceSize(
            size,
            "must be a multiple of 327680 bytes",
        ));
    }

    if size > MAX_SLICE_SIZE {
        return Err(TransferError::InvalidSliceSize(
            size,
            "exceeds the 60 MiB per-request maximum",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero() {
        assert!(validate_slice_size(0).is_err());
    }

    #[test]
    fn rejects_unaligned_size() {
        assert!(validate_slice_size(1024 * 1024).is_err());
        assert!(validate_slice_size(SLICE_ALIGNMENT + 1).is_err());
    }

    #[test]
    fn rejects_oversized_slice() {
        assert!(validate_slice_size(MAX_SLICE_SIZE + SLICE_ALIGNMENT).is_err());
    }

    #[test]
    fn accepts_default_size() {
        assert!(validate_slice_size(SLICE_ALIGNMENT).is_ok());
    }

    #[test]
    fn accepts_multiples_up_to_maximum() {
        assert!(validate_slice_size(SLICE_ALIGNMENT * 10).is_ok());
        assert!(validate_slice_size(MAX_SLICE_SIZE).is_ok());
    }

    #[test]
    fn error_names_the_offending_size() {
        let err = validate_slice_size(1000).unwrap_err();
        assert!(err.to_string().contains("1000"));
    }
}
