//! Slice boundary computation.

use largeattach_protocol::{ByteRange, ContentRange};

/// One range-scoped slice of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceDescriptor {
    pub range_start: u64,
    /// Inclusive.
    pub range_end: u64,
}

impl SliceDescriptor {
    /// Payload size of this slice in bytes.
    pub fn payload_len(&self) -> u64 {
        self.range_end - self.range_start + 1
    }

    /// Offset immediately after this slice.
    pub fn next_offset(&self) -> u64 {
        self.range_end + 1
    }

    /// `Content-Range` value for this slice of a `total`-byte object.
    pub fn content_range(&self, total: u64) -> ContentRange {
        ContentRange {
            start: self.range_start,
            end: self.range_end,
            total,
        }
    }
}

/// Returns the first slice of `range`, which never extends past the range's
/// inclusive end nor past `total`.
pub fn slice_in(range: ByteRange, total: u64, max_slice_size: u64) -> Option<SliceDescriptor> {
    let available = range.len_within(total);
    if available == 0 || max_slice_size == 0 {
        return None;
    }
    let len = available.min(max_slice_size);
    Some(SliceDescriptor {
        range_start: range.start,
        range_end: range.start + len - 1,
    })
}

/// Number of requests a fresh upload of `total` bytes takes when the server
/// accepts every slice as sent.
pub fn slice_count(total: u64, max_slice_size: u64) -> u64 {
    if max_slice_size == 0 {
        return 0;
    }
    total.div_ceil(max_slice_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_slices(total: u64, max: u64) -> Vec<SliceDescriptor> {
        let mut slices = Vec::new();
        let mut offset = 0;
        while let Some(slice) = slice_in(ByteRange::from_offset(offset), total, max) {
            offset = slice.next_offset();
            slices.push(slice);
        }
        slices
    }

    fn assert_partitions(total: u64, max: u64) {
        let slices = plan_slices(total, max);
        let mut expected_start = 0;
        for s in &slices {
            assert_eq!(s.range_start, expected_start, "gap or overlap at {s:?}");
            assert!(s.range_end >= s.range_start);
            assert!(s.payload_len() <= max);
            expected_start = s.next_offset();
        }
        assert_eq!(expected_start, total);
        assert_eq!(slices.iter().map(|s| s.payload_len()).sum::<u64>(), total);
    }

    #[test]
    fn partitions_without_gaps_or_overlaps() {
        for total in [1, 2, 9, 10, 11, 100, 327_679, 327_680, 327_681, 1_000_000] {
            for max in [1, 3, 10, 327_680, 1_000_000, 5_000_000] {
                assert_partitions(total, max);
            }
        }
    }

    #[test]
    fn million_bytes_in_320_kib_slices() {
        let slices = plan_slices(1_000_000, 327_680);
        let sizes: Vec<u64> = slices.iter().map(|s| s.payload_len()).collect();
        assert_eq!(sizes, vec![327_680, 327_680, 327_680, 16_960]);
        assert_eq!(
            slices[3].content_range(1_000_000).to_string(),
            "bytes 983040-999999/1000000"
        );
    }

    #[test]
    fn empty_source_has_no_slices() {
        assert!(plan_slices(0, 327_680).is_empty());
        assert!(slice_in(ByteRange::from_offset(0), 0, 327_680).is_none());
        assert_eq!(slice_count(0, 327_680), 0);
    }

    #[test]
    fn zero_slice_size_yields_nothing() {
        assert!(plan_slices(100, 0).is_empty());
    }

    #[test]
    fn slice_in_open_range_mid_stream() {
        let s = slice_in(ByteRange::from_offset(400), 1000, 300).unwrap();
        assert_eq!(s.range_start, 400);
        assert_eq!(s.range_end, 699);

        let tail = slice_in(ByteRange::from_offset(900), 1000, 300).unwrap();
        assert_eq!(tail.payload_len(), 100);
        assert!(slice_in(ByteRange::from_offset(1000), 1000, 300).is_none());
    }

    #[test]
    fn slice_in_stops_at_closed_range_end() {
        let s = slice_in(ByteRange::closed(2, 3), 12, 4).unwrap();
        assert_eq!(s.content_range(12).to_string(), "bytes 2-3/12");

        let s = slice_in(ByteRange::closed(0, 9), 12, 4).unwrap();
        assert_eq!((s.range_start, s.range_end), (0, 3));

        // A closed end past the object is clamped to the last byte.
        let s = slice_in(ByteRange::closed(8, 99), 12, 16).unwrap();
        assert_eq!((s.range_start, s.range_end), (8, 11));
    }

    #[test]
    fn slice_count_rounds_up() {
        assert_eq!(slice_count(1_000_000, 327_680), 4);
        assert_eq!(slice_count(327_680, 327_680), 1);
        assert_eq!(slice_count(100, 0), 0);
    }

    #[test]
    fn single_slice_when_source_fits() {
        let slices = plan_slices(5, 327_680);
        assert_eq!(slices, vec![SliceDescriptor { range_start: 0, range_end: 4 }]);
    }
}
