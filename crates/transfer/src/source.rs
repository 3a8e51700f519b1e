use std::io::SeekFrom;
use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

use crate::UploadError;
use crate::slicing::SliceDescriptor;

/// Reads slices from a seekable source of known length.
///
/// Dropping the reader closes the source.
pub struct SliceReader<R> {
    inner: R,
    total_size: u64,
    position: u64,
}

impl SliceReader<tokio::fs::File> {
    /// Opens `path` and takes its length from the file metadata.
    pub async fn open(path: &Path) -> std::io::Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        let total_size = file.metadata().await?.len();
        Ok(Self::new(file, total_size))
    }
}

impl<R> SliceReader<R>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    /// Wraps `inner`, which must be positioned at offset 0.
    pub fn new(inner: R, total_size: u64) -> Self {
        Self {
            inner,
            total_size,
            position: 0,
        }
    }

    /// Repositions the source (used when the server asks for other bytes).
    pub async fn seek_to(&mut self, offset: u64) -> std::io::Result<()> {
        self.inner.seek(SeekFrom::Start(offset)).await?;
        self.position = offset;
        Ok(())
    }

    /// Reads exactly the bytes of `slice`.
    ///
    /// Seeks first only if the cursor is not already at `slice.range_start`.
    /// Fails with [`UploadError::Read`] when the source ends early.
    pub async fn read_slice(&mut self, slice: &SliceDescriptor) -> Result<Vec<u8>, UploadError> {
        let expected = slice.payload_len();
        let read_error = |available: u64, detail: String| UploadError::Read {
            offset: slice.range_start,
            expected,
            available,
            detail,
        };

        if self.position != slice.range_start {
            self.seek_to(slice.range_start)
                .await
                .map_err(|e| read_error(0, e.to_string()))?;
        }

        let mut buf = vec![0u8; expected as usize];
        let mut filled = 0usize;
        while filled < buf.len() {
            let n = self
                .inner
                .read(&mut buf[filled..])
                .await
                .map_err(|e| read_error(filled as u64, e.to_string()))?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        self.position += filled as u64;

        if filled < buf.len() {
            return Err(read_error(filled as u64, "unexpected end of source".into()));
        }
        Ok(buf)
    }

    /// Current byte offset.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Total source size in bytes.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;

    fn slice(start: u64, end: u64) -> SliceDescriptor {
        SliceDescriptor {
            range_start: start,
            range_end: end,
        }
    }

    #[tokio::test]
    async fn reads_sequential_slices() {
        let mut reader = SliceReader::new(Cursor::new(b"AABBCCDDEE".to_vec()), 10);

        assert_eq!(reader.read_slice(&slice(0, 3)).await.unwrap(), b"AABB");
        assert_eq!(reader.read_slice(&slice(4, 7)).await.unwrap(), b"CCDD");
        assert_eq!(reader.read_slice(&slice(8, 9)).await.unwrap(), b"EE");
        assert_eq!(reader.position(), 10);
    }

    #[tokio::test]
    async fn seeks_when_slice_is_elsewhere() {
        let mut reader = SliceReader::new(Cursor::new(b"0123456789".to_vec()), 10);
        assert_eq!(reader.read_slice(&slice(6, 9)).await.unwrap(), b"6789");
        assert_eq!(reader.read_slice(&slice(2, 3)).await.unwrap(), b"23");
        assert_eq!(reader.position(), 4);
    }

    #[tokio::test]
    async fn short_source_is_a_read_error() {
        // Claims 10 bytes but holds only 6.
        let mut reader = SliceReader::new(Cursor::new(b"012345".to_vec()), 10);
        reader.read_slice(&slice(0, 3)).await.unwrap();

        let err = reader.read_slice(&slice(4, 7)).await.unwrap_err();
        assert_eq!(
            err,
            UploadError::Read {
                offset: 4,
                expected: 4,
                available: 2,
                detail: "unexpected end of source".into(),
            }
        );
    }

    #[tokio::test]
    async fn open_measures_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Sample.pdf");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&[7u8; 1234]).unwrap();
        drop(f);

        let mut reader = SliceReader::open(&path).await.unwrap();
        assert_eq!(reader.total_size(), 1234);
        let data = reader.read_slice(&slice(1000, 1233)).await.unwrap();
        assert_eq!(data.len(), 234);
        assert!(data.iter().all(|b| *b == 7));
    }
}
