//! Ordered chunk consumption onto a write handle.
//!
//! [`ChunkWriter`] drains a [`ChunkSource`] strictly in order, submitting one
//! write per chunk at a running offset and advancing by the bytes the
//! operation reports as consumed. [`DigestingWriter`] runs the same loop and
//! additionally folds every chunk through a [`DigestAccumulator`], returning
//! the lowercase hex digest once the sequence is exhausted.
//!
//! The handle is closed on completion, on failure, and on cancellation
//! (drop); the next chunk is pulled only after the previous write completed,
//! so at most one chunk is in flight.

use crate::async_file::{WriteHandle, write_at};
use crate::chunker::ChunkSource;
use crate::error::Result;
use crate::hasher::DigestAccumulator;

/// Ordered chunk consumer over an open write handle.
#[derive(Debug)]
pub struct ChunkWriter {
    handle: WriteHandle,
    offset: u64,
}

impl ChunkWriter {
    /// Wrap a write handle, starting at offset 0.
    #[must_use]
    pub fn new(handle: WriteHandle) -> Self {
        Self { handle, offset: 0 }
    }

    /// Bytes written so far; the file offset of the next write.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Submit one chunk at the current offset and advance by the bytes the
    /// operation reports as consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write submission fails.
    pub async fn write_chunk(&mut self, chunk: Vec<u8>) -> Result<usize> {
        let (consumed, _) = write_at(self.handle.file(), chunk, self.offset).await?;
        self.offset += consumed as u64;
        Ok(consumed)
    }

    /// Consume the whole source in order, then close the handle.
    ///
    /// Returns the total number of bytes written. On any failure the handle
    /// is released before the error propagates.
    ///
    /// # Errors
    ///
    /// Returns the first error from pulling a chunk or submitting a write.
    pub async fn write_all<S: ChunkSource>(mut self, source: &mut S) -> Result<u64> {
        while let Some(chunk) = source.next_chunk().await? {
            self.write_chunk(chunk).await?;
        }
        self.finish()
    }

    fn finish(mut self) -> Result<u64> {
        self.handle.close();
        tracing::debug!(bytes = self.offset, "write side complete");
        Ok(self.offset)
    }
}

/// Chunk consumer that also folds every byte through a digest accumulator.
#[derive(Debug)]
pub struct DigestingWriter {
    inner: ChunkWriter,
    digest: DigestAccumulator,
}

impl DigestingWriter {
    /// Wrap a write handle with a fresh accumulator for `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransferError::UnsupportedDigestAlgorithm`] before
    /// any submission is made if `algorithm` is not in the registry.
    pub fn new(handle: WriteHandle, algorithm: &str) -> Result<Self> {
        let digest = DigestAccumulator::new(algorithm)?;
        Ok(Self::with_accumulator(handle, digest))
    }

    /// Wrap a write handle with an already-created accumulator.
    #[must_use]
    pub fn with_accumulator(handle: WriteHandle, digest: DigestAccumulator) -> Self {
        Self {
            inner: ChunkWriter::new(handle),
            digest,
        }
    }

    /// Consume the whole source in order, close the handle, and return the
    /// lowercase hex digest of every byte written.
    ///
    /// # Errors
    ///
    /// Returns the first error from pulling a chunk or submitting a write;
    /// no digest is returned on failure.
    pub async fn write_all<S: ChunkSource>(mut self, source: &mut S) -> Result<String> {
        while let Some(chunk) = source.next_chunk().await? {
            self.digest.update(&chunk);
            self.inner.write_chunk(chunk).await?;
        }
        self.inner.finish()?;
        Ok(self.digest.finalize_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransferError;
    use sha2::{Digest, Sha256};
    use tempfile::NamedTempFile;

    struct VecSource(std::vec::IntoIter<Vec<u8>>);

    impl VecSource {
        fn new(chunks: Vec<Vec<u8>>) -> Self {
            Self(chunks.into_iter())
        }
    }

    impl ChunkSource for VecSource {
        async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
            Ok(self.0.next())
        }
    }

    #[tokio::test]
    async fn writes_chunks_in_order() {
        let temp = NamedTempFile::new().unwrap();
        let handle = WriteHandle::create(temp.path()).unwrap();
        let watch = handle.watch();

        let mut source = VecSource::new(vec![b"abc".to_vec(), b"de".to_vec(), b"f".to_vec()]);
        let written = ChunkWriter::new(handle).write_all(&mut source).await.unwrap();

        assert_eq!(written, 6);
        assert!(!watch.is_open());
        assert_eq!(std::fs::read(temp.path()).unwrap(), b"abcdef");
    }

    #[tokio::test]
    async fn empty_source_writes_nothing() {
        let temp = NamedTempFile::new().unwrap();
        let handle = WriteHandle::create(temp.path()).unwrap();

        let mut source = VecSource::new(Vec::new());
        let written = ChunkWriter::new(handle).write_all(&mut source).await.unwrap();

        assert_eq!(written, 0);
        assert_eq!(std::fs::read(temp.path()).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn offset_advances_by_consumed_bytes() {
        let temp = NamedTempFile::new().unwrap();
        let handle = WriteHandle::create(temp.path()).unwrap();

        let mut writer = ChunkWriter::new(handle);
        assert_eq!(writer.offset(), 0);
        writer.write_chunk(vec![1, 2, 3]).await.unwrap();
        assert_eq!(writer.offset(), 3);
        writer.write_chunk(vec![4]).await.unwrap();
        assert_eq!(writer.offset(), 4);
    }

    #[tokio::test]
    async fn digest_matches_independent_computation() {
        let temp = NamedTempFile::new().unwrap();
        let handle = WriteHandle::create(temp.path()).unwrap();

        let chunks = vec![b"hello ".to_vec(), b"world".to_vec()];
        let mut source = VecSource::new(chunks.clone());
        let digest = DigestingWriter::new(handle, "SHA-256")
            .unwrap()
            .write_all(&mut source)
            .await
            .unwrap();

        let expected = hex::encode(Sha256::digest(chunks.concat()));
        assert_eq!(digest, expected);
    }

    #[tokio::test]
    async fn unknown_algorithm_fails_before_io() {
        let temp = NamedTempFile::new().unwrap();
        let handle = WriteHandle::create(temp.path()).unwrap();
        let watch = handle.watch();

        let err = DigestingWriter::new(handle, "CRC-OF-DOOM").unwrap_err();
        assert!(matches!(err, TransferError::UnsupportedDigestAlgorithm(_)));
        // Handle was surrendered to the failed constructor and released.
        assert!(!watch.is_open());
    }

    #[tokio::test]
    async fn failed_write_releases_handle() {
        let mut temp = NamedTempFile::new().unwrap();
        use std::io::Write;
        temp.write_all(b"data").unwrap();
        temp.flush().unwrap();

        // Read-only file bound to the write direction: the first submission
        // fails and the handle must still end up closed.
        let handle = WriteHandle::from_file(std::fs::File::open(temp.path()).unwrap());
        let watch = handle.watch();

        let mut source = VecSource::new(vec![b"x".to_vec()]);
        let err = ChunkWriter::new(handle).write_all(&mut source).await.unwrap_err();
        assert!(matches!(err, TransferError::Io(_)));
        assert!(!watch.is_open());
    }
}
