//! End-to-end single-file transfer entrypoints.
//!
//! These wire a [`ChunkReader`] to a [`ChunkWriter`]/[`DigestingWriter`] for
//! the common case of copying one file to another path. Both handles are
//! opened here and released on every exit path, success or failure.

use std::path::Path;

use crate::async_file::{ReadHandle, WriteHandle};
use crate::chunker::ChunkReader;
use crate::error::Result;
use crate::hasher::DigestAccumulator;
use crate::writer::{ChunkWriter, DigestingWriter};

/// Copy `source` to `target` chunk by chunk, returning the bytes moved.
///
/// # Errors
///
/// Returns an error if either file cannot be opened, `buffer_size` is 0, or
/// any read/write submission fails. On failure both handles are released and
/// the target's contents are unspecified.
pub async fn copy<P, Q>(source: P, target: Q, buffer_size: usize) -> Result<u64>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mut chunks = ChunkReader::new(ReadHandle::open(source)?, buffer_size)?;
    let writer = ChunkWriter::new(WriteHandle::create(target)?);
    let written = writer.write_all(&mut chunks).await?;
    tracing::debug!(bytes = written, "copy complete");
    Ok(written)
}

/// Copy `source` to `target` chunk by chunk while digesting every byte
/// written, returning the lowercase hex digest.
///
/// The algorithm name is validated before either file is touched.
///
/// # Errors
///
/// Returns [`crate::TransferError::UnsupportedDigestAlgorithm`] for an
/// unknown algorithm name, or an error as for [`copy`]. No digest is
/// returned on failure.
pub async fn copy_with_digest<P, Q>(
    source: P,
    target: Q,
    buffer_size: usize,
    algorithm: &str,
) -> Result<String>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let accumulator = DigestAccumulator::new(algorithm)?;
    let mut chunks = ChunkReader::new(ReadHandle::open(source)?, buffer_size)?;
    let writer = DigestingWriter::with_accumulator(WriteHandle::create(target)?, accumulator);
    let digest = writer.write_all(&mut chunks).await?;
    tracing::debug!(%algorithm, "digesting copy complete");
    Ok(digest)
}
