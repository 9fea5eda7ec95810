//! Lazy chunk sequence over a read handle.
//!
//! [`ChunkReader`] turns a [`ReadHandle`] into a finite, non-restartable
//! sequence of byte chunks: each pull submits one read at the running offset
//! into a single reusable storage buffer and emits a chunk of exactly the
//! bytes read. The sequence ends only on the EOF completion; a short read
//! still yields a chunk and the next pull may then hit EOF. The handle is
//! closed on exhaustion, on failure, and on abandonment (drop).
//!
//! Chunks are copied out of the storage buffer at emission time, so a chunk
//! stays valid however long the consumer holds it.

use std::future::Future;

use crate::async_file::{ReadCompletion, ReadHandle, read_at};
use crate::error::{Result, TransferError};

/// A sequence of byte chunks pulled one at a time.
///
/// The writer side consumes any `ChunkSource`; [`ChunkReader`] is the
/// file-backed one.
pub trait ChunkSource: Send {
    /// Pull the next chunk. `Ok(None)` means the sequence is exhausted;
    /// after that (or after an error) every further pull returns `Ok(None)`.
    fn next_chunk(&mut self) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;
}

/// Pull-style chunk producer over an open read handle.
#[derive(Debug)]
pub struct ChunkReader {
    handle: ReadHandle,
    /// Reusable storage region; taken while a submission is in flight.
    storage: Option<Vec<u8>>,
    buffer_size: usize,
    offset: u64,
    done: bool,
}

impl ChunkReader {
    /// Start a chunk sequence over `handle` with the given buffer size.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidBufferSize`] if `buffer_size` is 0.
    pub fn new(handle: ReadHandle, buffer_size: usize) -> Result<Self> {
        if buffer_size == 0 {
            return Err(TransferError::InvalidBufferSize);
        }
        Ok(Self {
            handle,
            storage: Some(vec![0u8; buffer_size]),
            buffer_size,
            offset: 0,
            done: false,
        })
    }

    /// Bytes produced so far; the file offset of the next read.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn finish(&mut self) {
        self.done = true;
        self.handle.close();
    }
}

impl ChunkSource for ChunkReader {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if self.done {
            return Ok(None);
        }
        let storage = self
            .storage
            .take()
            .unwrap_or_else(|| vec![0u8; self.buffer_size]);
        match read_at(self.handle.file(), storage, self.offset).await {
            Ok((ReadCompletion::Data(n), storage)) => {
                self.offset += n as u64;
                let chunk = storage[..n].to_vec();
                self.storage = Some(storage);
                tracing::trace!(len = n, offset = self.offset, "chunk emitted");
                Ok(Some(chunk))
            }
            Ok((ReadCompletion::Eof, storage)) => {
                self.storage = Some(storage);
                self.finish();
                tracing::trace!(total = self.offset, "chunk sequence exhausted");
                Ok(None)
            }
            Err(e) => {
                self.finish();
                Err(e)
            }
        }
    }
}
