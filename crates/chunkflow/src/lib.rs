//! # chunkflow
//!
//! Chunked file transfer bridging completion-callback I/O with async/await.
//!
//! This crate provides:
//! - A completion-based positional file I/O primitive and a suspension
//!   adapter that turns each submission into a single `.await`
//! - A lazy, pull-style chunk sequence over a read handle
//! - Ordered chunk consumption onto a write handle, with an optional
//!   incremental digest over every byte written
//!
//! # Transfer flow
//!
//! ```text
//! source handle -> ChunkReader -> chunk -> ChunkWriter -> target handle
//!                                   |
//!                                   +--> DigestAccumulator -> hex digest
//! ```
//!
//! Control flows the other way: the writer pulls one chunk, which drives one
//! read submission. There is no buffering beyond the single chunk in flight,
//! and chunks arrive strictly in file order. Handles are released on every
//! exit path: completion, failure, and abandonment.
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> chunkflow::Result<()> {
//! let digest =
//!     chunkflow::copy_with_digest("in.dat", "out.dat", chunkflow::DEFAULT_BUFFER_SIZE, "SHA-256")
//!         .await?;
//! println!("wrote out.dat, sha256 = {digest}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod async_file;
pub mod chunker;
pub mod error;
pub mod hasher;
pub mod transfer;
pub mod writer;

pub use async_file::{CompletionFile, HandleWatch, ReadCompletion, ReadHandle, WriteHandle};
pub use chunker::{ChunkReader, ChunkSource};
pub use error::{Result, TransferError};
pub use hasher::DigestAccumulator;
pub use transfer::{copy, copy_with_digest};
pub use writer::{ChunkWriter, DigestingWriter};

/// Default buffer size for chunked reads (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
