//! Completion-based file I/O primitive and its suspension adapter.
//!
//! [`CompletionFile`] submits positional reads and writes that execute off the
//! async runtime and complete by invoking a one-shot callback, the same shape
//! as an io_uring or IOCP completion queue reduced to one operation at a
//! time. [`read_at`] and [`write_at`] convert one submission into one `.await`
//! suspension: the caller parks on a oneshot channel and the completion
//! callback resumes it with a result or an error, exactly once.
//!
//! A handle supports at most one outstanding operation at a time. Callers
//! serialize submissions themselves; [`ReadHandle`] and [`WriteHandle`] do so
//! structurally by requiring `&mut` access for every operation.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::oneshot;

use crate::error::{Result, TransferError};

/// Completion of a single read submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadCompletion {
    /// The submission read this many bytes (at least 1) into the front of
    /// the buffer.
    Data(usize),
    /// No bytes remain at or past the submitted offset. Distinct from a
    /// zero-length read, which this primitive never reports.
    Eof,
}

/// Callback invoked exactly once when a read submission completes or fails.
/// The buffer travels through the operation and is returned with the result.
pub type ReadCallback = Box<dyn FnOnce(io::Result<ReadCompletion>, Vec<u8>) + Send>;

/// Callback invoked exactly once when a write submission completes or fails,
/// carrying the number of bytes consumed from the buffer.
pub type WriteCallback = Box<dyn FnOnce(io::Result<usize>, Vec<u8>) + Send>;

/// Callback-based positional file I/O primitive.
///
/// Operations run on the blocking thread pool and resume their callback with
/// the outcome. The file descriptor is released when the primitive is closed
/// or dropped, whichever comes first.
pub struct CompletionFile {
    file: Option<Arc<File>>,
    open: Arc<AtomicBool>,
}

impl CompletionFile {
    /// Wrap an already-open file.
    #[must_use]
    pub fn from_file(file: File) -> Self {
        Self {
            file: Some(Arc::new(file)),
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Open an existing file for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::from_file(File::open(path)?))
    }

    /// Create (or truncate) a file for writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::from_file(file))
    }

    /// Whether the handle is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }

    /// Observer for the open/closed state, usable after the handle is gone.
    #[must_use]
    pub fn watch(&self) -> HandleWatch {
        HandleWatch(Arc::clone(&self.open))
    }

    /// Close the handle. Idempotent; later submissions fail their callback
    /// with an I/O error. An operation already in flight keeps the
    /// descriptor alive until it completes.
    pub fn close(&mut self) {
        self.open.store(false, Ordering::Relaxed);
        self.file = None;
    }

    /// Submit a read of up to `buf.len()` bytes at `offset`.
    ///
    /// `complete` is invoked exactly once, on the blocking pool on
    /// completion or failure, or synchronously if the handle is closed.
    pub fn submit_read(&self, mut buf: Vec<u8>, offset: u64, complete: ReadCallback) {
        let Some(file) = self.file.as_ref() else {
            complete(Err(io::Error::other("submission on closed handle")), buf);
            return;
        };
        let file = Arc::clone(file);
        tokio::task::spawn_blocking(move || {
            let result = pread(&file, &mut buf, offset).map(|n| {
                if n == 0 {
                    ReadCompletion::Eof
                } else {
                    ReadCompletion::Data(n)
                }
            });
            complete(result, buf);
        });
    }

    /// Submit a write of the whole buffer at `offset`.
    ///
    /// The backend consumes the entire buffer in one submission and reports
    /// the number of bytes consumed. `complete` is invoked exactly once.
    pub fn submit_write(&self, buf: Vec<u8>, offset: u64, complete: WriteCallback) {
        let Some(file) = self.file.as_ref() else {
            complete(Err(io::Error::other("submission on closed handle")), buf);
            return;
        };
        let file = Arc::clone(file);
        tokio::task::spawn_blocking(move || {
            let result = pwrite_full(&file, &buf, offset);
            complete(result, buf);
        });
    }
}

impl Drop for CompletionFile {
    fn drop(&mut self) {
        self.open.store(false, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for CompletionFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionFile")
            .field("open", &self.is_open())
            .finish()
    }
}

/// Shared observer for a handle's open/closed state.
#[derive(Debug, Clone)]
pub struct HandleWatch(Arc<AtomicBool>);

impl HandleWatch {
    /// Whether the watched handle is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Submit one read and suspend until its completion resumes us.
///
/// The buffer is moved through the operation and handed back alongside the
/// completion so callers can reuse it.
///
/// # Errors
///
/// Returns the submission's I/O error, or [`TransferError::CompletionLost`]
/// if the primitive dropped the callback without invoking it.
pub async fn read_at(
    file: &CompletionFile,
    buf: Vec<u8>,
    offset: u64,
) -> Result<(ReadCompletion, Vec<u8>)> {
    let (tx, rx) = oneshot::channel();
    file.submit_read(
        buf,
        offset,
        Box::new(move |result, buf| {
            let _ = tx.send((result, buf));
        }),
    );
    let (result, buf) = rx.await.map_err(|_| TransferError::CompletionLost)?;
    Ok((result?, buf))
}

/// Submit one write and suspend until its completion resumes us.
///
/// Returns the number of bytes the operation consumed and the buffer.
///
/// # Errors
///
/// Returns the submission's I/O error, or [`TransferError::CompletionLost`]
/// if the primitive dropped the callback without invoking it.
pub async fn write_at(
    file: &CompletionFile,
    buf: Vec<u8>,
    offset: u64,
) -> Result<(usize, Vec<u8>)> {
    let (tx, rx) = oneshot::channel();
    file.submit_write(
        buf,
        offset,
        Box::new(move |result, buf| {
            let _ = tx.send((result, buf));
        }),
    );
    let (result, buf) = rx.await.map_err(|_| TransferError::CompletionLost)?;
    Ok((result?, buf))
}

/// Read-side file handle, exclusively owned for the duration of a transfer.
#[derive(Debug)]
pub struct ReadHandle(CompletionFile);

impl ReadHandle {
    /// Open a file for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self(CompletionFile::open(path)?))
    }

    /// Bind an already-open file to the read direction.
    #[must_use]
    pub fn from_file(file: File) -> Self {
        Self(CompletionFile::from_file(file))
    }

    /// Observer for this handle's open/closed state.
    #[must_use]
    pub fn watch(&self) -> HandleWatch {
        self.0.watch()
    }

    pub(crate) fn file(&self) -> &CompletionFile {
        &self.0
    }

    pub(crate) fn close(&mut self) {
        self.0.close();
    }
}

/// Write-side file handle, exclusively owned for the duration of a transfer.
#[derive(Debug)]
pub struct WriteHandle(CompletionFile);

impl WriteHandle {
    /// Create (or truncate) a file for writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self(CompletionFile::create(path)?))
    }

    /// Bind an already-open file to the write direction.
    #[must_use]
    pub fn from_file(file: File) -> Self {
        Self(CompletionFile::from_file(file))
    }

    /// Observer for this handle's open/closed state.
    #[must_use]
    pub fn watch(&self) -> HandleWatch {
        self.0.watch()
    }

    pub(crate) fn file(&self) -> &CompletionFile {
        &self.0
    }

    pub(crate) fn close(&mut self) {
        self.0.close();
    }
}

#[cfg(unix)]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

#[cfg(unix)]
fn pwrite(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.write_at(buf, offset)
}

#[cfg(windows)]
fn pwrite(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_write(buf, offset)
}

/// Positional write that consumes the whole buffer, looping over short
/// writes. Reports the full buffer length on success.
fn pwrite_full(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    let mut written = 0;
    while written < buf.len() {
        match pwrite(file, &buf[written..], offset + written as u64) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(written)
}
