//! Random-access byte sources.
//!
//! Header decoding and tick parsing only ever need "read exactly `n` bytes at absolute
//! offset `o`". [`ByteSource`] captures that contract and distinguishes running out of bytes
//! ([`SourceError::Exhausted`], the normal end of a tick stream) from a hard I/O fault.
//!
//! Three implementations are provided:
//! - [`MemorySource`]: an owned, fixed buffer
//! - [`FileSource`]: a file on disk, which may still be growing while iRacing records
//! - [`SharedBuffer`]: a cloneable in-process buffer one handle appends to while another reads

use crate::{Result, SourceError, TelemetryError};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// Absolute-offset bounded reads plus an explicit close.
pub trait ByteSource {
    /// Fill `buf` entirely with the bytes starting at `offset`.
    ///
    /// Fails with [`SourceError::Exhausted`] when fewer than `buf.len()` bytes exist at
    /// `offset`, and with [`SourceError::Closed`] after [`close`](ByteSource::close).
    fn read_exact_at(&mut self, buf: &mut [u8], offset: u64) -> Result<(), SourceError>;

    /// Current total length in bytes.
    fn len(&mut self) -> Result<u64, SourceError>;

    /// Release the underlying resource. Further reads fail with [`SourceError::Closed`].
    fn close(&mut self);

    fn is_closed(&self) -> bool;

    /// Read `len` bytes at `offset` into a fresh buffer.
    ///
    /// The range is checked against [`len`](ByteSource::len) before allocating, so a length
    /// taken from a corrupted header fails with [`SourceError::Exhausted`] instead of
    /// reserving memory the source could never fill.
    fn read_vec_at(&mut self, len: usize, offset: u64) -> Result<Vec<u8>, SourceError> {
        let available = self.len()?;
        if offset.saturating_add(len as u64) > available {
            return Err(SourceError::Exhausted {
                offset,
                requested: len,
                available: available.saturating_sub(offset),
            });
        }

        let mut buf = vec![0u8; len];
        self.read_exact_at(&mut buf, offset)?;
        Ok(buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_exact_at(&mut self, buf: &mut [u8], offset: u64) -> Result<(), SourceError> {
        (**self).read_exact_at(buf, offset)
    }

    fn len(&mut self) -> Result<u64, SourceError> {
        (**self).len()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_exact_at(&mut self, buf: &mut [u8], offset: u64) -> Result<(), SourceError> {
        (**self).read_exact_at(buf, offset)
    }

    fn len(&mut self) -> Result<u64, SourceError> {
        (**self).len()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

/// Copy `buf.len()` bytes out of `data` at `offset`, reporting exhaustion precisely.
fn copy_at(data: &[u8], buf: &mut [u8], offset: u64) -> Result<(), SourceError> {
    let available = data.len() as u64;
    let end = offset.checked_add(buf.len() as u64);
    match end {
        Some(end) if end <= available => {
            let start = offset as usize;
            buf.copy_from_slice(&data[start..start + buf.len()]);
            Ok(())
        }
        _ => Err(SourceError::Exhausted {
            offset,
            requested: buf.len(),
            available: available.saturating_sub(offset),
        }),
    }
}

/// Owned in-memory byte source.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Vec<u8>,
    closed: bool,
}

impl MemorySource {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, closed: false }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for MemorySource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl ByteSource for MemorySource {
    fn read_exact_at(&mut self, buf: &mut [u8], offset: u64) -> Result<(), SourceError> {
        if self.closed {
            return Err(SourceError::Closed);
        }
        copy_at(&self.data, buf, offset)
    }

    fn len(&mut self) -> Result<u64, SourceError> {
        if self.closed {
            return Err(SourceError::Closed);
        }
        Ok(self.data.len() as u64)
    }

    fn close(&mut self) {
        self.closed = true;
        self.data = Vec::new();
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// File-backed byte source.
///
/// The file length is re-queried on every read, so a recording that iRacing is still
/// appending to yields new ticks as they are flushed.
#[derive(Debug)]
pub struct FileSource {
    file: Option<File>,
    path: PathBuf,
}

impl FileSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| TelemetryError::file_error(path.clone(), e))?;
        Ok(Self { file: Some(file), path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn read_exact_at(&mut self, buf: &mut [u8], offset: u64) -> Result<(), SourceError> {
        let file = self.file.as_mut().ok_or(SourceError::Closed)?;

        let available = file.metadata()?.len();
        if offset.saturating_add(buf.len() as u64) > available {
            return Err(SourceError::Exhausted {
                offset,
                requested: buf.len(),
                available: available.saturating_sub(offset),
            });
        }

        trace!(offset, len = buf.len(), path = %self.path.display(), "file read");
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf).map_err(|e| match e.kind() {
            // The file shrank between the length check and the read.
            std::io::ErrorKind::UnexpectedEof => {
                SourceError::Exhausted { offset, requested: buf.len(), available: 0 }
            }
            _ => SourceError::Io(e),
        })
    }

    fn len(&mut self) -> Result<u64, SourceError> {
        let file = self.file.as_ref().ok_or(SourceError::Closed)?;
        Ok(file.metadata()?.len())
    }

    fn close(&mut self) {
        self.file = None;
    }

    fn is_closed(&self) -> bool {
        self.file.is_none()
    }
}

/// Growable buffer shared between a writer and a reader.
///
/// Cloning yields another handle to the same bytes. Closing a handle only affects that
/// handle; the bytes stay reachable through the others.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    data: Arc<RwLock<Vec<u8>>>,
    closed: bool,
}

impl SharedBuffer {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data: Arc::new(RwLock::new(data)), closed: false }
    }

    /// Append bytes to the end of the buffer.
    pub fn extend_from_slice(&self, bytes: &[u8]) {
        self.data.write().unwrap_or_else(PoisonError::into_inner).extend_from_slice(bytes);
    }

    /// Overwrite bytes in place, growing the buffer if needed.
    pub fn write_at(&self, offset: usize, bytes: &[u8]) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let end = offset + bytes.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[offset..end].copy_from_slice(bytes);
    }
}

impl ByteSource for SharedBuffer {
    fn read_exact_at(&mut self, buf: &mut [u8], offset: u64) -> Result<(), SourceError> {
        if self.closed {
            return Err(SourceError::Closed);
        }
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        copy_at(&data, buf, offset)
    }

    fn len(&mut self) -> Result<u64, SourceError> {
        if self.closed {
            return Err(SourceError::Closed);
        }
        Ok(self.data.read().unwrap_or_else(PoisonError::into_inner).len() as u64)
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
