//! The byte-stream contract every codec in this crate is written against.
//!
//! A [`Stream`] is a monotonically seekable cursor over a byte sink/source
//! with explicit capability flags. Reads and writes either transfer exactly
//! the requested number of bytes or fail; there are no silent short reads.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Error, Result};

/// Abstract positioned byte stream. All container codecs are generic over
/// this trait; concrete backings decide storage and capabilities.
///
/// Implementations supply the raw `read_some`/`write_some` transfers; the
/// provided `read_exact`/`write_all` wrappers add the bounds checking and
/// exact-transfer guarantees the codec layer relies on.
pub trait Stream {
    /// Current absolute position.
    fn tell(&self) -> u64;

    /// Total length of the underlying data.
    fn len(&self) -> u64;

    /// Seek to an absolute position. Positions past `len()` are legal;
    /// the next read fails its bounds check instead.
    fn seek(&mut self, pos: u64) -> Result<()>;

    fn can_read(&self) -> bool;

    fn can_write(&self) -> bool;

    /// Raw read at the current position. May transfer fewer bytes than
    /// requested; callers use `read_exact`.
    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Raw write at the current position. May accept fewer bytes than
    /// offered; callers use `write_all`.
    fn write_some(&mut self, buf: &[u8]) -> Result<usize>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// End-of-stream predicate: `tell() >= len()`.
    fn is_eos(&self) -> bool {
        self.tell() >= self.len()
    }

    /// Read exactly `buf.len()` bytes or fail. The request is bounds-checked
    /// against the remaining length before any byte moves.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if !self.can_read() {
            return Err(Error::NotReadable);
        }
        let offset = self.tell();
        let have = self.len().saturating_sub(offset);
        if buf.len() as u64 > have {
            return Err(Error::Bounds {
                offset,
                need: buf.len(),
                have: have as usize,
            });
        }
        let transferred = self.read_some(buf)?;
        if transferred != buf.len() {
            return Err(Error::Truncated {
                offset,
                expected: buf.len(),
                transferred,
            });
        }
        Ok(())
    }

    /// Write all of `buf` or fail.
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        if !self.can_write() {
            return Err(Error::NotWritable);
        }
        let offset = self.tell();
        let written = self.write_some(buf)?;
        if written != buf.len() {
            return Err(Error::ShortWrite {
                offset,
                expected: buf.len(),
                written,
            });
        }
        Ok(())
    }
}

impl<S: Stream + ?Sized> Stream for &mut S {
    fn tell(&self) -> u64 {
        (**self).tell()
    }

    fn len(&self) -> u64 {
        (**self).len()
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        (**self).seek(pos)
    }

    fn can_read(&self) -> bool {
        (**self).can_read()
    }

    fn can_write(&self) -> bool {
        (**self).can_write()
    }

    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read_some(buf)
    }

    fn write_some(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write_some(buf)
    }
}

/// Growable in-memory stream, readable and writable.
///
/// Writes at or past the end extend the buffer; a seek past the end followed
/// by a write zero-fills the gap.
#[derive(Debug, Clone, Default)]
pub struct MemoryStream {
    data: Vec<u8>,
    pos: u64,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing bytes; the cursor starts at zero.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl Stream for MemoryStream {
    fn tell(&self) -> u64 {
        self.pos
    }

    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.pos = pos;
        Ok(())
    }

    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        true
    }

    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        let pos = self.pos as usize;
        let available = self.data.len().saturating_sub(pos);
        let n = buf.len().min(available);
        buf[..n].copy_from_slice(&self.data[pos..pos + n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn write_some(&mut self, buf: &[u8]) -> Result<usize> {
        let pos = self.pos as usize;
        let end = pos + buf.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[pos..end].copy_from_slice(buf);
        self.pos = end as u64;
        Ok(buf.len())
    }
}

/// File-backed stream over [`std::fs::File`].
#[derive(Debug)]
pub struct FileStream {
    file: File,
    len: u64,
    pos: u64,
    writable: bool,
}

impl FileStream {
    /// Open an existing file as a read-only stream.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file,
            len,
            pos: 0,
            writable: false,
        })
    }

    /// Create (or truncate) a file as a read-write stream.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            file,
            len: 0,
            pos: 0,
            writable: true,
        })
    }
}

impl Stream for FileStream {
    fn tell(&self) -> u64 {
        self.pos
    }

    fn len(&self) -> u64 {
        self.len
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.pos = pos;
        Ok(())
    }

    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        self.writable
    }

    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.file.seek(SeekFrom::Start(self.pos))?;
        let mut total = 0;
        while total < buf.len() {
            let n = self.file.read(&mut buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        self.pos += total as u64;
        Ok(total)
    }

    fn write_some(&mut self, buf: &[u8]) -> Result<usize> {
        self.file.seek(SeekFrom::Start(self.pos))?;
        self.file.write_all(buf)?;
        self.pos += buf.len() as u64;
        self.len = self.len.max(self.pos);
        Ok(buf.len())
    }
}

/// Read-only view over a stream. Every write fails with the usage error
/// before reaching the underlying sink.
#[derive(Debug)]
pub struct InputStream<S: Stream> {
    inner: S,
}

impl<S: Stream> InputStream<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Stream> Stream for InputStream<S> {
    fn tell(&self) -> u64 {
        self.inner.tell()
    }

    fn len(&self) -> u64 {
        self.inner.len()
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(pos)
    }

    fn can_read(&self) -> bool {
        self.inner.can_read()
    }

    fn can_write(&self) -> bool {
        false
    }

    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.inner.read_some(buf)
    }

    fn write_some(&mut self, _buf: &[u8]) -> Result<usize> {
        Err(Error::NotWritable)
    }
}

/// Write-only view over a stream; the dual of [`InputStream`].
#[derive(Debug)]
pub struct OutputStream<S: Stream> {
    inner: S,
}

impl<S: Stream> OutputStream<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Stream> Stream for OutputStream<S> {
    fn tell(&self) -> u64 {
        self.inner.tell()
    }

    fn len(&self) -> u64 {
        self.inner.len()
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(pos)
    }

    fn can_read(&self) -> bool {
        false
    }

    fn can_write(&self) -> bool {
        self.inner.can_write()
    }

    fn read_some(&mut self, _buf: &mut [u8]) -> Result<usize> {
        Err(Error::NotReadable)
    }

    fn write_some(&mut self, buf: &[u8]) -> Result<usize> {
        self.inner.write_some(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_past_end_is_a_bounds_error() {
        let mut s = MemoryStream::from_vec(vec![1, 2, 3]);
        let mut buf = [0u8; 4];
        match s.read_exact(&mut buf) {
            Err(Error::Bounds { offset, need, have }) => {
                assert_eq!(offset, 0);
                assert_eq!(need, 4);
                assert_eq!(have, 3);
            }
            other => panic!("expected bounds error, got {other:?}"),
        }
        // Position is unchanged on the failed read; a smaller read still works.
        let mut buf = [0u8; 3];
        s.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
    }

    #[test]
    fn seek_past_end_fails_on_read_not_on_seek() {
        let mut s = MemoryStream::from_vec(vec![0; 8]);
        s.seek(100).unwrap();
        assert!(s.is_eos());
        let mut byte = [0u8; 1];
        assert!(matches!(s.read_exact(&mut byte), Err(Error::Bounds { .. })));
    }

    #[test]
    fn write_extends_memory_stream() {
        let mut s = MemoryStream::new();
        s.write_all(&[1, 2, 3]).unwrap();
        s.seek(1).unwrap();
        s.write_all(&[9, 9, 9]).unwrap();
        assert_eq!(s.as_bytes(), &[1, 9, 9, 9]);
        assert_eq!(s.tell(), 4);
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn eos_tracks_position() {
        let mut s = MemoryStream::from_vec(vec![0; 2]);
        assert!(!s.is_eos());
        let mut buf = [0u8; 2];
        s.read_exact(&mut buf).unwrap();
        assert!(s.is_eos());
    }

    #[test]
    fn input_view_rejects_writes() {
        let mut s = InputStream::new(MemoryStream::from_vec(vec![1, 2]));
        assert!(!s.can_write());
        assert!(matches!(s.write_all(&[0]), Err(Error::NotWritable)));
        // Reads still pass through.
        let mut buf = [0u8; 2];
        s.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
    }

    #[test]
    fn output_view_rejects_reads() {
        let mut s = OutputStream::new(MemoryStream::new());
        assert!(!s.can_read());
        let mut buf = [0u8; 1];
        assert!(matches!(s.read_exact(&mut buf), Err(Error::NotReadable)));
        s.write_all(&[7]).unwrap();
        assert_eq!(s.into_inner().as_bytes(), &[7]);
    }
}
