//! Typed little-endian codec layer over the [`Stream`] contract.
//!
//! One named operation per shape: scalars via [`Decode`]/[`Encode`] impls and
//! the [`StreamExt`] shorthands, opaque spans via `read_buf`/`write_buf`, and
//! homogeneous sequences via `read_seq`/`write_seq`. Sequences carry no
//! length prefix on the wire; the element count always comes from the caller.

use std::rc::Rc;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::stream::Stream;

/// A value decodable from a stream at the current position.
pub trait Decode: Sized {
    fn decode<S: Stream + ?Sized>(stream: &mut S) -> Result<Self>;
}

/// A value encodable to a stream at the current position.
pub trait Encode {
    fn encode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()>;
}

macro_rules! impl_scalar_codec {
    ($($ty:ty),+) => {$(
        impl Decode for $ty {
            fn decode<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                stream.read_exact(&mut buf)?;
                Ok(<$ty>::from_le_bytes(buf))
            }
        }

        impl Encode for $ty {
            fn encode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
                stream.write_all(&self.to_le_bytes())
            }
        }
    )+};
}

impl_scalar_codec!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl Decode for bool {
    fn decode<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        Ok(u8::decode(stream)? != 0)
    }
}

impl Encode for bool {
    fn encode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        (*self as u8).encode(stream)
    }
}

// Ownership wrappers are a host-side choice only; they read and write
// zero bytes of their own.

impl<T: Decode> Decode for Box<T> {
    fn decode<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        Ok(Box::new(T::decode(stream)?))
    }
}

impl<T: Encode> Encode for Box<T> {
    fn encode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        (**self).encode(stream)
    }
}

impl<T: Decode> Decode for Rc<T> {
    fn decode<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        Ok(Rc::new(T::decode(stream)?))
    }
}

impl<T: Encode> Encode for Rc<T> {
    fn encode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        (**self).encode(stream)
    }
}

impl<T: Decode> Decode for Arc<T> {
    fn decode<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        Ok(Arc::new(T::decode(stream)?))
    }
}

impl<T: Encode> Encode for Arc<T> {
    fn encode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        (**self).encode(stream)
    }
}

/// Fixed-capacity string field occupying exactly `N` bytes on the wire.
///
/// Decoding reads all `N` bytes and truncates at the first NUL, except a NUL
/// sitting in the final byte, which is kept as content; a field with no NUL
/// yields the full declared length. Encoding writes the content followed by
/// zero padding up to `N`; over-long content is rejected at construction,
/// so the codec itself never pads or truncates a value it was handed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FixedString<const N: usize>(String);

impl<const N: usize> FixedString<N> {
    pub const CAPACITY: usize = N;

    pub fn new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.len() > N {
            return Err(Error::StringTooLong {
                len: s.len(),
                capacity: N,
            });
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl<const N: usize> std::fmt::Display for FixedString<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const N: usize> Decode for FixedString<N> {
    fn decode<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        let offset = stream.tell();
        let mut buf = vec![0u8; N];
        stream.read_exact(&mut buf)?;
        if let Some(nul) = buf.iter().position(|&b| b == 0) {
            if nul != N - 1 {
                buf.truncate(nul);
            }
        }
        let s = String::from_utf8(buf).map_err(|source| Error::InvalidString { offset, source })?;
        Ok(Self(s))
    }
}

impl<const N: usize> Encode for FixedString<N> {
    fn encode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        stream.write_all(self.0.as_bytes())?;
        let pad = N - self.0.len();
        if pad > 0 {
            stream.write_all(&vec![0u8; pad])?;
        }
        Ok(())
    }
}

/// 64-byte resource name field, the width used by every named record in the
/// container (materials, class lists, keyframes).
pub type CndName = FixedString<64>;

/// Named read/write shorthands on any stream.
pub trait StreamExt: Stream {
    fn read_u8(&mut self) -> Result<u8> {
        u8::decode(self)
    }

    fn read_u16(&mut self) -> Result<u16> {
        u16::decode(self)
    }

    fn read_u32(&mut self) -> Result<u32> {
        u32::decode(self)
    }

    fn read_u64(&mut self) -> Result<u64> {
        u64::decode(self)
    }

    fn read_i8(&mut self) -> Result<i8> {
        i8::decode(self)
    }

    fn read_i16(&mut self) -> Result<i16> {
        i16::decode(self)
    }

    fn read_i32(&mut self) -> Result<i32> {
        i32::decode(self)
    }

    fn read_i64(&mut self) -> Result<i64> {
        i64::decode(self)
    }

    fn read_f32(&mut self) -> Result<f32> {
        f32::decode(self)
    }

    fn read_f64(&mut self) -> Result<f64> {
        f64::decode(self)
    }

    fn write_u8(&mut self, v: u8) -> Result<()> {
        v.encode(self)
    }

    fn write_u16(&mut self, v: u16) -> Result<()> {
        v.encode(self)
    }

    fn write_u32(&mut self, v: u32) -> Result<()> {
        v.encode(self)
    }

    fn write_u64(&mut self, v: u64) -> Result<()> {
        v.encode(self)
    }

    fn write_i8(&mut self, v: i8) -> Result<()> {
        v.encode(self)
    }

    fn write_i16(&mut self, v: i16) -> Result<()> {
        v.encode(self)
    }

    fn write_i32(&mut self, v: i32) -> Result<()> {
        v.encode(self)
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        v.encode(self)
    }

    fn write_f32(&mut self, v: f32) -> Result<()> {
        v.encode(self)
    }

    fn write_f64(&mut self, v: f64) -> Result<()> {
        v.encode(self)
    }

    /// Read a 4-byte chunk tag.
    fn read_tag(&mut self) -> Result<[u8; 4]> {
        let mut tag = [0u8; 4];
        self.read_exact(&mut tag)?;
        Ok(tag)
    }

    fn write_tag(&mut self, tag: &[u8; 4]) -> Result<()> {
        self.write_all(tag)
    }

    /// Read an opaque span of `len` bytes.
    fn read_buf(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn write_buf(&mut self, buf: &[u8]) -> Result<()> {
        self.write_all(buf)
    }

    /// Read `count` elements by repeated single-element decode. The count is
    /// supplied by the caller; nothing is read from the wire for it.
    fn read_seq<T: Decode>(&mut self, count: usize) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(T::decode(self)?);
        }
        Ok(out)
    }

    fn write_seq<T: Encode>(&mut self, items: &[T]) -> Result<()> {
        for item in items {
            item.encode(self)?;
        }
        Ok(())
    }
}

impl<S: Stream + ?Sized> StreamExt for S {}
