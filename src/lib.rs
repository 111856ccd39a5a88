//! Reader/writer for the Sith engine's compiled CND world container.
//!
//! Three-layer architecture:
//! - **Layer 1** (`stream`): the byte-stream contract. A seekable cursor
//!   with capability flags, in-memory and file backings, and read-only /
//!   write-only views
//! - **Layer 2** (`codec`): typed little-endian primitives, fixed-capacity
//!   strings, opaque buffers and externally-counted sequences
//! - **Layer 3** (`header`/`sections`/`world`): the container itself. A
//!   fixed 1568-byte header whose size/count fields locate a dozen
//!   variable-length sections, each with a paired parse/write codec
//!
//! Parsing a well-formed container and writing it back reproduces the
//! original bytes; all section offsets derive from the header alone.
//!
//! The `wav` module is an independent RIFF/WAV codec over the same stream
//! contract, with no coupling to the container format.

pub mod codec;
pub mod error;
pub mod header;
pub mod math;
pub mod sections;
pub mod stream;
pub mod wav;
pub mod world;

pub use codec::{CndName, Decode, Encode, FixedString, StreamExt};
pub use error::{Error, Result};
pub use header::{CndHeader, HEADER_SIZE};
pub use stream::{FileStream, InputStream, MemoryStream, OutputStream, Stream};
pub use world::CndWorld;
