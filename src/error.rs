use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("out of bounds at offset {offset:#x}: need {need} bytes, have {have}")]
    Bounds { offset: u64, need: usize, have: usize },

    #[error("truncated value at offset {offset:#x}: transferred {transferred} of {expected} bytes")]
    Truncated {
        offset: u64,
        expected: usize,
        transferred: usize,
    },

    #[error("short write at offset {offset:#x}: sink accepted {written} of {expected} bytes")]
    ShortWrite {
        offset: u64,
        expected: usize,
        written: usize,
    },

    #[error("read attempted on a non-readable stream")]
    NotReadable,

    #[error("write attempted on a non-writable stream")]
    NotWritable,

    #[error("{section} section invalid at offset {offset:#x}: {message}")]
    SectionDecode {
        section: &'static str,
        offset: u64,
        message: String,
    },

    #[error("string at offset {offset:#x} is not valid UTF-8")]
    InvalidString {
        offset: u64,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("string of {len} bytes exceeds fixed capacity of {capacity}")]
    StringTooLong { len: usize, capacity: usize },

    #[error("invalid magic: expected {expected:?}, found {found:?}")]
    InvalidMagic { expected: [u8; 4], found: [u8; 4] },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// A decode error for the named section at the given byte offset.
    pub(crate) fn section(section: &'static str, offset: u64, message: impl Into<String>) -> Self {
        Error::SectionDecode {
            section,
            offset,
            message: message.into(),
        }
    }

    /// Attribute a lower-level failure to the section whose parse it aborted.
    /// An error that already names a section keeps its original identity.
    pub(crate) fn into_section(self, section: &'static str, offset: u64) -> Self {
        match self {
            e @ Error::SectionDecode { .. } => e,
            e => Error::SectionDecode {
                section,
                offset,
                message: e.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
