//! Byte-level codecs for the artifact file formats.
//!
//! # Responsibility
//! - Decode `.npy`, `.npz`, `.pbz2` and (feature `hdf5`) HDF5 payloads from
//!   readers into model types.
//! - Provide matching encoders for producers and fixtures.
//!
//! # Invariants
//! - Codecs know nothing about paths or existence checks; the loader owns
//!   those and maps `CodecError` into path-aware errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[cfg(feature = "hdf5")]
pub mod h5;
pub mod npy;
pub mod npz;
pub mod pickle;

pub type CodecResult<T> = Result<T, CodecError>;

/// Decode/encode failure independent of the originating path.
#[derive(Debug)]
pub enum CodecError {
    /// Underlying read/write failed.
    Io(std::io::Error),
    /// Container opened but a named member/dataset is absent.
    MissingEntry(String),
    /// Payload does not follow the expected layout.
    Malformed(String),
    /// Zip container could not be read or written.
    Archive(zip::result::ZipError),
    /// Pickle stream could not be (de)serialized.
    Pickle(serde_pickle::Error),
}

impl CodecError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::MissingEntry(name) => write!(f, "missing entry `{name}`"),
            Self::Malformed(message) => write!(f, "{message}"),
            Self::Archive(err) => write!(f, "invalid archive: {err}"),
            Self::Pickle(err) => write!(f, "invalid pickle stream: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Archive(err) => Some(err),
            Self::Pickle(err) => Some(err),
            Self::MissingEntry(_) | Self::Malformed(_) => None,
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<zip::result::ZipError> for CodecError {
    fn from(value: zip::result::ZipError) -> Self {
        Self::Archive(value)
    }
}

impl From<serde_pickle::Error> for CodecError {
    fn from(value: serde_pickle::Error) -> Self {
        Self::Pickle(value)
    }
}
