//! Artifact references and kinds.
//!
//! # Responsibility
//! - Represent the persisted path reference stored in database columns.
//! - Resolve the decode strategy of a file once, from its suffix.
//!
//! # Invariants
//! - An `ArtifactRef` produced by `loader::store` is absolute and lexically
//!   normalized.
//! - Unknown suffixes resolve to `None`, never to a default kind.

use crate::model::array::NumericArray;
use crate::model::mesh::TriangleMesh;
use std::ffi::OsStr;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Suffix of bzip2-compressed pickle streams.
pub const SERIALIZED_OBJECT_SUFFIX: &str = "pbz2";
/// Suffix of zip archives of `.npy` members.
pub const NUMERIC_ARCHIVE_SUFFIX: &str = "npz";
/// Suffix of single NumPy arrays.
pub const NUMERIC_ARRAY_SUFFIX: &str = "npy";
/// Suffixes of HDF5 mesh containers.
pub const MESH_CONTAINER_SUFFIXES: &[&str] = &["h5", "hdf5"];

/// Absolute filesystem path persisted in place of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactRef(PathBuf);

impl ArtifactRef {
    /// Wraps a path previously produced by `store` and read back from storage.
    ///
    /// No normalization or existence check happens here; loaders re-check
    /// existence before decoding.
    pub fn from_stored(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// File suffix without the dot, case preserved.
    pub fn suffix(&self) -> Option<String> {
        path_suffix(&self.0)
    }

    /// Kind implied by the suffix, if recognized.
    pub fn kind(&self) -> Option<ArtifactKind> {
        ArtifactKind::from_path(&self.0)
    }
}

impl AsRef<Path> for ArtifactRef {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for ArtifactRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Decode strategy of a persisted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// HDF5 container with `vertices`/`faces` datasets.
    Mesh,
    /// `.npz` archive with `vertices`/`faces` members.
    MeshArchive,
    /// bzip2-compressed pickle stream (`.pbz2`).
    SerializedObject,
    /// `.npz` archive with a `data` member.
    NumericArchive,
    /// Single `.npy` array.
    NumericArray,
    /// Reference passed through undecoded.
    RawPath,
}

impl ArtifactKind {
    /// Resolves a kind from a bare suffix (`"npz"`, `".pbz2"`, ...).
    ///
    /// Matching is case-sensitive: `.NPZ` is not `.npz`, the same as the
    /// producers that write these files. `.npz` resolves to `NumericArchive`;
    /// `MeshArchive` and `RawPath` are only ever chosen by an adapter, never
    /// inferred.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.trim().trim_start_matches('.') {
            SERIALIZED_OBJECT_SUFFIX => Some(Self::SerializedObject),
            NUMERIC_ARCHIVE_SUFFIX => Some(Self::NumericArchive),
            NUMERIC_ARRAY_SUFFIX => Some(Self::NumericArray),
            other if MESH_CONTAINER_SUFFIXES.contains(&other) => Some(Self::Mesh),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path_suffix(path).and_then(|suffix| Self::from_suffix(&suffix))
    }

    /// Stable name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mesh => "mesh",
            Self::MeshArchive => "mesh_archive",
            Self::SerializedObject => "serialized_object",
            Self::NumericArchive => "numeric_archive",
            Self::NumericArray => "numeric_array",
            Self::RawPath => "raw_path",
        }
    }
}

impl Display for ArtifactKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object recovered by the decompression dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum OpaqueArtifact {
    /// Unpickled value from a `.pbz2` stream.
    Object(serde_pickle::Value),
    /// Member `data` of an `.npz` archive.
    Array(NumericArray),
}

impl OpaqueArtifact {
    pub fn as_object(&self) -> Option<&serde_pickle::Value> {
        match self {
            Self::Object(value) => Some(value),
            Self::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&NumericArray> {
        match self {
            Self::Array(array) => Some(array),
            Self::Object(_) => None,
        }
    }
}

/// Result of fetching an artifact through an adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedArtifact {
    Mesh(TriangleMesh),
    Opaque(OpaqueArtifact),
    Array(NumericArray),
    Path(PathBuf),
}

impl Display for LoadedArtifact {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mesh(mesh) => write!(
                f,
                "mesh vertices={} faces={}",
                mesh.vertex_count(),
                mesh.face_count()
            ),
            Self::Opaque(OpaqueArtifact::Object(value)) => {
                write!(f, "object type={}", pickle_type_name(value))
            }
            Self::Opaque(OpaqueArtifact::Array(array)) | Self::Array(array) => {
                write!(f, "array dtype={} shape={:?}", array.dtype(), array.shape())
            }
            Self::Path(path) => write!(f, "path {}", path.display()),
        }
    }
}

fn pickle_type_name(value: &serde_pickle::Value) -> &'static str {
    use serde_pickle::Value;
    match value {
        Value::None => "none",
        Value::Bool(_) => "bool",
        Value::I64(_) | Value::Int(_) => "int",
        Value::F64(_) => "float",
        Value::Bytes(_) => "bytes",
        Value::String(_) => "str",
        Value::List(_) => "list",
        Value::Tuple(_) => "tuple",
        Value::Set(_) => "set",
        Value::FrozenSet(_) => "frozenset",
        Value::Dict(_) => "dict",
    }
}

fn path_suffix(path: &Path) -> Option<String> {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_string)
}
