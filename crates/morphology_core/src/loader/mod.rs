//! Artifact loader: path validation and format-dispatched decoding.
//!
//! # Responsibility
//! - Turn a caller path into the canonical reference persisted in a column.
//! - Decode a persisted reference into a mesh, array or unpickled object.
//!
//! # Invariants
//! - Every operation checks existence before any decode, so a missing file
//!   is always `NotFound`, never `Format`.
//! - Each call opens at most one file handle and drops it before returning.
//! - Loaders never create, modify or delete artifact files.
//!
//! # See also
//! - `crate::writer` for the producer-side encoders.

use crate::codec::CodecError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod decode;
mod observe;
mod reference;

pub use decode::{
    decompress_pickle, load_array, load_mesh, load_mesh_from_archive, load_opaque, load_pickle,
    DATA_KEY, FACES_KEY, VERTICES_KEY,
};
pub(crate) use decode::with_pickle_suffix;
pub use reference::{load_path, normalize_path, store};

pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Loader error taxonomy.
///
/// `NotFound` is usually recoverable by re-running the upstream stage that
/// writes the artifact; the other variants need manual intervention.
#[derive(Debug)]
pub enum ArtifactError {
    /// Referenced path does not exist.
    NotFound { path: PathBuf },
    /// File exists but expected datasets/keys are absent or malformed.
    Format { path: PathBuf, message: String },
    /// Suffix not recognized by the decode dispatcher.
    UnsupportedFormat {
        path: PathBuf,
        suffix: Option<String>,
    },
    /// File exists but could not be opened or read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Decoder for this container was not compiled in.
    Unavailable {
        path: PathBuf,
        feature: &'static str,
    },
}

impl ArtifactError {
    pub(crate) fn from_codec(path: impl Into<PathBuf>, err: CodecError) -> Self {
        let path = path.into();
        match err {
            CodecError::Io(source) => Self::Io { path, source },
            other => Self::Format {
                path,
                message: other.to_string(),
            },
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Path the failing operation was invoked on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound { path }
            | Self::Format { path, .. }
            | Self::UnsupportedFormat { path, .. }
            | Self::Io { path, .. }
            | Self::Unavailable { path, .. } => path,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True when re-producing the artifact upstream can fix the failure.
    pub fn is_recoverable(&self) -> bool {
        self.is_not_found()
    }

    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "artifact_not_found",
            Self::Format { .. } => "artifact_format",
            Self::UnsupportedFormat { .. } => "artifact_unsupported_format",
            Self::Io { .. } => "artifact_io",
            Self::Unavailable { .. } => "artifact_decoder_unavailable",
        }
    }
}

impl Display for ArtifactError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "artifact not found: {}", path.display()),
            Self::Format { path, message } => {
                write!(f, "malformed artifact `{}`: {message}", path.display())
            }
            Self::UnsupportedFormat { path, suffix } => match suffix {
                Some(suffix) => write!(
                    f,
                    "unsupported artifact format `.{suffix}`: {}",
                    path.display()
                ),
                None => write!(f, "artifact has no format suffix: {}", path.display()),
            },
            Self::Io { path, source } => {
                write!(f, "failed to read artifact `{}`: {source}", path.display())
            }
            Self::Unavailable { path, feature } => write!(
                f,
                "cannot decode `{}`: built without the `{feature}` feature",
                path.display()
            ),
        }
    }
}

impl Error for ArtifactError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ArtifactError;
    use crate::codec::CodecError;
    use std::path::PathBuf;

    #[test]
    fn codec_io_errors_stay_io_and_others_become_format() {
        let io = ArtifactError::from_codec(
            "/a.npz",
            CodecError::Io(std::io::Error::other("disk gone")),
        );
        assert!(matches!(io, ArtifactError::Io { .. }));

        let missing = ArtifactError::from_codec("/a.npz", CodecError::MissingEntry("data".into()));
        match missing {
            ArtifactError::Format { path, message } => {
                assert_eq!(path, PathBuf::from("/a.npz"));
                assert!(message.contains("`data`"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn only_not_found_is_recoverable() {
        let not_found = ArtifactError::NotFound {
            path: PathBuf::from("/x"),
        };
        let unsupported = ArtifactError::UnsupportedFormat {
            path: PathBuf::from("/x.txt"),
            suffix: Some("txt".to_string()),
        };
        assert!(not_found.is_recoverable());
        assert!(!unsupported.is_recoverable());
        assert_eq!(unsupported.to_string(), "unsupported artifact format `.txt`: /x.txt");
    }
}
