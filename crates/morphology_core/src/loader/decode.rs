use super::observe::observe;
use super::reference::ensure_exists;
use super::{ArtifactError, ArtifactResult};
use crate::codec::{npy, npz, pickle};
use crate::model::array::NumericArray;
use crate::model::artifact::{ArtifactKind, OpaqueArtifact, SERIALIZED_OBJECT_SUFFIX};
use crate::model::mesh::TriangleMesh;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Archive member holding the payload of a compressed numeric artifact.
pub const DATA_KEY: &str = "data";
/// Dataset/member holding mesh vertex coordinates.
pub const VERTICES_KEY: &str = "vertices";
/// Dataset/member holding flattened mesh face indices.
pub const FACES_KEY: &str = "faces";

/// Loads a mesh from an HDF5 container with `vertices`/`faces` datasets.
///
/// Vertices are coerced to `f64` and faces to `u32` triples.
///
/// # Errors
/// - `NotFound` when `path` is missing.
/// - `Format` when either dataset is absent or has the wrong shape/dtype.
/// - `Unavailable` when built without the `hdf5` feature.
pub fn load_mesh(path: impl AsRef<Path>) -> ArtifactResult<TriangleMesh> {
    let path = path.as_ref();
    observe("load_mesh", ArtifactKind::Mesh.as_str(), path, || {
        ensure_exists(path)?;
        let (vertices, faces) = read_mesh_container(path)?;
        mesh_from_arrays(path, &vertices, &faces)
    })
}

/// Loads a mesh from an `.npz` archive with `vertices`/`faces` members.
///
/// Same result contract and coercion as [`load_mesh`].
pub fn load_mesh_from_archive(path: impl AsRef<Path>) -> ArtifactResult<TriangleMesh> {
    let path = path.as_ref();
    observe(
        "load_mesh_from_archive",
        ArtifactKind::MeshArchive.as_str(),
        path,
        || {
            ensure_exists(path)?;
            let reader = open(path)?;
            let mut arrays = npz::read_entries(reader, &[VERTICES_KEY, FACES_KEY])
                .map_err(|err| ArtifactError::from_codec(path, err))?;
            let faces = arrays.pop();
            let vertices = arrays.pop();
            match (vertices, faces) {
                (Some(vertices), Some(faces)) => mesh_from_arrays(path, &vertices, &faces),
                _ => Err(ArtifactError::Format {
                    path: path.to_path_buf(),
                    message: "archive returned fewer arrays than requested".to_string(),
                }),
            }
        },
    )
}

/// Decodes a compressed opaque artifact, dispatching on the path suffix.
///
/// - `.pbz2`: bzip2-decompress, then unpickle.
/// - `.npz`: extract member [`DATA_KEY`].
///
/// # Errors
/// - `NotFound` when `path` is missing (checked before the suffix).
/// - `UnsupportedFormat` for any other suffix.
/// - `Format` when the payload cannot be decoded.
pub fn load_opaque(path: impl AsRef<Path>) -> ArtifactResult<OpaqueArtifact> {
    let path = path.as_ref();
    let kind = ArtifactKind::from_path(path);
    let label = kind.map_or("unknown", ArtifactKind::as_str);
    observe("load_opaque", label, path, || {
        ensure_exists(path)?;
        match kind {
            Some(ArtifactKind::SerializedObject) => {
                let value = pickle::decode_value(open(path)?)
                    .map_err(|err| ArtifactError::from_codec(path, err))?;
                Ok(OpaqueArtifact::Object(value))
            }
            Some(ArtifactKind::NumericArchive) => {
                let array = npz::read_entry(open(path)?, DATA_KEY)
                    .map_err(|err| ArtifactError::from_codec(path, err))?;
                Ok(OpaqueArtifact::Array(array))
            }
            _ => Err(unsupported(path)),
        }
    })
}

/// Loads a single `.npy` array.
pub fn load_array(path: impl AsRef<Path>) -> ArtifactResult<NumericArray> {
    let path = path.as_ref();
    observe("load_array", ArtifactKind::NumericArray.as_str(), path, || {
        ensure_exists(path)?;
        if ArtifactKind::from_path(path) != Some(ArtifactKind::NumericArray) {
            return Err(unsupported(path));
        }
        npy::read_from(open(path)?).map_err(|err| ArtifactError::from_codec(path, err))
    })
}

/// Decompresses a `.pbz2` pickle into a dynamic value.
///
/// `.pbz2` is appended when `path` carries another suffix or none, so
/// `decompress_pickle("skeleton")` reads `skeleton.pbz2`.
pub fn decompress_pickle(path: impl AsRef<Path>) -> ArtifactResult<serde_pickle::Value> {
    load_pickle(path)
}

/// Decompresses a `.pbz2` pickle into `T`, with the suffix rule of
/// [`decompress_pickle`].
pub fn load_pickle<T: DeserializeOwned>(path: impl AsRef<Path>) -> ArtifactResult<T> {
    let path = with_pickle_suffix(path.as_ref());
    observe(
        "load_pickle",
        ArtifactKind::SerializedObject.as_str(),
        &path,
        || {
            ensure_exists(&path)?;
            pickle::decode(open(&path)?).map_err(|err| ArtifactError::from_codec(&path, err))
        },
    )
}

pub(crate) fn with_pickle_suffix(path: &Path) -> PathBuf {
    if ArtifactKind::from_path(path) == Some(ArtifactKind::SerializedObject) {
        return path.to_path_buf();
    }
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(SERIALIZED_OBJECT_SUFFIX);
    PathBuf::from(raw)
}

fn open(path: &Path) -> ArtifactResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ArtifactError::io(path, source))
}

fn unsupported(path: &Path) -> ArtifactError {
    ArtifactError::UnsupportedFormat {
        path: path.to_path_buf(),
        suffix: path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned()),
    }
}

fn mesh_from_arrays(
    path: &Path,
    vertices: &NumericArray,
    faces: &NumericArray,
) -> ArtifactResult<TriangleMesh> {
    TriangleMesh::from_arrays(vertices, faces).map_err(|err| ArtifactError::Format {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(feature = "hdf5")]
fn read_mesh_container(path: &Path) -> ArtifactResult<(NumericArray, NumericArray)> {
    crate::codec::h5::read_mesh_datasets(path).map_err(|err| ArtifactError::from_codec(path, err))
}

#[cfg(not(feature = "hdf5"))]
fn read_mesh_container(path: &Path) -> ArtifactResult<(NumericArray, NumericArray)> {
    Err(ArtifactError::Unavailable {
        path: path.to_path_buf(),
        feature: "hdf5",
    })
}

#[cfg(test)]
mod tests {
    use super::with_pickle_suffix;
    use std::path::{Path, PathBuf};

    #[test]
    fn pickle_suffix_is_appended_only_when_absent() {
        assert_eq!(
            with_pickle_suffix(Path::new("/s/skeleton")),
            PathBuf::from("/s/skeleton.pbz2")
        );
        assert_eq!(
            with_pickle_suffix(Path::new("/s/skeleton.pbz2")),
            PathBuf::from("/s/skeleton.pbz2")
        );
        assert_eq!(
            with_pickle_suffix(Path::new("/s/864691.v2")),
            PathBuf::from("/s/864691.v2.pbz2")
        );
    }
}
