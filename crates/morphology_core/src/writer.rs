//! Producer-side encoders for the formats the loader reads.
//!
//! Upstream pipeline stages write artifacts before a reference is stored;
//! these helpers produce files the decoders accept byte-for-byte. Loaders and
//! adapters never call into this module.

use crate::codec::{npy, npz, pickle};
use crate::loader::{ArtifactError, ArtifactResult, DATA_KEY, FACES_KEY, VERTICES_KEY};
use crate::model::array::NumericArray;
use crate::model::mesh::TriangleMesh;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Pickles and bzip2-compresses `value` to `path` (suffix `.pbz2` appended
/// when missing). Returns the path written.
pub fn compress_pickle<T: Serialize>(value: &T, path: impl AsRef<Path>) -> ArtifactResult<PathBuf> {
    let path = crate::loader::with_pickle_suffix(path.as_ref());
    let writer = create(&path)?;
    let mut writer =
        pickle::encode(writer, value).map_err(|err| ArtifactError::from_codec(&path, err))?;
    writer
        .flush()
        .map_err(|source| ArtifactError::io(&path, source))?;
    Ok(path)
}

/// Writes `entries` as an `.npz` archive.
pub fn write_npz(
    path: impl AsRef<Path>,
    entries: &[(&str, &NumericArray)],
    compress: bool,
) -> ArtifactResult<()> {
    let path = path.as_ref();
    let writer = create(path)?;
    let mut writer = npz::write_archive(writer, entries, compress)
        .map_err(|err| ArtifactError::from_codec(path, err))?;
    writer
        .flush()
        .map_err(|source| ArtifactError::io(path, source))
}

/// Writes `array` under [`DATA_KEY`], the layout `load_opaque` expects.
pub fn write_data_archive(path: impl AsRef<Path>, array: &NumericArray) -> ArtifactResult<()> {
    write_npz(path, &[(DATA_KEY, array)], true)
}

/// Writes `mesh` as an `.npz` with `vertices` (N x 3 `f64`) and `faces`
/// (M x 3 `u32`) members.
pub fn write_mesh_archive(path: impl AsRef<Path>, mesh: &TriangleMesh) -> ArtifactResult<()> {
    let path = path.as_ref();
    let vertices = NumericArray::new(
        vec![mesh.vertex_count(), 3],
        mesh.vertices().iter().flatten().copied().collect::<Vec<f64>>(),
    )
    .map_err(|err| format_error(path, err))?;
    let faces = NumericArray::new(
        vec![mesh.face_count(), 3],
        mesh.faces().iter().flatten().copied().collect::<Vec<u32>>(),
    )
    .map_err(|err| format_error(path, err))?;
    write_npz(path, &[(VERTICES_KEY, &vertices), (FACES_KEY, &faces)], true)
}

/// Writes `mesh` as an HDF5 container, the layout `load_mesh` expects.
#[cfg(feature = "hdf5")]
pub fn write_mesh_container(path: impl AsRef<Path>, mesh: &TriangleMesh) -> ArtifactResult<()> {
    let path = path.as_ref();
    let vertices = mesh.vertices().iter().flatten().copied().collect::<Vec<f64>>();
    let faces = mesh.faces().iter().flatten().copied().collect::<Vec<u32>>();
    crate::codec::h5::write_mesh_datasets(path, &vertices, &faces)
        .map_err(|err| ArtifactError::from_codec(path, err))
}

/// Writes a single `.npy` array.
pub fn write_npy(path: impl AsRef<Path>, array: &NumericArray) -> ArtifactResult<()> {
    let path = path.as_ref();
    npy::write_to(create(path)?, array).map_err(|err| ArtifactError::from_codec(path, err))
}

fn create(path: &Path) -> ArtifactResult<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ArtifactError::io(path, source))
}

fn format_error(path: &Path, err: impl std::fmt::Display) -> ArtifactError {
    ArtifactError::Format {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
