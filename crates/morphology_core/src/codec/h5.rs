//! HDF5 mesh container codec (cargo feature `hdf5`).
//!
//! Mesh containers hold two root datasets: `vertices` (N x 3, any float or
//! integer type) and `faces` (flat or M x 3 integer indices).

use crate::codec::{CodecError, CodecResult};
use crate::model::array::{ArrayData, NumericArray};
use hdf5::types::TypeDescriptor;
use hdf5::{File, Group, H5Type};
use std::path::Path;

pub const VERTICES_DATASET: &str = "vertices";
pub const FACES_DATASET: &str = "faces";

/// Reads the `vertices` and `faces` datasets of a mesh container.
pub fn read_mesh_datasets(path: &Path) -> CodecResult<(NumericArray, NumericArray)> {
    let file = File::open(path).map_err(container_error)?;
    let vertices = read_dataset(&file, VERTICES_DATASET)?;
    let faces = read_dataset(&file, FACES_DATASET)?;
    Ok((vertices, faces))
}

/// Reads one dataset, widened to `f64`, `i64` or `u64` by its stored class.
pub fn read_dataset(group: &Group, name: &str) -> CodecResult<NumericArray> {
    if !group.link_exists(name) {
        return Err(CodecError::MissingEntry(name.to_string()));
    }
    let dataset = group.dataset(name).map_err(container_error)?;
    let shape = dataset.shape();
    let descriptor = dataset
        .dtype()
        .and_then(|dtype| dtype.to_descriptor())
        .map_err(container_error)?;

    let data: ArrayData = match descriptor {
        TypeDescriptor::Float(_) => dataset.read_raw::<f64>().map_err(container_error)?.into(),
        TypeDescriptor::Integer(_) => dataset.read_raw::<i64>().map_err(container_error)?.into(),
        TypeDescriptor::Unsigned(_) => dataset.read_raw::<u64>().map_err(container_error)?.into(),
        other => {
            return Err(CodecError::malformed(format!(
                "dataset `{name}` has unsupported type {other:?}"
            )))
        }
    };
    NumericArray::new(shape, data).map_err(|err| CodecError::malformed(err.to_string()))
}

/// Writes a mesh container; `vertices` is the flattened N x 3 buffer.
pub fn write_mesh_datasets<V: H5Type, F: H5Type>(
    path: &Path,
    vertices: &[V],
    faces: &[F],
) -> CodecResult<()> {
    let file = File::create(path).map_err(container_error)?;
    file.new_dataset::<V>()
        .shape((vertices.len() / 3, 3))
        .create(VERTICES_DATASET)
        .and_then(|dataset| dataset.write_raw(vertices))
        .map_err(container_error)?;
    file.new_dataset::<F>()
        .shape(faces.len())
        .create(FACES_DATASET)
        .and_then(|dataset| dataset.write_raw(faces))
        .map_err(container_error)?;
    Ok(())
}

fn container_error(err: hdf5::Error) -> CodecError {
    CodecError::malformed(format!("hdf5: {err}"))
}

#[cfg(test)]
mod tests {
    use super::{read_dataset, read_mesh_datasets, write_mesh_datasets};
    use crate::codec::CodecError;
    use crate::model::array::DType;

    #[test]
    fn reads_back_written_datasets_with_widened_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.h5");
        write_mesh_datasets(&path, &[0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[0i32, 1, 2])
            .unwrap();

        let (vertices, faces) = read_mesh_datasets(&path).unwrap();
        assert_eq!(vertices.shape(), &[3, 3]);
        assert_eq!(vertices.dtype(), DType::F64);
        assert_eq!(faces.dtype(), DType::I64);
        assert_eq!(faces.len(), 3);
    }

    #[test]
    fn missing_dataset_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.h5");
        let file = hdf5::File::create(&path).unwrap();

        let err = read_dataset(&file, "faces").unwrap_err();
        assert!(matches!(err, CodecError::MissingEntry(name) if name == "faces"));
    }
}
