use super::AttributeAdapter;
use crate::loader::{self, ArtifactResult};
use crate::model::artifact::ArtifactRef;
use crate::model::mesh::TriangleMesh;

/// Decodes HDF5 mesh containers (`vertices`/`faces` datasets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshAdapter {
    attribute_type: String,
}

impl MeshAdapter {
    pub fn new(attribute_type: impl Into<String>) -> Self {
        Self {
            attribute_type: attribute_type.into(),
        }
    }
}

impl AttributeAdapter for MeshAdapter {
    type Output = TriangleMesh;

    fn attribute_type(&self) -> &str {
        &self.attribute_type
    }

    fn get(&self, reference: &ArtifactRef) -> ArtifactResult<TriangleMesh> {
        loader::load_mesh(reference)
    }
}

/// Decodes `.npz` mesh archives (`vertices`/`faces` members).
///
/// Same output contract as [`MeshAdapter`]; the two differ only in the
/// container the producer wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshArchiveAdapter {
    attribute_type: String,
}

impl MeshArchiveAdapter {
    pub fn new(attribute_type: impl Into<String>) -> Self {
        Self {
            attribute_type: attribute_type.into(),
        }
    }
}

impl AttributeAdapter for MeshArchiveAdapter {
    type Output = TriangleMesh;

    fn attribute_type(&self) -> &str {
        &self.attribute_type
    }

    fn get(&self, reference: &ArtifactRef) -> ArtifactResult<TriangleMesh> {
        loader::load_mesh_from_archive(reference)
    }
}
