use super::AttributeAdapter;
use crate::loader::{self, ArtifactResult};
use crate::model::artifact::{ArtifactRef, OpaqueArtifact};

/// Decompresses `.pbz2` pickles and `.npz` `data` archives behind one
/// column type; the suffix picks the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompressionAdapter {
    attribute_type: String,
}

impl DecompressionAdapter {
    pub fn new(attribute_type: impl Into<String>) -> Self {
        Self {
            attribute_type: attribute_type.into(),
        }
    }
}

impl AttributeAdapter for DecompressionAdapter {
    type Output = OpaqueArtifact;

    fn attribute_type(&self) -> &str {
        &self.attribute_type
    }

    fn get(&self, reference: &ArtifactRef) -> ArtifactResult<OpaqueArtifact> {
        loader::load_opaque(reference)
    }
}
