use super::AttributeAdapter;
use crate::loader::{self, ArtifactResult};
use crate::model::array::NumericArray;
use crate::model::artifact::ArtifactRef;

/// Loads single `.npy` arrays (skeleton vertex/edge tables).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumpyAdapter {
    attribute_type: String,
}

impl NumpyAdapter {
    pub fn new(attribute_type: impl Into<String>) -> Self {
        Self {
            attribute_type: attribute_type.into(),
        }
    }
}

impl AttributeAdapter for NumpyAdapter {
    type Output = NumericArray;

    fn attribute_type(&self) -> &str {
        &self.attribute_type
    }

    fn get(&self, reference: &ArtifactRef) -> ArtifactResult<NumericArray> {
        loader::load_array(reference)
    }
}
