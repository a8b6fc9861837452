use super::AttributeAdapter;
use crate::loader::{self, ArtifactResult};
use crate::model::artifact::ArtifactRef;
use std::path::PathBuf;

/// Hands the stored path back undecoded, for callers that decode later
/// (decompositions, graphs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilepathAdapter {
    attribute_type: String,
}

impl FilepathAdapter {
    pub fn new(attribute_type: impl Into<String>) -> Self {
        Self {
            attribute_type: attribute_type.into(),
        }
    }
}

impl AttributeAdapter for FilepathAdapter {
    type Output = PathBuf;

    fn attribute_type(&self) -> &str {
        &self.attribute_type
    }

    fn get(&self, reference: &ArtifactRef) -> ArtifactResult<PathBuf> {
        loader::load_path(reference)
    }
}
