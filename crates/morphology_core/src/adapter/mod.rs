//! Attribute adapters between stored path references and in-memory artifacts.
//!
//! # Responsibility
//! - Give every storage location one `put`/`get` pair the host database layer
//!   calls symmetrically on insert and fetch.
//! - Keep format knowledge in `loader`; adapters only pick the operation.
//!
//! # Invariants
//! - `put` is `loader::store` for every adapter: the column always holds an
//!   absolute path to an existing file.
//! - `get` re-validates existence before decoding.

use crate::loader::{self, ArtifactResult};
use crate::model::artifact::ArtifactRef;
use std::path::Path;

mod decompression;
mod filepath;
mod mesh;
mod numpy;

pub use decompression::DecompressionAdapter;
pub use filepath::FilepathAdapter;
pub use mesh::{MeshAdapter, MeshArchiveAdapter};
pub use numpy::NumpyAdapter;

/// Attribute type prefix for path-backed external storage.
pub const FILEPATH_ATTRIBUTE_PREFIX: &str = "filepath@";

/// Builds the `filepath@<store>` attribute declaration for `store`.
pub fn filepath_attribute(store: &str) -> String {
    format!("{FILEPATH_ATTRIBUTE_PREFIX}{store}")
}

/// Bidirectional converter between a stored reference and an object.
pub trait AttributeAdapter {
    type Output;

    /// Storage declaration the adapter is attached to (`filepath@<store>`).
    fn attribute_type(&self) -> &str;

    /// Validates `path` and returns the reference to persist.
    fn put(&self, path: &Path) -> ArtifactResult<ArtifactRef> {
        loader::store(path)
    }

    /// Resolves a persisted reference into the adapter's output.
    fn get(&self, reference: &ArtifactRef) -> ArtifactResult<Self::Output>;
}
