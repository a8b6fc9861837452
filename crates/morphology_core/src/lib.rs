//! Path-referenced storage adapters for large scientific artifacts.
//! Database columns hold file paths; adapters turn them into meshes,
//! arrays and unpickled objects on fetch.

pub mod adapter;
pub mod codec;
pub mod loader;
pub mod logging;
pub mod model;
pub mod registry;
pub mod writer;

pub use adapter::{
    AttributeAdapter, DecompressionAdapter, FilepathAdapter, MeshAdapter, MeshArchiveAdapter,
    NumpyAdapter,
};
pub use loader::{
    load_array, load_mesh, load_mesh_from_archive, load_opaque, load_path, store, ArtifactError,
    ArtifactResult,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::array::{ArrayData, DType, NumericArray};
pub use model::artifact::{ArtifactKind, ArtifactRef, LoadedArtifact, OpaqueArtifact};
pub use model::mesh::TriangleMesh;
pub use registry::config::RegistryConfig;
pub use registry::{AdapterKind, AdapterRegistry, BoundAdapter, RegistryError, RegistryResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Whether HDF5 mesh containers can be decoded by this build.
pub fn hdf5_enabled() -> bool {
    cfg!(feature = "hdf5")
}
