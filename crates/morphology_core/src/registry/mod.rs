//! Storage-location to adapter registry.
//!
//! # Responsibility
//! - Map each named storage location to exactly one adapter.
//! - Dispatch `put`/`get` for a location without the caller naming the
//!   adapter type.
//!
//! # Invariants
//! - Registries are immutable once built; share them by reference.
//! - Location and store names are non-empty `[a-z0-9_]` identifiers.
//! - A location is bound at most once.
//!
//! # See also
//! - `presets` for the schema configurations shipped with the crate.
//! - `config` for JSON-declared registries.

use crate::adapter::{
    filepath_attribute, AttributeAdapter, DecompressionAdapter, FilepathAdapter, MeshAdapter,
    MeshArchiveAdapter, NumpyAdapter,
};
use crate::loader::ArtifactError;
use crate::model::artifact::{ArtifactRef, LoadedArtifact};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub mod config;
pub mod presets;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Adapter selector used in presets and configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    Mesh,
    MeshArchive,
    Decompression,
    Filepath,
    Numpy,
}

impl AdapterKind {
    pub const ALL: [AdapterKind; 5] = [
        Self::Mesh,
        Self::MeshArchive,
        Self::Decompression,
        Self::Filepath,
        Self::Numpy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mesh => "mesh",
            Self::MeshArchive => "mesh_archive",
            Self::Decompression => "decompression",
            Self::Filepath => "filepath",
            Self::Numpy => "numpy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
    }
}

impl Display for AdapterKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One adapter bound to a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundAdapter {
    Mesh(MeshAdapter),
    MeshArchive(MeshArchiveAdapter),
    Decompression(DecompressionAdapter),
    Filepath(FilepathAdapter),
    Numpy(NumpyAdapter),
}

impl BoundAdapter {
    /// Builds the adapter for `kind` attached to `filepath@<store>`.
    pub fn new(kind: AdapterKind, store: &str) -> Self {
        let attribute_type = filepath_attribute(store);
        match kind {
            AdapterKind::Mesh => Self::Mesh(MeshAdapter::new(attribute_type)),
            AdapterKind::MeshArchive => Self::MeshArchive(MeshArchiveAdapter::new(attribute_type)),
            AdapterKind::Decompression => {
                Self::Decompression(DecompressionAdapter::new(attribute_type))
            }
            AdapterKind::Filepath => Self::Filepath(FilepathAdapter::new(attribute_type)),
            AdapterKind::Numpy => Self::Numpy(NumpyAdapter::new(attribute_type)),
        }
    }

    pub fn kind(&self) -> AdapterKind {
        match self {
            Self::Mesh(_) => AdapterKind::Mesh,
            Self::MeshArchive(_) => AdapterKind::MeshArchive,
            Self::Decompression(_) => AdapterKind::Decompression,
            Self::Filepath(_) => AdapterKind::Filepath,
            Self::Numpy(_) => AdapterKind::Numpy,
        }
    }

    pub fn attribute_type(&self) -> &str {
        match self {
            Self::Mesh(adapter) => adapter.attribute_type(),
            Self::MeshArchive(adapter) => adapter.attribute_type(),
            Self::Decompression(adapter) => adapter.attribute_type(),
            Self::Filepath(adapter) => adapter.attribute_type(),
            Self::Numpy(adapter) => adapter.attribute_type(),
        }
    }

    /// Store name behind the `filepath@` prefix.
    pub fn store(&self) -> &str {
        let attribute_type = self.attribute_type();
        attribute_type
            .strip_prefix(crate::adapter::FILEPATH_ATTRIBUTE_PREFIX)
            .unwrap_or(attribute_type)
    }

    pub fn put(&self, path: &Path) -> Result<ArtifactRef, ArtifactError> {
        match self {
            Self::Mesh(adapter) => adapter.put(path),
            Self::MeshArchive(adapter) => adapter.put(path),
            Self::Decompression(adapter) => adapter.put(path),
            Self::Filepath(adapter) => adapter.put(path),
            Self::Numpy(adapter) => adapter.put(path),
        }
    }

    pub fn get(&self, reference: &ArtifactRef) -> Result<LoadedArtifact, ArtifactError> {
        Ok(match self {
            Self::Mesh(adapter) => LoadedArtifact::Mesh(adapter.get(reference)?),
            Self::MeshArchive(adapter) => LoadedArtifact::Mesh(adapter.get(reference)?),
            Self::Decompression(adapter) => LoadedArtifact::Opaque(adapter.get(reference)?),
            Self::Filepath(adapter) => LoadedArtifact::Path(adapter.get(reference)?),
            Self::Numpy(adapter) => LoadedArtifact::Array(adapter.get(reference)?),
        })
    }
}

/// Immutable location to adapter mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterRegistry {
    adapters: BTreeMap<String, BoundAdapter>,
}

impl AdapterRegistry {
    pub fn builder() -> AdapterRegistryBuilder {
        AdapterRegistryBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Returns sorted location names.
    pub fn locations(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }

    /// Returns the adapter bound to `location`.
    pub fn adapter(&self, location: &str) -> Option<&BoundAdapter> {
        self.adapters.get(location.trim())
    }

    pub fn adapter_kind(&self, location: &str) -> Option<AdapterKind> {
        self.adapter(location).map(BoundAdapter::kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundAdapter)> {
        self.adapters
            .iter()
            .map(|(location, adapter)| (location.as_str(), adapter))
    }

    /// Validates `path` through the adapter bound to `location`.
    pub fn put(&self, location: &str, path: impl AsRef<Path>) -> RegistryResult<ArtifactRef> {
        Ok(self.require(location)?.put(path.as_ref())?)
    }

    /// Loads `reference` through the adapter bound to `location`.
    pub fn get(&self, location: &str, reference: &ArtifactRef) -> RegistryResult<LoadedArtifact> {
        Ok(self.require(location)?.get(reference)?)
    }

    fn require(&self, location: &str) -> RegistryResult<&BoundAdapter> {
        self.adapter(location)
            .ok_or_else(|| RegistryError::UnknownLocation(location.trim().to_string()))
    }
}

/// Collects bindings, rejecting invalid or duplicate locations.
#[derive(Debug, Default)]
pub struct AdapterRegistryBuilder {
    adapters: BTreeMap<String, BoundAdapter>,
}

impl AdapterRegistryBuilder {
    /// Binds `location` to `kind`, storing under a store of the same name.
    pub fn bind(self, location: &str, kind: AdapterKind) -> RegistryResult<Self> {
        let store = location.trim().to_string();
        self.bind_store(location, kind, &store)
    }

    /// Binds `location` to `kind` attached to `filepath@<store>`.
    pub fn bind_store(
        mut self,
        location: &str,
        kind: AdapterKind,
        store: &str,
    ) -> RegistryResult<Self> {
        let location = location.trim().to_string();
        if !is_valid_name(&location) {
            return Err(RegistryError::InvalidLocation(location));
        }
        let store = store.trim();
        if !is_valid_name(store) {
            return Err(RegistryError::InvalidStore(store.to_string()));
        }
        if self.adapters.contains_key(location.as_str()) {
            return Err(RegistryError::DuplicateLocation(location));
        }

        self.adapters.insert(location, BoundAdapter::new(kind, store));
        Ok(self)
    }

    pub fn build(self) -> AdapterRegistry {
        AdapterRegistry {
            adapters: self.adapters,
        }
    }
}

fn is_valid_name(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Registry construction and dispatch errors.
#[derive(Debug)]
pub enum RegistryError {
    InvalidLocation(String),
    InvalidStore(String),
    DuplicateLocation(String),
    UnknownLocation(String),
    UnknownPreset(String),
    /// Configuration file could not be read.
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Configuration JSON is malformed or names an unknown adapter.
    Config(serde_json::Error),
    /// The bound adapter failed to store or load.
    Artifact(ArtifactError),
}

impl RegistryError {
    /// Loader error behind an adapter failure, if any.
    pub fn artifact_error(&self) -> Option<&ArtifactError> {
        match self {
            Self::Artifact(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLocation(value) => write!(f, "location name is invalid: {value:?}"),
            Self::InvalidStore(value) => write!(f, "store name is invalid: {value:?}"),
            Self::DuplicateLocation(value) => write!(f, "location already bound: {value}"),
            Self::UnknownLocation(value) => write!(f, "location not registered: {value}"),
            Self::UnknownPreset(value) => write!(f, "preset not found: {value}"),
            Self::ConfigIo { path, source } => {
                write!(f, "cannot read registry config {}: {source}", path.display())
            }
            Self::Config(err) => write!(f, "invalid registry config: {err}"),
            Self::Artifact(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ConfigIo { source, .. } => Some(source),
            Self::Config(err) => Some(err),
            Self::Artifact(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ArtifactError> for RegistryError {
    fn from(value: ArtifactError) -> Self {
        Self::Artifact(value)
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value)
    }
}
