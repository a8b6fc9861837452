//! JSON-declared registries.
//!
//! ```json
//! { "locations": { "h01_meshes": { "adapter": "mesh" },
//!                  "graphs": { "adapter": "filepath", "store": "h01_graph" } } }
//! ```

use super::{AdapterKind, AdapterRegistry, RegistryError, RegistryResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Serialized registry declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    pub locations: BTreeMap<String, LocationConfig>,
}

/// One location entry; `store` defaults to the location name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationConfig {
    pub adapter: AdapterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

impl RegistryConfig {
    pub fn from_json_str(input: &str) -> RegistryResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| RegistryError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&input)
    }

    /// Snapshot of an existing registry, omitting stores equal to the
    /// location name.
    pub fn from_registry(registry: &AdapterRegistry) -> Self {
        let locations = registry
            .iter()
            .map(|(location, adapter)| {
                let store = (adapter.store() != location).then(|| adapter.store().to_string());
                (
                    location.to_string(),
                    LocationConfig {
                        adapter: adapter.kind(),
                        store,
                    },
                )
            })
            .collect();
        Self { locations }
    }

    pub fn to_json_string(&self) -> RegistryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates every entry and builds the registry.
    pub fn build(&self) -> RegistryResult<AdapterRegistry> {
        let mut builder = AdapterRegistry::builder();
        for (location, entry) in &self.locations {
            builder = match entry.store.as_deref() {
                Some(store) => builder.bind_store(location, entry.adapter, store)?,
                None => builder.bind(location, entry.adapter)?,
            };
        }
        Ok(builder.build())
    }
}
