//! Schema configurations of the H01 and MICrONS minnie65 deployments.
//!
//! Every location stores under a store of the same name.

use super::AdapterKind::{Decompression, Filepath, Mesh, MeshArchive, Numpy};
use super::{AdapterKind, AdapterRegistry, RegistryError, RegistryResult};

/// Named, static registry declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub locations: &'static [(&'static str, AdapterKind)],
}

impl Preset {
    pub fn build(&self) -> RegistryResult<AdapterRegistry> {
        let mut builder = AdapterRegistry::builder();
        for (location, kind) in self.locations {
            builder = builder.bind(location, *kind)?;
        }
        Ok(builder.build())
    }
}

pub const H01_AUTO_PROOFREADING: Preset = Preset {
    name: "h01_auto_proofreading",
    locations: &[
        ("h01_auto_proof_meshes", Decompression),
        ("h01_auto_proof_skeletons", Decompression),
        ("h01_faces", Decompression),
        ("h01_skeletons", Decompression),
        ("h01_decomposition", Filepath),
        ("h01_graph", Filepath),
    ],
};

pub const H01_MORPHOLOGY: Preset = Preset {
    name: "h01_morphology",
    locations: &[
        ("h01_meshes", Mesh),
        ("h01_skeletons", Decompression),
        ("h01_faces", Decompression),
    ],
};

pub const MINNIE65_MORPHOLOGY: Preset = Preset {
    name: "minnie65_morphology",
    locations: &[
        ("minnie65_decimated_meshes", Mesh),
        ("minnie65_soma_meshes", Mesh),
        ("minnie65_skeletons", Decompression),
        ("minnie65_faces", Decompression),
    ],
};

pub const MINNIE65_AUTO_PROOFREADING: Preset = Preset {
    name: "minnie65_auto_proofreading",
    locations: &[
        ("minnie65_auto_proof_meshes", Decompression),
        ("minnie65_auto_proof_skeletons", Decompression),
        ("minnie65_faces", Decompression),
        ("minnie65_skeletons", Decompression),
        ("minnie65_decomposition", Filepath),
        ("minnie65_graph", Filepath),
    ],
};

pub const MINNIE65_MORPHOLOGY_V2: Preset = Preset {
    name: "minnie65_morphology_v2",
    locations: &[
        ("minnie65_decimated_meshes", MeshArchive),
        ("minnie65_decomposition", Filepath),
    ],
};

pub const MINNIE65_AUTO_PROOFREADING_V2: Preset = Preset {
    name: "minnie65_auto_proofreading_v2",
    locations: &[
        ("minnie65_auto_proof_meshes", MeshArchive),
        ("minnie65_auto_proof_skeletons", Numpy),
        ("minnie65_auto_proof_graphs", Filepath),
    ],
};

const PRESETS: &[Preset] = &[
    H01_AUTO_PROOFREADING,
    H01_MORPHOLOGY,
    MINNIE65_MORPHOLOGY,
    MINNIE65_AUTO_PROOFREADING,
    MINNIE65_MORPHOLOGY_V2,
    MINNIE65_AUTO_PROOFREADING_V2,
];

/// Returns every shipped preset.
pub fn all() -> &'static [Preset] {
    PRESETS
}

/// Looks up a preset by name.
pub fn find(name: &str) -> Option<&'static Preset> {
    let normalized = name.trim();
    PRESETS.iter().find(|preset| preset.name == normalized)
}

/// Builds the registry of the preset called `name`.
pub fn by_name(name: &str) -> RegistryResult<AdapterRegistry> {
    find(name)
        .ok_or_else(|| RegistryError::UnknownPreset(name.trim().to_string()))?
        .build()
}

#[cfg(test)]
mod tests {
    use super::{all, by_name, find};
    use crate::registry::{AdapterKind, RegistryError};

    #[test]
    fn every_preset_builds() {
        for preset in all() {
            let registry = preset.build().unwrap();
            assert_eq!(registry.len(), preset.locations.len(), "{}", preset.name);
        }
    }

    #[test]
    fn v2_presets_switch_meshes_to_archives() {
        let v1 = by_name("minnie65_morphology").unwrap();
        let v2 = by_name("minnie65_morphology_v2").unwrap();
        assert_eq!(
            v1.adapter_kind("minnie65_decimated_meshes"),
            Some(AdapterKind::Mesh)
        );
        assert_eq!(
            v2.adapter_kind("minnie65_decimated_meshes"),
            Some(AdapterKind::MeshArchive)
        );

        let proof = by_name("minnie65_auto_proofreading_v2").unwrap();
        assert_eq!(
            proof.adapter_kind("minnie65_auto_proof_skeletons"),
            Some(AdapterKind::Numpy)
        );
    }

    #[test]
    fn unknown_preset_is_reported() {
        assert!(find("h02_morphology").is_none());
        match by_name(" h02_morphology ") {
            Err(RegistryError::UnknownPreset(name)) => assert_eq!(name, "h02_morphology"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
