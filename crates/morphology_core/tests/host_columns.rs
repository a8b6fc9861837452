//! The host relational layer is external; a keyed map stands in for its
//! attribute columns, holding only the reference text returned by `put`.

use morphology_core::registry::presets;
use morphology_core::writer::{write_data_archive, write_mesh_archive};
use morphology_core::{
    AdapterRegistry, ArtifactRef, LoadedArtifact, NumericArray, OpaqueArtifact, RegistryResult,
    TriangleMesh,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Default)]
struct HostColumns {
    rows: BTreeMap<(String, String), String>,
}

impl HostColumns {
    fn insert(
        &mut self,
        registry: &AdapterRegistry,
        location: &str,
        key: &str,
        path: &Path,
    ) -> RegistryResult<()> {
        let reference = registry.put(location, path)?;
        self.rows
            .insert((location.to_string(), key.to_string()), reference.to_string());
        Ok(())
    }

    fn fetch(
        &self,
        registry: &AdapterRegistry,
        location: &str,
        key: &str,
    ) -> RegistryResult<LoadedArtifact> {
        let stored = &self.rows[&(location.to_string(), key.to_string())];
        registry.get(location, &ArtifactRef::from_stored(stored))
    }
}

#[test]
fn stored_column_text_is_enough_to_fetch_a_mesh() {
    let dir = tempfile::tempdir().unwrap();
    let registry = presets::by_name("minnie65_morphology_v2").unwrap();
    let mut host = HostColumns::default();

    let path = dir.path().join("864691135.npz");
    let mesh = TriangleMesh::new(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        vec![[0, 1, 2]],
    );
    write_mesh_archive(&path, &mesh).unwrap();

    host.insert(&registry, "minnie65_decimated_meshes", "864691135", &path)
        .unwrap();
    let column = &host.rows[&(
        "minnie65_decimated_meshes".to_string(),
        "864691135".to_string(),
    )];
    assert!(Path::new(column).is_absolute());
    assert_eq!(
        host.fetch(&registry, "minnie65_decimated_meshes", "864691135")
            .unwrap(),
        LoadedArtifact::Mesh(mesh)
    );
}

#[test]
fn fetch_after_file_removal_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let registry = presets::by_name("h01_auto_proofreading").unwrap();
    let mut host = HostColumns::default();

    let path = dir.path().join("faces.npz");
    write_data_archive(&path, &NumericArray::from_vec(vec![0u32, 1, 2])).unwrap();
    host.insert(&registry, "h01_faces", "42", &path).unwrap();
    assert!(matches!(
        host.fetch(&registry, "h01_faces", "42").unwrap(),
        LoadedArtifact::Opaque(OpaqueArtifact::Array(_))
    ));

    fs::remove_file(&path).unwrap();
    let err = host.fetch(&registry, "h01_faces", "42").unwrap_err();
    match err.artifact_error() {
        Some(artifact) => assert!(artifact.is_not_found(), "unexpected error: {artifact}"),
        None => panic!("unexpected error: {err}"),
    }
}

#[test]
fn insert_of_missing_file_writes_no_row() {
    let dir = tempfile::tempdir().unwrap();
    let registry = presets::by_name("h01_auto_proofreading").unwrap();
    let mut host = HostColumns::default();

    let err = host
        .insert(&registry, "h01_graph", "7", &dir.path().join("graph.pbz2"))
        .unwrap_err();
    assert!(err.artifact_error().is_some(), "unexpected error: {err}");
    assert!(host.rows.is_empty());
}
