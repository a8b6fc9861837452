use morphology_core::loader::{load_path, normalize_path, store};
use morphology_core::ArtifactError;
use std::fs;

#[test]
fn store_returns_absolute_normalized_reference() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("graphs")).unwrap();
    let file = dir.path().join("graphs").join("864691135.graph");
    fs::write(&file, b"edges").unwrap();

    let messy = dir
        .path()
        .join("graphs")
        .join(".")
        .join("..")
        .join("graphs")
        .join("864691135.graph");
    let reference = store(&messy).unwrap();

    assert!(reference.as_path().is_absolute());
    assert_eq!(reference.as_path(), normalize_path(&file).unwrap());
    assert_eq!(reference.suffix().as_deref(), Some("graph"));
}

#[test]
fn store_then_load_path_is_pass_through() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("decomposition.pbz2");
    fs::write(&file, b"opaque").unwrap();

    let reference = store(&file).unwrap();
    let loaded = load_path(&reference).unwrap();
    assert_eq!(loaded, normalize_path(&file).unwrap());
}

#[test]
fn store_of_missing_path_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("never_written.h5");

    let err = store(&missing).unwrap_err();
    match &err {
        ArtifactError::NotFound { path } => assert_eq!(path, &missing),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_recoverable());
    assert_eq!(err.code(), "artifact_not_found");
}

#[test]
fn load_path_of_deleted_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("graph.pbz2");
    fs::write(&file, b"opaque").unwrap();
    let reference = store(&file).unwrap();

    fs::remove_file(&file).unwrap();
    assert!(load_path(&reference).unwrap_err().is_not_found());
}
