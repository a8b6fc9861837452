use super::observe::observe;
use super::{ArtifactError, ArtifactResult};
use crate::model::artifact::ArtifactRef;
use std::path::{Component, Path, PathBuf};

/// Validates `path` and returns the reference to persist.
///
/// The result is absolute and lexically normalized (`.` dropped, `..`
/// folded); symlinks are kept as written.
///
/// # Errors
/// - `NotFound` when the normalized path does not exist.
/// - `Io` when the working directory cannot be resolved for a relative path.
pub fn store(path: impl AsRef<Path>) -> ArtifactResult<ArtifactRef> {
    let path = path.as_ref();
    observe("store", "reference", path, || {
        let normalized = normalize_path(path).map_err(|source| ArtifactError::io(path, source))?;
        ensure_exists(&normalized)?;
        Ok(ArtifactRef::from_stored(normalized))
    })
}

/// Pass-through resolution: checks existence and returns `path` unchanged.
pub fn load_path(path: impl AsRef<Path>) -> ArtifactResult<PathBuf> {
    let path = path.as_ref();
    observe("load_path", "raw_path", path, || {
        ensure_exists(path)?;
        Ok(path.to_path_buf())
    })
}

/// Absolute, lexically normalized form of `path`.
///
/// Relative paths are joined onto the current working directory. `..` at the
/// root stays at the root.
pub fn normalize_path(path: impl AsRef<Path>) -> std::io::Result<PathBuf> {
    let path = path.as_ref();
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if normalized.parent().is_some() {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

pub(super) fn ensure_exists(path: &Path) -> ArtifactResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ArtifactError::NotFound {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_path;
    use std::path::PathBuf;

    #[test]
    fn normalize_folds_dot_components() {
        assert_eq!(
            normalize_path("/stores/meshes/./raw/../42.h5").unwrap(),
            PathBuf::from("/stores/meshes/42.h5")
        );
    }

    #[test]
    fn normalize_keeps_parent_of_root_at_root() {
        assert_eq!(normalize_path("/../../etc").unwrap(), PathBuf::from("/etc"));
    }

    #[test]
    fn normalize_anchors_relative_paths_at_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            normalize_path("faces/1.npz").unwrap(),
            cwd.join("faces").join("1.npz")
        );
    }
}
