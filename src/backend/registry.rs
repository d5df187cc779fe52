//! Directory-backed view of installed package versions.
//!
//! Nothing is cached between calls; the install root is rescanned on
//! demand and is the single source of truth.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;

use crate::backend::error::{Result, UpdateError};

/// Manifest file read for a version label, when present.
const MANIFEST_NAME: &str = "package.json";

/// Label used when no manifest is present or readable.
const UNKNOWN_VERSION: &str = "unknown";

#[derive(Deserialize)]
struct Manifest {
    #[serde(default)]
    version: Option<String>,
}

/// One installed version of a package, discovered by directory scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub folder_name: String,
    pub path: PathBuf,
    pub version_label: String,
}

/// Enumerate installed versions under `root`, one level deep.
///
/// The root is created when missing; an empty root is an empty listing,
/// not an error.
pub fn list_installed(root: &Path) -> Result<Vec<InstalledVersion>> {
    if !root.exists() {
        fs::create_dir_all(root).map_err(|err| {
            UpdateError::fs(format!("cannot create install root {}", root.display()), err)
        })?;
    }

    let entries = fs::read_dir(root).map_err(|err| {
        UpdateError::fs(format!("cannot read install root {}", root.display()), err)
    })?;

    let mut installed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            UpdateError::fs(format!("cannot read install root {}", root.display()), err)
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        installed.push(InstalledVersion {
            folder_name: entry.file_name().to_string_lossy().into_owned(),
            version_label: read_version_label(&path),
            path,
        });
    }
    Ok(installed)
}

/// Version label from the directory's manifest, else "unknown".
fn read_version_label(dir: &Path) -> String {
    let manifest_path = dir.join(MANIFEST_NAME);
    let Ok(content) = fs::read_to_string(&manifest_path) else {
        return UNKNOWN_VERSION.to_string();
    };
    match serde_json::from_str::<Manifest>(&content) {
        Ok(manifest) => manifest
            .version
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
        Err(err) => {
            warn!("unreadable manifest in {}: {err}", dir.display());
            UNKNOWN_VERSION.to_string()
        }
    }
}

/// Delete one installed version directory.
pub fn remove_installed(path: &Path) -> Result<()> {
    fs::remove_dir_all(path)
        .map_err(|err| UpdateError::fs(format!("cannot delete {}", path.display()), err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_root_is_created_and_yields_empty() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("game").join("My Game");

        let installed = list_installed(&root).unwrap();

        assert!(installed.is_empty());
        assert!(root.is_dir());
    }

    #[test]
    fn reads_manifest_version_when_present() {
        let temp = tempfile::tempdir().unwrap();
        let with_manifest = temp.path().join("game-2.1");
        let without_manifest = temp.path().join("game-1.0");
        fs::create_dir_all(&with_manifest).unwrap();
        fs::create_dir_all(&without_manifest).unwrap();
        fs::write(
            with_manifest.join("package.json"),
            r#"{"name": "game", "version": "2.1.0"}"#,
        )
        .unwrap();
        // stray files at the top level are not versions
        fs::write(temp.path().join("notes.txt"), b"x").unwrap();

        let mut installed = list_installed(temp.path()).unwrap();
        installed.sort_by(|a, b| a.folder_name.cmp(&b.folder_name));

        assert_eq!(installed.len(), 2);
        assert_eq!(installed[0].folder_name, "game-1.0");
        assert_eq!(installed[0].version_label, "unknown");
        assert_eq!(installed[1].folder_name, "game-2.1");
        assert_eq!(installed[1].version_label, "2.1.0");
    }

    #[test]
    fn malformed_manifest_degrades_to_unknown() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("game-3.0");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), b"{broken").unwrap();

        let installed = list_installed(temp.path()).unwrap();
        assert_eq!(installed[0].version_label, "unknown");
    }

    #[test]
    fn remove_installed_deletes_the_version() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("game-1.0");
        fs::create_dir_all(dir.join("saves")).unwrap();
        fs::write(dir.join("saves/slot.bin"), b"s").unwrap();

        remove_installed(&dir).unwrap();

        assert!(!dir.exists());
        assert!(list_installed(temp.path()).unwrap().is_empty());
    }
}
