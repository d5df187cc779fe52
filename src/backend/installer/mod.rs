//! Install materialization.
//!
//! Turns a downloaded archive into a per-version install directory under
//! the package's install root, fully replacing any previous install of
//! the same derived name.

/// Archive validation and extraction.
pub mod archive;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::info;
use regex::Regex;

use crate::backend::error::{Result, UpdateError};

fn illegal_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[\\/:"*?<>|]+"#).expect("valid pattern"))
}

/// Derive the install directory name for an asset: extension stripped,
/// each run of illegal path characters replaced with one `_`.
///
/// Distinct asset names can collide after sanitization; the later install
/// replaces the earlier. Accepted limitation.
pub fn safe_folder_name(asset_name: &str) -> String {
    let stem = match asset_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains(['/', '\\']) => stem,
        _ => asset_name,
    };
    illegal_chars().replace_all(stem, "_").into_owned()
}

/// Remove any existing install under the derived name and extract the
/// archive into a fresh directory.
///
/// A removal or creation failure leaves the previous state untouched; a
/// failure during extraction can leave a partial tree (extraction is not
/// staged). Error contexts name the phase.
pub fn materialize(archive_path: &Path, asset_name: &str, target_root: &Path) -> Result<PathBuf> {
    let target = target_root.join(safe_folder_name(asset_name));

    if target.exists() {
        std::fs::remove_dir_all(&target).map_err(|err| {
            UpdateError::fs(
                format!("cannot remove previous install {}", target.display()),
                err,
            )
        })?;
    }
    std::fs::create_dir_all(&target).map_err(|err| {
        UpdateError::fs(
            format!("cannot create install directory {}", target.display()),
            err,
        )
    })?;

    archive::extract_zip(archive_path, &target)?;
    info!("installed {asset_name} into {}", target.display());
    Ok(target)
}
