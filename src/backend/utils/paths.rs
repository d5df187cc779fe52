//! Install-root layout.

use std::path::PathBuf;

/// Directory under the working directory holding every install.
const GAME_DIR: &str = "game";

/// Install root for one package: `{cwd}/game/{package}`. Created lazily
/// by the registry scan.
pub fn install_root(package_name: &str) -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(GAME_DIR)
        .join(package_name)
}
