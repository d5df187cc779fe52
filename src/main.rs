//! Command-line front for the update backend.
//!
//! Thin collaborator only: it loads the configuration, drives one
//! operation at a time, prints progress, and surfaces failures. All the
//! actual behavior lives in the backend modules.

mod backend;

use std::env;
use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use log::error;

use crate::backend::downloader::{DownloadJob, JobStatus};
use crate::backend::registry;
use crate::backend::services::{UpdateEvent, spawn_download, spawn_release_poll};
use crate::backend::sources::{ReleaseSource, SourceMeta};
use crate::backend::utils::{AppConfig, install_root};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let result = match args.get(1).map(String::as_str) {
        Some("check") => check(&args[2..]).await,
        Some("download") => download(&args[2..]).await,
        Some("list") => list(&args[2..]),
        Some("remove") => remove(&args[2..]),
        _ => {
            eprintln!("Usage: {} <check|download|list|remove> <package> [...]", args[0]);
            eprintln!("  check <package>");
            eprintln!("  download <package> [release-index] [asset-index]");
            eprintln!("  list <package>");
            eprintln!("  remove <package> <folder>");
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Resolve a package name to its release source. The name "history"
/// selects the version-history API; anything else must be a configured
/// repository.
fn resolve_source(config: &AppConfig, package: &str) -> Result<ReleaseSource> {
    if package == "history" {
        let base_url = config
            .api_base_url
            .as_deref()
            .context("no api_base_url configured for the version-history source")?;
        return Ok(ReleaseSource::version_history(base_url));
    }
    let repo = config
        .repositories
        .iter()
        .find(|entry| entry.name == package)
        .with_context(|| format!("no repository named {package} in config.json"))?;
    Ok(ReleaseSource::hosted(
        repo.repo.clone(),
        config.github_api_token.clone(),
    ))
}

async fn check(args: &[String]) -> Result<()> {
    let package = args.first().context("missing package name")?;
    let source = resolve_source(&AppConfig::load(), package)?;

    let releases = spawn_release_poll(source).await??;
    if releases.is_empty() {
        println!("no releases published for {package}");
        return Ok(());
    }

    for (index, release) in releases.iter().enumerate() {
        println!("[{index}] {}", release.display_version);
        if let SourceMeta::History {
            author,
            commit,
            create_time,
        } = &release.meta
        {
            println!("    by {author} ({commit}) at {create_time}");
        }
        for (asset_index, asset) in release.assets().iter().enumerate() {
            println!("    asset [{asset_index}] {}", asset.name);
        }
    }
    Ok(())
}

async fn download(args: &[String]) -> Result<()> {
    let package = args.first().context("missing package name")?;
    let release_index: usize = args.get(1).map_or(Ok(0), |raw| raw.parse())?;
    let asset_index: usize = args.get(2).map_or(Ok(0), |raw| raw.parse())?;

    let source = resolve_source(&AppConfig::load(), package)?;
    let releases = spawn_release_poll(source.clone()).await??;
    let release = releases
        .get(release_index)
        .with_context(|| format!("no release at index {release_index}"))?;
    let asset = release
        .asset(asset_index)
        .with_context(|| format!("release {} has no asset at index {asset_index}", release.display_version))?
        .clone();

    println!("downloading {} from {}", asset.name, release.display_version);
    let mut job = DownloadJob::new(asset.clone(), install_root(package));
    job.start();

    let (handle, mut events) = spawn_download(&source, asset, job.target_root.clone());
    while let Some(event) = events.recv().await {
        match event {
            UpdateEvent::Progress(percent) => {
                job.set_progress(percent);
                print!("\r  {}%", job.progress);
                let _ = std::io::stdout().flush();
            }
            UpdateEvent::Finished(path) => {
                job.succeed();
                println!("\ninstalled into {}", path.display());
            }
            UpdateEvent::Failed(reason) => {
                job.fail(reason);
                println!();
            }
        }
    }
    handle.await?;

    match job.status {
        JobStatus::Succeeded => {
            println!("installed versions of {package}:");
            for version in registry::list_installed(&job.target_root)? {
                println!("  {}  (version {})", version.folder_name, version.version_label);
            }
            Ok(())
        }
        JobStatus::Failed(reason) => bail!("update failed: {reason}"),
        _ => bail!("download worker ended without a terminal event"),
    }
}

fn list(args: &[String]) -> Result<()> {
    let package = args.first().context("missing package name")?;
    let installed = registry::list_installed(&install_root(package))?;
    if installed.is_empty() {
        println!("nothing installed for {package}");
        return Ok(());
    }
    for version in installed {
        println!("{}  (version {})", version.folder_name, version.version_label);
    }
    Ok(())
}

fn remove(args: &[String]) -> Result<()> {
    let package = args.first().context("missing package name")?;
    let folder = args.get(1).context("missing folder name")?;
    let root = install_root(package);

    let installed = registry::list_installed(&root)?;
    let version = installed
        .iter()
        .find(|version| version.folder_name == *folder)
        .with_context(|| format!("{folder} is not installed for {package}"))?;

    registry::remove_installed(&version.path)?;
    println!("removed {}", version.path.display());
    Ok(())
}
