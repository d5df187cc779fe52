//! Background update workers.
//!
//! One release poll or one download/extract runs per spawned task so the
//! caller is never blocked. Results come back over an event channel:
//! any number of ordered progress events, then exactly one terminal event.
//! There is no cancellation; a started job runs to completion or failure.

use std::path::PathBuf;

use log::error;
use reqwest::header::HeaderMap;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

use crate::backend::downloader;
use crate::backend::error::{Result, UpdateError};
use crate::backend::installer;
use crate::backend::sources::{Asset, Release, ReleaseSource};

/// Events emitted by a download worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    /// Whole percentage, non-decreasing.
    Progress(u8),
    /// The install directory the asset was materialized into.
    Finished(PathBuf),
    /// User-facing failure message.
    Failed(String),
}

impl UpdateEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }
}

/// Poll `source` on a background task. The handle resolves to the
/// normalized release list or a user-facing error.
pub fn spawn_release_poll(source: ReleaseSource) -> JoinHandle<Result<Vec<Release>>> {
    tokio::spawn(async move { source.list_releases().await })
}

/// Download one asset of `source` and materialize it under `target_root`
/// on a background task.
pub fn spawn_download(
    source: &ReleaseSource,
    asset: Asset,
    target_root: PathBuf,
) -> (JoinHandle<()>, UnboundedReceiver<UpdateEvent>) {
    let headers = source.download_headers();
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        let progress_tx = tx.clone();
        let outcome = run_download(&asset, headers, target_root, move |percent| {
            let _ = progress_tx.send(UpdateEvent::Progress(percent));
        })
        .await;

        let terminal = match outcome {
            Ok(path) => UpdateEvent::Finished(path),
            Err(err) => {
                error!("download of {} failed: {err}", asset.name);
                UpdateEvent::Failed(err.to_string())
            }
        };
        let _ = tx.send(terminal);
    });

    (handle, rx)
}

async fn run_download<F>(
    asset: &Asset,
    headers: HeaderMap,
    target_root: PathBuf,
    report: F,
) -> Result<PathBuf>
where
    F: FnMut(u8),
{
    let downloaded = downloader::download_asset(asset, headers, report).await?;

    // Extraction is blocking filesystem work.
    let file_name = asset.file_name();
    tokio::task::spawn_blocking(move || {
        installer::materialize(&downloaded.path, &file_name, &target_root)
    })
    .await
    .map_err(|err| UpdateError::fs("install task failed", std::io::Error::other(err)))?
}
