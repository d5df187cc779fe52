//! Version-history API source.
//!
//! The endpoint answers with an envelope `{success, result, message}`;
//! each result entry lists one published version and its per-platform
//! release files.

use log::debug;
use reqwest::header::HeaderMap;
use serde::Deserialize;

use super::models::{Asset, Release, SourceMeta};
use crate::backend::error::{Result, UpdateError};
use crate::backend::net::HttpClient;

/// History endpoint under the configured base URL.
const HISTORY_PATH: &str = "/api/v1/version/getHistory";

#[derive(Deserialize, Debug)]
struct Envelope {
    success: bool,
    #[serde(default)]
    result: Vec<HistoryEntry>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct HistoryEntry {
    version_name: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    commit: String,
    #[serde(default)]
    create_time: String,
    #[serde(default)]
    release_file: Vec<HistoryFile>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct HistoryFile {
    platform: String,
    #[serde(default)]
    size: Option<u64>,
    download_url: String,
}

/// Fetch the full version history in the order the API returns it.
pub async fn list_releases(base_url: &str) -> Result<Vec<Release>> {
    let url = format!("{}{HISTORY_PATH}", base_url.trim_end_matches('/'));
    let response = HttpClient::shared().get_api(&url, HeaderMap::new()).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpdateError::HttpStatus { status, url });
    }

    let envelope: Envelope = response
        .json()
        .await
        .map_err(|err| UpdateError::Protocol(format!("malformed version history: {err}")))?;

    if !envelope.success {
        return Err(UpdateError::Protocol(
            envelope.message.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }

    debug!("fetched {} history entries", envelope.result.len());
    Ok(envelope.result.into_iter().map(normalize).collect())
}

fn normalize(entry: HistoryEntry) -> Release {
    let assets = entry
        .release_file
        .into_iter()
        .map(|file| Asset {
            name: match file.size {
                Some(size) => format!("{} ({size})", file.platform),
                None => file.platform.clone(),
            },
            download_url: file.download_url,
            size_hint: file.size,
        })
        .collect();
    Release::new(
        entry.version_name,
        String::new(),
        assets,
        SourceMeta::History {
            author: entry.author,
            commit: entry.commit,
            create_time: entry.create_time,
        },
    )
}
