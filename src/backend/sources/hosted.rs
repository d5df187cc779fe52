//! Hosted-releases feed.
//!
//! Talks the source-hosting provider's release-list wire format:
//! `tag_name`, `body`, and `assets[].{name, browser_download_url, size}`.

use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;

use super::models::{Asset, Release, SourceMeta};
use crate::backend::error::{Result, UpdateError};
use crate::backend::net::HttpClient;

/// Default API base for the hosted-releases provider.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Releases requested per poll.
const PER_PAGE: u32 = 100;

#[derive(Deserialize, Debug)]
struct RemoteRelease {
    tag_name: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    assets: Vec<RemoteAsset>,
}

#[derive(Deserialize, Debug)]
struct RemoteAsset {
    name: String,
    browser_download_url: String,
    #[serde(default)]
    size: Option<u64>,
}

/// Fetch all published releases for `repo`, newest first per the
/// provider's own ordering.
pub async fn list_releases(
    repo: &str,
    token: Option<&str>,
    api_base: &str,
) -> Result<Vec<Release>> {
    let url = format!("{api_base}/repos/{repo}/releases?per_page={PER_PAGE}");
    let response = HttpClient::shared()
        .get_api(&url, list_headers(token))
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpdateError::HttpStatus { status, url });
    }

    let remote: Vec<RemoteRelease> = response
        .json()
        .await
        .map_err(|err| UpdateError::Protocol(format!("malformed release list: {err}")))?;
    debug!("fetched {} releases for {repo}", remote.len());

    Ok(remote.into_iter().map(normalize).collect())
}

fn normalize(remote: RemoteRelease) -> Release {
    let assets = remote
        .assets
        .into_iter()
        .map(|asset| Asset {
            name: asset.name,
            download_url: asset.browser_download_url,
            size_hint: asset.size,
        })
        .collect();
    Release::new(
        remote.tag_name,
        remote.body.unwrap_or_default(),
        assets,
        SourceMeta::Hosted,
    )
}

fn list_headers(token: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github.v3+json"),
    );
    if let Some(token) = token
        && let Ok(value) = HeaderValue::from_str(&format!("token {token}"))
    {
        headers.insert(AUTHORIZATION, value);
    }
    headers
}
