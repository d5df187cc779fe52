//! Release sources.
//!
//! Two wire protocols produce the same normalized [`Release`] shape: the
//! hosted-releases feed and a custom version-history API. The only other
//! per-variant difference is header construction for asset downloads, so
//! one download pipeline serves both.

/// Hosted-releases feed (provider release-list format).
pub mod hosted;
/// Custom version-history API.
pub mod history;
/// Normalized release and asset models.
pub mod models;

pub use models::{Asset, Release, SourceMeta};

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};

use crate::backend::error::Result;

/// Where releases are polled from. Immutable after construction.
#[derive(Debug, Clone)]
pub enum ReleaseSource {
    /// Source-hosting release feed, addressed as `owner/repository`.
    HostedReleases {
        repo: String,
        token: Option<String>,
        api_base: String,
    },
    /// Version-history API rooted at a base URL.
    VersionHistory { base_url: String },
}

impl ReleaseSource {
    pub fn hosted(repo: impl Into<String>, token: Option<String>) -> Self {
        Self::HostedReleases {
            repo: repo.into(),
            token,
            api_base: hosted::DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn version_history(base_url: impl Into<String>) -> Self {
        Self::VersionHistory {
            base_url: base_url.into(),
        }
    }

    /// Fetch all published releases. An empty list is a valid result to
    /// be shown as such, never an error.
    pub async fn list_releases(&self) -> Result<Vec<Release>> {
        match self {
            Self::HostedReleases {
                repo,
                token,
                api_base,
            } => hosted::list_releases(repo, token.as_deref(), api_base).await,
            Self::VersionHistory { base_url } => history::list_releases(base_url).await,
        }
    }

    /// Extra headers for downloading an asset from this source. The hosted
    /// variant authorizes with its token; both accept anything.
    pub fn download_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        if let Self::HostedReleases {
            token: Some(token), ..
        } = self
            && let Ok(value) = HeaderValue::from_str(&format!("token {token}"))
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }
}
