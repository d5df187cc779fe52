//! Normalized release and asset models shared by both source variants.

/// One downloadable file belonging to a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Display name shown in selectors.
    pub name: String,
    /// Resolved download URL.
    pub download_url: String,
    /// Size reported by the provider, when it reports one.
    pub size_hint: Option<u64>,
}

impl Asset {
    /// File name the download is stored under: the last path segment of
    /// the download URL, falling back to the display name. Keeps the
    /// version-history variant's synthesized display names out of the
    /// filesystem.
    pub fn file_name(&self) -> String {
        self.download_url
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| self.name.clone())
    }
}

/// Variant-specific passthrough metadata, never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMeta {
    Hosted,
    History {
        author: String,
        commit: String,
        create_time: String,
    },
}

/// A published version with notes and downloadable assets.
///
/// Produced fresh on every poll and never persisted. Provider order is
/// preserved; callers treat index 0 as the latest entry.
#[derive(Debug, Clone)]
pub struct Release {
    pub display_version: String,
    pub notes: String,
    assets: Vec<Asset>,
    pub meta: SourceMeta,
}

impl Release {
    pub fn new(
        display_version: String,
        notes: String,
        assets: Vec<Asset>,
        meta: SourceMeta,
    ) -> Self {
        Self {
            display_version,
            notes,
            assets,
            meta,
        }
    }

    /// All downloadable assets, in provider order.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Select an asset by index.
    pub fn asset(&self, index: usize) -> Option<&Asset> {
        self.assets.get(index)
    }
}
