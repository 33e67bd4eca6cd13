//! Zone view over a catalog entry.

use std::sync::Arc;

use tracing::warn;

use crate::error::ApiError;
use crate::http::HttpClient;
use crate::types::{VersionEntry, ZoneEntry};
use crate::version::Version;

/// A zone of the catalog, bound to the shared HTTP client.
#[derive(Debug)]
pub struct Zone<C> {
    entry: ZoneEntry,
    client: Arc<C>,
    url_pattern: String,
}

impl<C: HttpClient> Zone<C> {
    pub(crate) fn new(entry: ZoneEntry, client: Arc<C>, url_pattern: &str) -> Self {
        Self {
            entry,
            client,
            url_pattern: url_pattern.to_owned(),
        }
    }

    /// Zone slug.
    pub fn slug(&self) -> &str {
        &self.entry.slug
    }

    /// Catalog entry.
    pub fn entry(&self) -> &ZoneEntry {
        &self.entry
    }

    /// Version descriptors in catalog order.
    pub fn versions(&self) -> &[VersionEntry] {
        &self.entry.versions
    }

    /// Version with number `no`.
    pub fn version(&self, no: &str) -> Result<Version<C>, ApiError> {
        let entry = self
            .entry
            .versions
            .iter()
            .find(|version| version.no == no)
            .ok_or_else(|| ApiError::VersionNotFound {
                zone: self.entry.slug.clone(),
                version: no.to_owned(),
            })?;
        Ok(self.bind(entry))
    }

    /// The version flagged default.
    ///
    /// When several versions carry the flag the first one wins.
    pub fn default_version(&self) -> Result<Version<C>, ApiError> {
        let mut flagged = self.entry.versions.iter().filter(|version| version.default);
        let entry = flagged.next().ok_or_else(|| ApiError::NoDefaultVersion {
            zone: self.entry.slug.clone(),
        })?;

        let extra = flagged.count();
        if extra > 0 {
            warn!(
                zone = %self.entry.slug,
                chosen = %entry.no,
                extra,
                "zone has more than one default version"
            );
        }
        Ok(self.bind(entry))
    }

    fn bind(&self, entry: &VersionEntry) -> Version<C> {
        Version::new(
            &self.entry.slug,
            entry.clone(),
            Arc::clone(&self.client),
            &self.url_pattern,
        )
    }
}
