//! Root API object: site config and zone catalog.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::http::{CancelToken, HttpClient, UreqClient};
use crate::types::{Catalog, VersionKey, ZoneEntry};
use crate::zone::Zone;

/// Path of the site-wide config.
const CONFIG_PATH: &str = "config.json";

/// Path of the zone catalog.
const ZONES_PATH: &str = "zones.json";

/// Slug used when no zone is requested.
pub const DEFAULT_ZONE: &str = "default";

/// URL pattern used when no doc route is configured.
pub const DEFAULT_DOC_URL_PATTERN: &str = ":zone/:version/:permalink";

/// Route that renders documents in the host application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocRoute {
    /// Route name, compared by [`Dimer::is_doc_route`].
    pub name: String,
    /// URL pattern with `:zone`, `:version` and `:permalink` tokens.
    pub path: String,
}

/// Options fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimerOptions {
    /// Base URL of the dimer API.
    pub api_url: String,
    /// Doc route for routed hosts.
    pub route: Option<DocRoute>,
}

impl DimerOptions {
    /// Options for `api_url` without a doc route.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            route: None,
        }
    }

    /// Attach a doc route.
    #[must_use]
    pub fn with_route(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.route = Some(DocRoute {
            name: name.into(),
            path: path.into(),
        });
        self
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.api_url.trim().is_empty() {
            return Err(ApiError::MissingApiUrl);
        }
        if let Some(route) = &self.route {
            if route.path.trim().is_empty() {
                return Err(ApiError::MissingRoutePath);
            }
            if route.name.trim().is_empty() {
                return Err(ApiError::MissingRouteName);
            }
        }
        Ok(())
    }

    /// URL pattern for document links.
    pub fn url_pattern(&self) -> &str {
        self.route
            .as_ref()
            .map_or(DEFAULT_DOC_URL_PATTERN, |route| route.path.as_str())
    }
}

/// Entry point of the API client.
///
/// Holds the site config and zone catalog once [`load`](Self::load) has
/// succeeded. Both are replaced together or not at all.
#[derive(Debug)]
pub struct Dimer<C> {
    options: DimerOptions,
    client: Arc<C>,
    catalog: Option<Catalog>,
}

impl Dimer<UreqClient> {
    /// Create an instance talking to `options.api_url` over HTTP.
    pub fn connect(options: DimerOptions) -> Result<Self, ApiError> {
        let client = Arc::new(UreqClient::new(&options.api_url));
        Self::new(options, client)
    }
}

impl<C: HttpClient> Dimer<C> {
    /// Create an instance using `client` for all requests.
    pub fn new(options: DimerOptions, client: Arc<C>) -> Result<Self, ApiError> {
        options.validate()?;
        Ok(Self {
            options,
            client,
            catalog: None,
        })
    }

    /// Construction options.
    pub fn options(&self) -> &DimerOptions {
        &self.options
    }

    /// Shared HTTP client.
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Whether config and zones are loaded.
    pub fn is_loaded(&self) -> bool {
        self.catalog.is_some()
    }

    /// Fetch config and zones concurrently.
    ///
    /// A no-op when already loaded unless `force` is set. If either request
    /// fails, previously loaded data is kept untouched.
    pub async fn load(&mut self, force: bool) -> Result<(), ApiError> {
        if self.is_loaded() && !force {
            return Ok(());
        }

        let (config, zones) = tokio::try_join!(
            fetch::<Value, _>(&*self.client, CONFIG_PATH),
            fetch::<Vec<ZoneEntry>, _>(&*self.client, ZONES_PATH),
        )?;

        info!(zones = zones.len(), force, "loaded dimer catalog");
        self.catalog = Some(Catalog { config, zones });
        Ok(())
    }

    /// Site-wide config, once loaded.
    pub fn config(&self) -> Option<&Value> {
        self.catalog.as_ref().map(|catalog| &catalog.config)
    }

    /// Zone catalog, once loaded.
    pub fn zones(&self) -> Option<&[ZoneEntry]> {
        self.catalog.as_ref().map(|catalog| catalog.zones.as_slice())
    }

    fn loaded_zones(&self) -> Result<&[ZoneEntry], ApiError> {
        self.zones().ok_or(ApiError::NotLoaded)
    }

    fn find_zone(&self, slug: &str) -> Result<&ZoneEntry, ApiError> {
        self.loaded_zones()?
            .iter()
            .find(|zone| zone.slug == slug)
            .ok_or_else(|| ApiError::ZoneNotFound {
                slug: slug.to_owned(),
            })
    }

    /// Zone with the given slug.
    pub fn zone(&self, slug: &str) -> Result<Zone<C>, ApiError> {
        let entry = self.find_zone(slug)?;
        Ok(Zone::new(
            entry.clone(),
            Arc::clone(&self.client),
            self.options.url_pattern(),
        ))
    }

    /// The zone whose slug is literally `default`.
    pub fn default_zone(&self) -> Result<Zone<C>, ApiError> {
        self.zone(DEFAULT_ZONE)
    }

    /// Resolve optional route parameters to a concrete zone/version pair.
    ///
    /// A missing zone means `default`; a missing version means the zone's
    /// version flagged default.
    pub fn closest_zone_and_version(
        &self,
        zone: Option<&str>,
        version: Option<&str>,
    ) -> Result<VersionKey, ApiError> {
        let zone_slug = zone.unwrap_or(DEFAULT_ZONE);
        let entry = self.find_zone(zone_slug)?;

        let found = match version {
            Some(no) => entry.versions.iter().find(|v| v.no == no),
            None => entry.versions.iter().find(|v| v.default),
        };
        let found = found.ok_or_else(|| ApiError::ClosestVersionNotFound {
            zone: zone_slug.to_owned(),
            version: version.unwrap_or("default").to_owned(),
        })?;

        Ok(VersionKey::new(&entry.slug, &found.no))
    }

    /// Whether `route_name` is the configured doc route.
    pub fn is_doc_route(&self, route_name: Option<&str>) -> bool {
        match (route_name, &self.options.route) {
            (Some(name), Some(route)) => !name.is_empty() && route.name == name,
            _ => false,
        }
    }
}

/// GET `path` and decode the JSON body.
pub(crate) async fn fetch<T, C>(client: &C, path: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    C: HttpClient,
{
    fetch_with(client, path, &[], None).await
}

/// GET `path` with query params and an optional cancel token.
pub(crate) async fn fetch_with<T, C>(
    client: &C,
    path: &str,
    params: &[(&str, &str)],
    cancel: Option<CancelToken>,
) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    C: HttpClient,
{
    let value = client.get(path, params, cancel).await?;
    serde_json::from_value(value).map_err(|source| ApiError::Decode {
        path: path.to_owned(),
        source,
    })
}
