//! Configuration management for dimer.
//!
//! Parses `dimer.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `api.url`
//!
//! ## Example
//!
//! ```toml
//! [api]
//! url = "${DIMER_API_URL:-http://localhost:5000/api}"
//! timeout_secs = 10
//!
//! [route]
//! name = "doc"
//! path = ":zone/:version/:permalink"
//!
//! [render]
//! tabs_class = "tabs"
//!
//! [search]
//! limit = 20
//! ```

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "dimer.toml";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of search hits requested.
const DEFAULT_SEARCH_LIMIT: usize = 10;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override API base URL.
    pub api_url: Option<String>,
    /// Override HTTP timeout.
    pub timeout_secs: Option<u64>,
    /// Override search result limit.
    pub search_limit: Option<usize>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API connection.
    pub api: ApiConfig,
    /// Doc route the site is mounted under (optional section).
    pub route: Option<RouteConfig>,
    /// Widget class names.
    pub render: RenderConfig,
    /// Search settings.
    pub search: SearchConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// API connection configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the JSON API.
    pub url: String,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Doc route configuration.
#[derive(Debug, Deserialize)]
pub struct RouteConfig {
    /// Route name the host router uses for documents.
    pub name: String,
    /// URL pattern with `:zone`, `:version` and `:permalink` tokens.
    pub path: String,
}

/// Class names recognized by the tab and collapse renderers.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Marker class of tab containers.
    pub tabs_class: String,
    /// Class of the element wrapping rendered tabs.
    pub tabs_wrapper_class: String,
    /// Marker class of collapsible sections.
    pub collapse_class: String,
    /// Class of the element wrapping rendered collapsible sections.
    pub collapse_wrapper_class: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tabs_class: "tabs".to_owned(),
            tabs_wrapper_class: "dimer-tabs-wrapper".to_owned(),
            collapse_class: "collapse".to_owned(),
            collapse_wrapper_class: "dimer-collapse-wrapper".to_owned(),
        }
    }
}

/// Search configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of hits requested per search.
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`api.url`").
        field: String,
        /// Error message (e.g., "${`DIMER_API_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `dimer.toml` in the current directory and parents,
    /// falling back to defaults.
    ///
    /// CLI settings are applied after loading, so they take precedence over
    /// file values. The merged configuration is validated last.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(api_url) = &settings.api_url {
            self.api.url.clone_from(api_url);
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.api.timeout_secs = timeout_secs;
        }
        if let Some(limit) = settings.search_limit {
            self.search.limit = limit;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`] after CLI settings are applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_api()?;
        self.validate_route()?;
        self.validate_render()?;

        if self.search.limit == 0 {
            return Err(ConfigError::Validation(
                "search.limit must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_api(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.api.url, "api.url")?;
        require_http_url(&self.api.url, "api.url")?;
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_route(&self) -> Result<(), ConfigError> {
        if let Some(route) = &self.route {
            require_non_empty(&route.name, "route.name")?;
            require_non_empty(&route.path, "route.path")?;
        }
        Ok(())
    }

    fn validate_render(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.render.tabs_class, "render.tabs_class")?;
        require_non_empty(&self.render.collapse_class, "render.collapse_class")
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.api.url = expand::expand_env(&self.api.url, "api.url")?;
        Ok(())
    }
}
