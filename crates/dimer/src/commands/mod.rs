//! CLI command implementations.

pub(crate) mod doc;
pub(crate) mod search;
pub(crate) mod tree;
pub(crate) mod url;
pub(crate) mod zones;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use dimer_api::{
    Dimer, DimerOptions, DocsSession, HttpClient, RouteParams, UreqClient, Version,
};
use dimer_config::{CliSettings, Config};
use tracing::info;

use crate::error::CliError;

pub(crate) use doc::DocArgs;
pub(crate) use search::SearchArgs;
pub(crate) use url::UrlArgs;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover dimer.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the dimer API (overrides config).
    #[arg(long, global = true, env = "DIMER_API_URL")]
    api_url: Option<String>,

    /// Zone slug (default: "default").
    #[arg(short, long, global = true)]
    zone: Option<String>,

    /// Version number (default: the zone's default version).
    #[arg(id = "doc_version", long = "doc-version", global = true)]
    version: Option<String>,

    /// HTTP timeout in seconds (overrides config).
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable verbose output (request and cache logs).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Loaded configuration plus a session with the catalog fetched.
pub(crate) struct Context<C> {
    pub config: Config,
    pub session: DocsSession<C>,
    pub route: RouteParams,
}

impl GlobalArgs {
    /// Overrides carried by the global flags.
    pub(crate) fn cli_settings(&self) -> CliSettings {
        CliSettings {
            api_url: self.api_url.clone(),
            timeout_secs: self.timeout,
            ..CliSettings::default()
        }
    }

    /// Load the config file named by `--config` (or discovered) with `settings` applied.
    pub(crate) fn load_config(&self, settings: &CliSettings) -> Result<Config, CliError> {
        Ok(Config::load(self.config.as_deref(), Some(settings))?)
    }
}

impl Context<UreqClient> {
    /// Load config and connect to the configured API.
    pub(crate) async fn connect(
        args: &GlobalArgs,
        settings: &CliSettings,
    ) -> Result<Self, CliError> {
        let config = args.load_config(settings)?;
        info!(
            api_url = %config.api.url,
            timeout_secs = config.api.timeout_secs,
            config = ?config.config_path,
            "connecting"
        );

        let client = Arc::new(UreqClient::with_timeout(
            &config.api.url,
            Duration::from_secs(config.api.timeout_secs),
        ));
        let route = RouteParams {
            zone: args.zone.clone(),
            version: args.version.clone(),
            permalink: None,
        };
        Self::new(config, client, route).await
    }
}

impl<C: HttpClient + 'static> Context<C> {
    /// Build a session on `client` and load the catalog.
    pub(crate) async fn new(
        config: Config,
        client: Arc<C>,
        route: RouteParams,
    ) -> Result<Self, CliError> {
        let mut options = DimerOptions::new(config.api.url.as_str());
        if let Some(doc_route) = &config.route {
            options = options.with_route(doc_route.name.as_str(), doc_route.path.as_str());
        }

        let mut session = DocsSession::new(Dimer::new(options, client)?);
        session.load(false).await?;

        Ok(Self {
            config,
            session,
            route,
        })
    }

    /// Version selected by `--zone` and `--doc-version`.
    pub(crate) fn version(&self) -> Result<Arc<Version<C>>, CliError> {
        Ok(self.session.active_version(&self.route)?)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use dimer_api::http::MockClient;
    use serde_json::json;

    /// Mock API with one documented zone.
    pub(crate) fn client() -> MockClient {
        MockClient::new()
            .with_json("config.json", json!({ "title": "Docs" }))
            .with_json(
                "zones.json",
                json!([
                    {
                        "slug": "default",
                        "name": "Guides",
                        "versions": [
                            { "no": "1.0", "name": "Stable", "default": true },
                            { "no": "2.0" }
                        ]
                    },
                    {
                        "slug": "api",
                        "versions": [{ "no": "master" }]
                    }
                ]),
            )
            .with_json(
                "default/versions/1.0.json",
                json!([
                    {
                        "category": "Basics",
                        "docs": [
                            { "permalink": "/introduction/", "title": "Introduction" },
                            { "permalink": "setup" }
                        ]
                    }
                ]),
            )
    }

    pub(crate) fn config() -> Config {
        let mut config = Config::default();
        config.api.url = "http://localhost:5000/api".to_owned();
        config
    }

    pub(crate) async fn context(client: MockClient) -> Context<MockClient> {
        Context::new(config(), Arc::new(client), RouteParams::default())
            .await
            .unwrap()
    }
}
