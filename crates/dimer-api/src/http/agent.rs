//! `ureq`-backed HTTP client.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use ureq::Agent;

use super::{CancelToken, HttpClient};
use crate::error::HttpError;

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Production HTTP client.
///
/// `ureq` is blocking, so every request runs on tokio's blocking pool. A
/// cancelled request returns immediately; the worker thread finishes the
/// transfer in the background and its result is discarded.
#[derive(Clone)]
pub struct UreqClient {
    agent: Agent,
    base_url: String,
}

impl std::fmt::Debug for UreqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UreqClient {
    /// Create a client for `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT))
    }

    /// Create a client for `base_url` with a global request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`. Leading slashes on `path` are optional.
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl HttpClient for UreqClient {
    fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
        cancel: Option<CancelToken>,
    ) -> impl Future<Output = Result<Value, HttpError>> + Send {
        let agent = self.agent.clone();
        let url = self.url(path);
        let params: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();

        async move {
            debug!(%url, "GET");
            let request = tokio::task::spawn_blocking(move || fetch_json(&agent, &url, &params));

            match cancel {
                Some(token) => tokio::select! {
                    result = request => result?,
                    () = token.cancelled() => Err(HttpError::Cancelled),
                },
                None => request.await?,
            }
        }
    }
}

fn fetch_json(agent: &Agent, url: &str, params: &[(String, String)]) -> Result<Value, HttpError> {
    let response = agent
        .get(url)
        .query_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .header("Accept", "application/json")
        .call()?;

    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(HttpError::Response {
            status,
            body: error_body,
        });
    }

    Ok(body_reader.read_json()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = UreqClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_url_join_normalizes_leading_slash() {
        let client = UreqClient::new("http://localhost:5000/api/");
        assert_eq!(client.url("config.json"), "http://localhost:5000/api/config.json");
        assert_eq!(client.url("/zones.json"), "http://localhost:5000/api/zones.json");
    }
}
