//! Mock HTTP client for testing.
//!
//! Provides [`MockClient`] for exercising the API objects without a server.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tokio::sync::watch;

use super::{CancelToken, HttpClient};
use crate::error::HttpError;

/// A request recorded by [`MockClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockRequest {
    /// Path without leading slash.
    pub path: String,
    /// Query parameters in request order.
    pub params: Vec<(String, String)>,
}

impl MockRequest {
    /// Value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

type Handler = Arc<dyn Fn(&MockRequest) -> Result<Value, HttpError> + Send + Sync>;

enum Reply {
    Json(Value),
    Failure { status: u16, body: String },
    Handler(Handler),
}

/// Mock HTTP client for testing.
///
/// Replies are registered per path (leading slashes ignored). Unregistered
/// paths answer with a 404 response error. A gated path holds every request
/// until [`open_gate`](Self::open_gate) is called, or until the request's
/// cancel token fires.
///
/// # Example
///
/// ```ignore
/// use dimer_api::{HttpClient, MockClient};
/// use serde_json::json;
///
/// let client = MockClient::new()
///     .with_json("config.json", json!({}))
///     .with_failure("zones.json", 500);
///
/// let config = client.get("/config.json", &[], None).await.unwrap();
/// ```
#[derive(Default)]
pub struct MockClient {
    replies: RwLock<HashMap<String, Reply>>,
    gates: RwLock<HashMap<String, watch::Sender<bool>>>,
    requests: RwLock<Vec<MockRequest>>,
}

impl std::fmt::Debug for MockClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockClient")
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}

fn normalize(path: &str) -> String {
    path.trim_start_matches('/').to_owned()
}

impl MockClient {
    /// Create a mock with no replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with `value`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_json(self, path: &str, value: Value) -> Self {
        self.set_json(path, value);
        self
    }

    /// Answer `path` with an error status.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, path: &str, status: u16) -> Self {
        self.replies.write().unwrap().insert(
            normalize(path),
            Reply::Failure {
                status,
                body: format!("mock failure for {path}"),
            },
        );
        self
    }

    /// Answer `path` by calling `handler` with the request.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_handler<H>(self, path: &str, handler: H) -> Self
    where
        H: Fn(&MockRequest) -> Result<Value, HttpError> + Send + Sync + 'static,
    {
        self.replies
            .write()
            .unwrap()
            .insert(normalize(path), Reply::Handler(Arc::new(handler)));
        self
    }

    /// Hold requests to `path` until the gate is opened.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_gate(self, path: &str) -> Self {
        let (tx, _rx) = watch::channel(false);
        self.gates.write().unwrap().insert(normalize(path), tx);
        self
    }

    /// Replace the reply for `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_json(&self, path: &str, value: Value) {
        self.replies
            .write()
            .unwrap()
            .insert(normalize(path), Reply::Json(value));
    }

    /// Release held and future requests to `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn open_gate(&self, path: &str) {
        if let Some(gate) = self.gates.read().unwrap().get(&normalize(path)) {
            gate.send_replace(true);
        }
    }

    /// All requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Number of requests received for `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn request_count(&self, path: &str) -> usize {
        let path = normalize(path);
        self.requests
            .read()
            .unwrap()
            .iter()
            .filter(|request| request.path == path)
            .count()
    }

    fn reply(&self, request: &MockRequest) -> Result<Value, HttpError> {
        match self.replies.read().unwrap().get(&request.path) {
            Some(Reply::Json(value)) => Ok(value.clone()),
            Some(Reply::Failure { status, body }) => Err(HttpError::Response {
                status: *status,
                body: body.clone(),
            }),
            Some(Reply::Handler(handler)) => handler(request),
            None => Err(HttpError::Response {
                status: 404,
                body: format!("no mock reply for {}", request.path),
            }),
        }
    }
}

impl HttpClient for MockClient {
    fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
        cancel: Option<CancelToken>,
    ) -> impl Future<Output = Result<Value, HttpError>> + Send {
        let request = MockRequest {
            path: normalize(path),
            params: params
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        };
        self.requests.write().unwrap().push(request.clone());

        let gate = self
            .gates
            .read()
            .unwrap()
            .get(&request.path)
            .map(watch::Sender::subscribe);
        let reply = self.reply(&request);

        async move {
            if let Some(mut gate) = gate {
                let opened = async move {
                    let _ = gate.wait_for(|open| *open).await;
                };
                match &cancel {
                    Some(token) => tokio::select! {
                        () = opened => {}
                        () = token.cancelled() => return Err(HttpError::Cancelled),
                    },
                    None => opened.await,
                }
            }

            if cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Err(HttpError::Cancelled);
            }
            reply
        }
    }
}
