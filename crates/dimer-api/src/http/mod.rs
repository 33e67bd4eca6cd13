//! HTTP client capability.
//!
//! The API objects only need `GET` requests returning JSON, relative to a
//! base URL, with optional cancellation. [`HttpClient`] captures that;
//! [`UreqClient`] is the production implementation and `MockClient` (behind
//! the `mock` feature) serves canned responses for tests.

mod agent;
mod cancel;
#[cfg(any(test, feature = "mock"))]
mod mock;

use std::future::Future;

use serde_json::Value;

pub use agent::{DEFAULT_TIMEOUT, UreqClient};
pub use cancel::{CancelSource, CancelToken};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockClient, MockRequest};

use crate::error::HttpError;

/// Asynchronous JSON `GET` capability.
pub trait HttpClient: Send + Sync {
    /// Fetch `path` (relative to the client's base URL) with query `params`.
    ///
    /// When `cancel` is given and its source is cancelled before the response
    /// arrives, the call fails with [`HttpError::Cancelled`].
    fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
        cancel: Option<CancelToken>,
    ) -> impl Future<Output = Result<Value, HttpError>> + Send;
}
