//! Error types for the dimer API client.

/// Error from the HTTP transport.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HttpError {
    /// HTTP request failed (network error, timeout, malformed body).
    #[error("HTTP request failed")]
    Request(#[from] ureq::Error),

    /// Server answered with an error status.
    #[error("HTTP error: {status} - {body}")]
    Response {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// The request was cancelled through its token.
    #[error("request cancelled")]
    Cancelled,

    /// The blocking worker running the request failed.
    #[error("HTTP worker failed")]
    Worker(#[from] tokio::task::JoinError),
}

impl HttpError {
    /// Whether the request was aborted by cancellation rather than failing.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Error from dimer API operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// No API URL was configured.
    #[error("api url is required to instantiate a dimer instance")]
    MissingApiUrl,

    /// The doc route has no path pattern.
    #[error("define the path for the route that will render the doc")]
    MissingRoutePath,

    /// The doc route has no name.
    #[error("define the name of the route that will render the doc")]
    MissingRouteName,

    /// Catalog lookups were attempted before [`Dimer::load`](crate::Dimer::load).
    #[error("make sure to call Dimer::load first")]
    NotLoaded,

    /// No zone has the requested slug.
    #[error("there isn't any zone with {slug} slug")]
    ZoneNotFound {
        /// Requested slug.
        slug: String,
    },

    /// The zone has no version with the requested number.
    #[error("version {version} doesn't exist inside {zone} zone")]
    VersionNotFound {
        /// Zone slug.
        zone: String,
        /// Requested version number.
        version: String,
    },

    /// No version of the zone is flagged as default.
    #[error("{zone} zone doesn't have a default version")]
    NoDefaultVersion {
        /// Zone slug.
        zone: String,
    },

    /// Route resolution could not find a version.
    #[error(
        "unable to find {version} version in {zone} zone. It is recommended to define a default version"
    )]
    ClosestVersionNotFound {
        /// Zone slug.
        zone: String,
        /// Requested version number, or `default`.
        version: String,
    },

    /// Transport failure.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Response body did not match the expected shape.
    #[error("unexpected response from {path}")]
    Decode {
        /// Requested path.
        path: String,
        /// Deserialization error.
        #[source]
        source: serde_json::Error,
    },
}
