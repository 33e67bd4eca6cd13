//! Client for the dimer documentation API.
//!
//! The API is a static set of JSON files served relative to a base URL:
//!
//! ```text
//! config.json                          site configuration
//! zones.json                           zones and their versions
//! {zone}/versions/{no}.json            navigation tree of a version
//! {zone}/versions/{no}/{permalink}.json document
//! {zone}/versions/{no}/search.json     search endpoint (query, limit)
//! ```
//!
//! # Architecture
//!
//! - [`Dimer`]: root object. Loads the catalog once and resolves zones and
//!   versions, including the "closest" version for route parameters.
//! - [`Zone`] and [`Version`]: views over catalog entries. A [`Version`]
//!   caches its tree, memoizes document URLs, and keeps at most one search
//!   in flight: starting a search cancels the previous one.
//! - [`DocsSession`]: reuses [`Version`] instances across route changes.
//! - [`http`]: the [`HttpClient`] capability with a `ureq` implementation
//!   and, behind the `mock` feature, a canned-response client.
//!
//! # Example
//!
//! ```ignore
//! use dimer_api::{Dimer, DimerOptions};
//!
//! let mut dimer = Dimer::connect(DimerOptions::new("http://localhost:5000/api"))?;
//! dimer.load(false).await?;
//!
//! let key = dimer.closest_zone_and_version(None, None)?;
//! let version = dimer.zone(&key.zone_slug)?.version(&key.version_no)?;
//! let tree = version.tree(false).await?;
//! println!("{}", version.make_url(&tree[0].docs[0].permalink));
//! ```

mod dimer;
mod error;
pub mod http;
mod session;
mod types;
mod version;
mod zone;

pub use dimer::{DEFAULT_DOC_URL_PATTERN, DEFAULT_ZONE, Dimer, DimerOptions, DocRoute};
pub use error::{ApiError, HttpError};
pub use http::{CancelSource, CancelToken, HttpClient, UreqClient};
pub use session::{DocsSession, RouteParams, VersionSearch};
pub use types::{
    Catalog, Doc, SearchHit, TreeCategory, TreeDoc, VersionEntry, VersionKey, ZoneEntry,
};
pub use version::{DEFAULT_SEARCH_LIMIT, Version};
pub use zone::Zone;
