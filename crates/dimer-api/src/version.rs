//! Version of a zone: tree, documents, search and URLs.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::dimer::{fetch, fetch_with};
use crate::error::ApiError;
use crate::http::{CancelSource, HttpClient};
use crate::types::{Doc, SearchHit, TreeCategory, VersionEntry, VersionKey};

/// Default number of search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The search request currently owned by a [`Version`].
struct InFlight {
    id: u64,
    source: CancelSource,
}

/// One version of a zone.
///
/// Caches the document tree until an explicit reload and memoizes document
/// URLs forever. At most one search is in flight per instance: starting a
/// search cancels the previous one.
pub struct Version<C> {
    zone_slug: String,
    entry: VersionEntry,
    client: Arc<C>,
    api_base: String,
    app_base: String,
    tree: Mutex<Option<Arc<Vec<TreeCategory>>>>,
    urls: Mutex<HashMap<String, Arc<str>>>,
    search: Mutex<Option<InFlight>>,
    search_ids: AtomicU64,
}

impl<C> fmt::Debug for Version<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Version")
            .field("zone_slug", &self.zone_slug)
            .field("no", &self.entry.no)
            .field("api_base", &self.api_base)
            .field("app_base", &self.app_base)
            .finish_non_exhaustive()
    }
}

impl<C: HttpClient> Version<C> {
    pub(crate) fn new(
        zone_slug: &str,
        entry: VersionEntry,
        client: Arc<C>,
        url_pattern: &str,
    ) -> Self {
        let api_base = format!("{zone_slug}/versions/{}", entry.no);
        let app_base = url_pattern
            .replacen(":zone", zone_slug, 1)
            .replacen(":version", &entry.no, 1);
        let app_base = app_base
            .strip_prefix('/')
            .map_or_else(|| app_base.clone(), str::to_owned);

        Self {
            zone_slug: zone_slug.to_owned(),
            entry,
            client,
            api_base,
            app_base,
            tree: Mutex::new(None),
            urls: Mutex::new(HashMap::new()),
            search: Mutex::new(None),
            search_ids: AtomicU64::new(0),
        }
    }

    /// Version number.
    pub fn no(&self) -> &str {
        &self.entry.no
    }

    /// Slug of the owning zone.
    pub fn zone_slug(&self) -> &str {
        &self.zone_slug
    }

    /// Catalog descriptor.
    pub fn entry(&self) -> &VersionEntry {
        &self.entry
    }

    /// Zone/version key.
    pub fn key(&self) -> VersionKey {
        VersionKey::new(&self.zone_slug, &self.entry.no)
    }

    /// API path prefix, `{zone}/versions/{no}`.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Document tree, fetched on first use or when `reload` is set.
    pub async fn tree(&self, reload: bool) -> Result<Arc<Vec<TreeCategory>>, ApiError> {
        if !reload {
            let cached = lock(&self.tree).clone();
            if let Some(tree) = cached {
                debug!(version = %self.api_base, "tree cache hit");
                return Ok(tree);
            }
        }

        let path = format!("{}.json", self.api_base);
        let tree: Arc<Vec<TreeCategory>> = Arc::new(fetch(&*self.client, &path).await?);
        debug!(version = %self.api_base, categories = tree.len(), "tree fetched");

        *lock(&self.tree) = Some(Arc::clone(&tree));
        Ok(tree)
    }

    /// Fetch a single document. Documents are never cached.
    pub async fn doc(&self, permalink: &str) -> Result<Doc, ApiError> {
        let path = format!("{}/{}.json", self.api_base, trim_slashes(permalink));
        fetch(&*self.client, &path).await
    }

    /// Search this version.
    ///
    /// An empty query returns no hits without a request. Starting a search
    /// cancels the one still in flight on this instance; the superseded call
    /// returns `Ok(None)` instead of an error.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Option<Vec<SearchHit>>, ApiError> {
        if query.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let id = self.search_ids.fetch_add(1, Ordering::Relaxed) + 1;
        let source = CancelSource::new();
        let token = source.token();
        let previous = lock(&self.search).replace(InFlight { id, source });
        if let Some(previous) = previous {
            debug!(superseded = previous.id, id, "cancelling previous search");
            previous.source.cancel();
        }

        let path = format!("{}/search.json", self.api_base);
        let limit = limit.to_string();
        let result = fetch_with(
            &*self.client,
            &path,
            &[("query", query), ("limit", limit.as_str())],
            Some(token.clone()),
        )
        .await;

        {
            let mut slot = lock(&self.search);
            if slot.as_ref().is_some_and(|current| current.id == id) {
                *slot = None;
            }
        }

        match result {
            Ok(hits) if !token.is_cancelled() => Ok(Some(hits)),
            Ok(_) => Ok(None),
            Err(ApiError::Http(err)) if err.is_cancellation() => {
                debug!(id, "search superseded");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Application URL of a document.
    ///
    /// One leading and one trailing slash are trimmed from `permalink`.
    /// Results are memoized per permalink and shared.
    pub fn make_url(&self, permalink: &str) -> Arc<str> {
        let mut urls = lock(&self.urls);
        if let Some(url) = urls.get(permalink) {
            return Arc::clone(url);
        }

        let url: Arc<str> = format!(
            "/{}",
            self.app_base.replacen(":permalink", trim_slashes(permalink), 1)
        )
        .into();
        urls.insert(permalink.to_owned(), Arc::clone(&url));
        url
    }
}

/// Strip one leading and one trailing slash.
fn trim_slashes(permalink: &str) -> &str {
    let permalink = permalink.strip_prefix('/').unwrap_or(permalink);
    permalink.strip_suffix('/').unwrap_or(permalink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockClient;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    const SEARCH: &str = "dev-guides/versions/master/search.json";

    fn entry(no: &str) -> VersionEntry {
        serde_json::from_value(json!({ "no": no, "default": true })).unwrap()
    }

    fn version(client: &Arc<MockClient>, pattern: &str) -> Version<MockClient> {
        Version::new("dev-guides", entry("master"), Arc::clone(client), pattern)
    }

    fn hits_for(query: &str, count: usize) -> Value {
        (0..count)
            .map(|i| {
                json!({
                    "title": { "marks": [{ "type": "raw", "text": format!("{query} {i}") }] },
                    "body": []
                })
            })
            .collect()
    }

    fn search_client() -> MockClient {
        MockClient::new().with_handler(SEARCH, |request| {
            let query = request.param("query").unwrap_or_default();
            let limit = request
                .param("limit")
                .and_then(|limit| limit.parse().ok())
                .unwrap_or(0);
            Ok(hits_for(query, limit))
        })
    }

    #[test]
    fn test_bases() {
        let client = Arc::new(MockClient::new());
        let version = version(&client, "/:zone/:version/:permalink");
        assert_eq!(version.api_base(), "dev-guides/versions/master");
        assert_eq!(version.key(), VersionKey::new("dev-guides", "master"));
    }

    #[test]
    fn test_make_url_trims_and_memoizes() {
        let client = Arc::new(MockClient::new());
        let version = version(&client, ":zone/:version/:permalink");

        let first = version.make_url("/foo/");
        let second = version.make_url("/foo/");

        assert_eq!(&*first, "/dev-guides/master/foo");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(&*version.make_url("foo"), "/dev-guides/master/foo");
    }

    #[test]
    fn test_make_url_without_version_token() {
        let client = Arc::new(MockClient::new());
        let version = version(&client, "/:zone/:permalink");
        assert_eq!(&*version.make_url("guides/intro"), "/dev-guides/guides/intro");
    }

    #[test]
    fn test_make_url_strips_one_slash_only() {
        let client = Arc::new(MockClient::new());
        let version = version(&client, ":zone/:version/:permalink");
        assert_eq!(&*version.make_url("//foo//"), "/dev-guides/master//foo/");
    }

    #[tokio::test]
    async fn test_tree_is_cached_until_reload() {
        let tree = json!([{ "category": "getting started", "docs": [{ "permalink": "foo" }] }]);
        let client = Arc::new(
            MockClient::new().with_json("dev-guides/versions/master.json", tree),
        );
        let version = version(&client, ":zone/:version/:permalink");

        let first = version.tree(false).await.unwrap();
        let second = version.tree(false).await.unwrap();

        assert_eq!(first[0].docs[0].permalink, "foo");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(client.request_count("dev-guides/versions/master.json"), 1);

        client.set_json(
            "dev-guides/versions/master.json",
            json!([{ "category": "reference", "docs": [] }]),
        );
        let reloaded = version.tree(true).await.unwrap();
        assert_eq!(reloaded[0].category, "reference");
        assert_eq!(client.request_count("dev-guides/versions/master.json"), 2);
        assert_eq!(version.tree(false).await.unwrap()[0].category, "reference");
    }

    #[tokio::test]
    async fn test_failed_tree_fetch_is_not_cached() {
        let client = Arc::new(MockClient::new().with_failure("dev-guides/versions/master.json", 500));
        let version = version(&client, ":zone/:version/:permalink");

        assert!(version.tree(false).await.is_err());
        assert!(version.tree(false).await.is_err());
        assert_eq!(client.request_count("dev-guides/versions/master.json"), 2);
    }

    #[tokio::test]
    async fn test_doc_is_always_fetched() {
        let client = Arc::new(MockClient::new().with_json(
            "dev-guides/versions/master/intro.json",
            json!({ "title": "Intro", "content": { "type": "root", "children": [] } }),
        ));
        let version = version(&client, ":zone/:version/:permalink");

        let doc = version.doc("intro").await.unwrap();
        version.doc("/intro/").await.unwrap();

        assert_eq!(doc.title.as_deref(), Some("Intro"));
        assert_eq!(client.request_count("dev-guides/versions/master/intro.json"), 2);
    }

    #[tokio::test]
    async fn test_search_default_and_custom_limit() {
        let client = Arc::new(search_client());
        let version = version(&client, "/:zone/:permalink");

        let hits = version.search("hello world", DEFAULT_SEARCH_LIMIT).await.unwrap();
        assert_eq!(hits.map(|h| h.len()), Some(10));

        let hits = version.search("hello world", 2).await.unwrap().unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title.plain_text(), "hello world 0");
        assert_eq!(client.requests()[1].param("limit"), Some("2"));
    }

    #[tokio::test]
    async fn test_empty_query_makes_no_request() {
        let client = Arc::new(search_client());
        let version = version(&client, "/:zone/:permalink");

        assert_eq!(version.search("", 10).await.unwrap(), Some(Vec::new()));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let client = Arc::new(MockClient::new().with_failure(SEARCH, 502));
        let version = version(&client, "/:zone/:permalink");

        assert!(matches!(
            version.search("x", 10).await,
            Err(ApiError::Http(crate::HttpError::Response { status: 502, .. }))
        ));
    }

    #[tokio::test]
    async fn test_newer_search_supersedes_older() {
        let client = Arc::new(search_client().with_gate(SEARCH));
        let version = Arc::new(version(&client, "/:zone/:permalink"));

        let first = tokio::spawn({
            let version = Arc::clone(&version);
            async move { version.search("a", 10).await }
        });
        while client.request_count(SEARCH) < 1 {
            tokio::task::yield_now().await;
        }

        let second = tokio::spawn({
            let version = Arc::clone(&version);
            async move { version.search("b", 10).await }
        });
        while client.request_count(SEARCH) < 2 {
            tokio::task::yield_now().await;
        }

        client.open_gate(SEARCH);

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap().unwrap();

        assert_eq!(first, None);
        assert_eq!(second.len(), 10);
        assert!(second.iter().all(|hit| hit.title.plain_text().starts_with("b ")));
    }

    #[tokio::test]
    async fn test_sequential_searches_are_independent() {
        let client = Arc::new(search_client());
        let version = version(&client, "/:zone/:permalink");

        assert!(version.search("a", 1).await.unwrap().is_some());
        assert!(version.search("b", 1).await.unwrap().is_some());
    }
}
