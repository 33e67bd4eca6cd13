//! Route-driven access to versions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::{Id, JoinSet};
use tracing::debug;

use crate::dimer::Dimer;
use crate::error::{ApiError, HttpError};
use crate::http::HttpClient;
use crate::types::{SearchHit, VersionKey};
use crate::version::Version;

/// Parameters supplied by the host router.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteParams {
    /// Zone slug; `default` when absent.
    pub zone: Option<String>,
    /// Version number; the zone's default when absent.
    pub version: Option<String>,
    /// Document permalink.
    pub permalink: Option<String>,
}

/// Search results of one zone/version.
#[derive(Debug)]
pub struct VersionSearch {
    /// Which version was searched.
    pub key: VersionKey,
    /// Hits, or `None` when the search was superseded.
    pub hits: Result<Option<Vec<SearchHit>>, ApiError>,
}

/// A loaded [`Dimer`] plus the [`Version`] instances created for it.
///
/// Versions are created on first use and reused afterwards, so their tree
/// and URL caches survive across route changes.
#[derive(Debug)]
pub struct DocsSession<C> {
    dimer: Dimer<C>,
    versions: Mutex<HashMap<VersionKey, Arc<Version<C>>>>,
}

impl<C: HttpClient + 'static> DocsSession<C> {
    /// Wrap `dimer`.
    pub fn new(dimer: Dimer<C>) -> Self {
        Self {
            dimer,
            versions: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped API object.
    pub fn dimer(&self) -> &Dimer<C> {
        &self.dimer
    }

    /// Load the catalog. A forced reload also drops every cached version.
    pub async fn load(&mut self, force: bool) -> Result<(), ApiError> {
        self.dimer.load(force).await?;
        if force {
            self.versions
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
        Ok(())
    }

    /// Version for `key`, created on first use.
    pub fn version(&self, key: &VersionKey) -> Result<Arc<Version<C>>, ApiError> {
        let mut versions = self.versions.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(version) = versions.get(key) {
            return Ok(Arc::clone(version));
        }

        let version = Arc::new(self.dimer.zone(&key.zone_slug)?.version(&key.version_no)?);
        debug!(zone = %key.zone_slug, version = %key.version_no, "version created");
        versions.insert(key.clone(), Arc::clone(&version));
        Ok(version)
    }

    /// Version addressed by the current route.
    pub fn active_version(&self, params: &RouteParams) -> Result<Arc<Version<C>>, ApiError> {
        let key = self
            .dimer
            .closest_zone_and_version(params.zone.as_deref(), params.version.as_deref())?;
        self.version(&key)
    }

    /// Search several versions concurrently.
    ///
    /// Results come back in the order of `keys`. A lookup failure for one key
    /// is reported in its entry without affecting the others, as is a search
    /// task that panics (`HttpError::Worker`).
    ///
    /// Keys naming the same version share one [`Version`], whose searches
    /// supersede each other: all but one of the duplicate entries end up
    /// `Ok(None)`.
    pub async fn search_all(
        &self,
        keys: &[VersionKey],
        query: &str,
        limit: usize,
    ) -> Vec<VersionSearch> {
        let mut results: Vec<Option<VersionSearch>> = keys.iter().map(|_| None).collect();
        let mut tasks = JoinSet::new();
        let mut indexes: HashMap<Id, usize> = HashMap::new();

        for (index, key) in keys.iter().enumerate() {
            match self.version(key) {
                Ok(version) => {
                    let query = query.to_owned();
                    let task = tasks.spawn(async move { version.search(&query, limit).await });
                    indexes.insert(task.id(), index);
                }
                Err(err) => {
                    results[index] = Some(VersionSearch {
                        key: key.clone(),
                        hits: Err(err),
                    });
                }
            }
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, hits) = match joined {
                Ok((id, hits)) => (id, hits),
                Err(err) => {
                    debug!(error = %err, "search task failed");
                    (err.id(), Err(ApiError::Http(HttpError::Worker(err))))
                }
            };
            if let Some(&index) = indexes.get(&id) {
                results[index] = Some(VersionSearch {
                    key: keys[index].clone(),
                    hits,
                });
            }
        }

        results
            .into_iter()
            .zip(keys)
            .map(|(result, key)| {
                result.unwrap_or_else(|| VersionSearch {
                    key: key.clone(),
                    hits: Err(ApiError::Http(HttpError::Cancelled)),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimer::DimerOptions;
    use crate::http::MockClient;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn client() -> MockClient {
        MockClient::new()
            .with_json("config.json", json!({}))
            .with_json(
                "zones.json",
                json!([
                    {
                        "slug": "default",
                        "versions": [{ "no": "1.0", "default": true }, { "no": "2.0" }]
                    },
                    {
                        "slug": "api",
                        "versions": [{ "no": "master", "default": true }]
                    }
                ]),
            )
            .with_handler("default/versions/1.0/search.json", |request| {
                Ok(json!([{ "title": { "marks": [{ "type": "raw", "text": request.param("query") }] } }]))
            })
            .with_handler("api/versions/master/search.json", |_| {
                Ok(json!([
                    { "title": { "marks": [{ "type": "raw", "text": "one" }] } },
                    { "title": { "marks": [{ "type": "raw", "text": "two" }] } }
                ]))
            })
    }

    async fn session(client: Arc<MockClient>) -> DocsSession<MockClient> {
        let dimer = Dimer::new(
            DimerOptions::new("http://localhost:3000").with_route("doc", ":zone/:version/:permalink"),
            client,
        )
        .unwrap();
        let mut session = DocsSession::new(dimer);
        session.load(false).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_active_version_defaults() {
        let session = session(Arc::new(client())).await;

        let version = session.active_version(&RouteParams::default()).unwrap();
        assert_eq!(version.key(), VersionKey::new("default", "1.0"));

        let params = RouteParams {
            zone: Some("default".to_owned()),
            version: Some("2.0".to_owned()),
            permalink: Some("intro".to_owned()),
        };
        let version = session.active_version(&params).unwrap();
        assert_eq!(version.make_url("intro").as_ref(), "/default/2.0/intro");
    }

    #[tokio::test]
    async fn test_versions_are_reused() {
        let session = session(Arc::new(client())).await;

        let first = session.active_version(&RouteParams::default()).unwrap();
        let second = session.version(&VersionKey::new("default", "1.0")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_forced_load_drops_versions() {
        let client = Arc::new(client());
        let mut session = session(Arc::clone(&client)).await;
        let before = session.version(&VersionKey::new("api", "master")).unwrap();

        session.load(true).await.unwrap();
        let after = session.version(&VersionKey::new("api", "master")).unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(client.request_count("zones.json"), 2);
    }

    #[tokio::test]
    async fn test_unknown_version() {
        let session = session(Arc::new(client())).await;
        let err = session
            .version(&VersionKey::new("api", "9.9"))
            .unwrap_err();
        assert!(matches!(err, ApiError::VersionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_search_all_keeps_key_order() {
        let session = session(Arc::new(client())).await;
        let keys = [
            VersionKey::new("api", "master"),
            VersionKey::new("missing", "1"),
            VersionKey::new("default", "1.0"),
        ];

        let results = session.search_all(&keys, "tabs", 5).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].key, keys[0]);
        assert_eq!(results[0].hits.as_ref().unwrap().as_ref().unwrap().len(), 2);
        assert!(matches!(results[1].hits, Err(ApiError::ZoneNotFound { .. })));
        let hits = results[2].hits.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(hits[0].title.plain_text(), "tabs");
    }

    #[tokio::test]
    async fn test_search_all_reports_panicked_task() {
        let client = client().with_handler("api/versions/master/search.json", |_| {
            panic!("search handler failed")
        });
        let session = session(Arc::new(client)).await;
        let keys = [
            VersionKey::new("api", "master"),
            VersionKey::new("default", "1.0"),
        ];

        let results = session.search_all(&keys, "tabs", 5).await;

        assert_eq!(results[0].key, keys[0]);
        assert!(
            matches!(results[0].hits, Err(ApiError::Http(HttpError::Worker(_)))),
            "{:?}",
            results[0].hits
        );
        let hits = results[1].hits.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(hits[0].title.plain_text(), "tabs");
    }

    #[tokio::test]
    async fn test_search_all_duplicate_keys_supersede() {
        let path = "default/versions/1.0/search.json";
        let client = Arc::new(client().with_gate(path));
        let session = session(Arc::clone(&client)).await;
        let keys = [
            VersionKey::new("default", "1.0"),
            VersionKey::new("default", "1.0"),
        ];

        let release = async {
            while client.request_count(path) < 2 {
                tokio::task::yield_now().await;
            }
            client.open_gate(path);
        };
        let (results, ()) = tokio::join!(session.search_all(&keys, "tabs", 5), release);

        let outcomes: Vec<bool> = results
            .iter()
            .map(|result| result.hits.as_ref().unwrap().is_some())
            .collect();
        assert_eq!(outcomes.iter().filter(|answered| **answered).count(), 1);
        assert!(results.iter().all(|result| result.key == keys[0]));
    }
}
