//! Types for dimer API responses.

use dimer_tree::ContentNode;
use dimer_tree::search::Marked;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Zone entry of the `zones.json` catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneEntry {
    /// Unique zone key.
    pub slug: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Published versions in catalog order.
    #[serde(default)]
    pub versions: Vec<VersionEntry>,
}

/// Version descriptor inside a [`ZoneEntry`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Version number, unique within the zone.
    pub no: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether this is the zone's default version.
    #[serde(default)]
    pub default: bool,
    /// Landing document, either a permalink or an object with a `permalink`.
    #[serde(rename = "heroDoc", default, skip_serializing_if = "Option::is_none")]
    pub hero_doc: Option<Value>,
}

impl VersionEntry {
    /// Permalink of the landing document.
    pub fn hero_permalink(&self) -> Option<&str> {
        match self.hero_doc.as_ref()? {
            Value::String(permalink) => Some(permalink),
            Value::Object(doc) => doc.get("permalink").and_then(Value::as_str),
            _ => None,
        }
    }
}

/// Site config and zone catalog, loaded together.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    /// Opaque site-wide settings from `config.json`.
    pub config: Value,
    /// Zones from `zones.json`.
    pub zones: Vec<ZoneEntry>,
}

/// Category of a version's document tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeCategory {
    /// Category title.
    pub category: String,
    /// Documents in display order.
    #[serde(default)]
    pub docs: Vec<TreeDoc>,
}

/// Document reference inside a [`TreeCategory`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeDoc {
    /// Document permalink.
    pub permalink: String,
    /// Document title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Any other fields the backend sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Doc {
    /// Document title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Document permalink.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    /// Content tree; absent for redirects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentNode>,
    /// Permalink this document redirects to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    /// Any other fields the backend sends.
    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

impl Doc {
    /// Whether the response is a redirect to another document.
    pub fn is_redirect(&self) -> bool {
        self.redirect.as_deref().is_some_and(|target| !target.is_empty())
    }
}

/// One search result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Highlighted title.
    pub title: Marked,
    /// Highlighted excerpts; the first one is displayed.
    #[serde(default)]
    pub body: Vec<Marked>,
    /// Any other fields the backend sends (`url`, `permalink`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchHit {
    /// First excerpt, if any.
    pub fn excerpt(&self) -> Option<&Marked> {
        self.body.first()
    }

    /// Permalink of the matched document, if the backend sent one.
    pub fn permalink(&self) -> Option<&str> {
        self.extra.get("permalink").and_then(Value::as_str)
    }
}

/// Key of a resolved zone/version pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionKey {
    /// Zone slug.
    pub zone_slug: String,
    /// Version number.
    pub version_no: String,
}

impl VersionKey {
    /// Create a key.
    pub fn new(zone_slug: impl Into<String>, version_no: impl Into<String>) -> Self {
        Self {
            zone_slug: zone_slug.into(),
            version_no: version_no.into(),
        }
    }
}
