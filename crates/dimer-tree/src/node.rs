//! Content node model.
//!
//! [`ContentNode`] mirrors the JSON tree emitted by the dimer markdown
//! pipeline:
//!
//! ```json
//! {
//!   "type": "element",
//!   "tag": "div",
//!   "props": { "className": ["tip"], "dataTitle": "Note" },
//!   "children": [{ "type": "text", "value": "Hello" }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RenderError;

/// Node attributes as supplied by the parser.
pub type Props = Map<String, Value>;

/// Props key holding the ordered class list.
pub(crate) const CLASS_NAME_KEY: &str = "className";

/// Node `type` marking a text leaf.
const TEXT_KIND: &str = "text";

/// Tag elided from every rendering.
const TITLE_SENTINEL: &str = "dimertitle";

/// One node of the markdown-derived content tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    /// Node type (`"text"` for leaves, `"element"` or `"root"` otherwise).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Element tag name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
    /// Attributes; `className` holds an ordered sequence of class names.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Props,
    /// Child nodes. Structural nodes always carry this, leaves don't.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ContentNode>>,
    /// Literal text of a text leaf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ContentNode {
    /// Create an element node with an empty children sequence.
    #[must_use]
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            kind: Some("element".to_owned()),
            tag: tag.into(),
            children: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Create a text leaf.
    #[must_use]
    pub fn text_node(value: impl Into<String>) -> Self {
        Self {
            kind: Some(TEXT_KIND.to_owned()),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Append a class name to `props.className`.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let entry = self
            .props
            .entry(CLASS_NAME_KEY)
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(classes) = entry {
            classes.push(Value::String(class.into()));
        }
        self
    }

    /// Set a prop.
    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Append a child, creating the children sequence if needed.
    #[must_use]
    pub fn with_child(mut self, child: ContentNode) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Append several children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = ContentNode>) -> Self {
        self.children.get_or_insert_with(Vec::new).extend(children);
        self
    }

    /// Whether this is a text leaf.
    pub fn is_text(&self) -> bool {
        self.kind.as_deref() == Some(TEXT_KIND)
    }

    /// Whether this node is a title sentinel that never renders.
    pub fn is_elided(&self) -> bool {
        self.tag.eq_ignore_ascii_case(TITLE_SENTINEL)
    }

    /// Children of a structural node.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingChildren`] when the node has no children
    /// sequence.
    pub fn children(&self) -> Result<&[ContentNode], RenderError> {
        self.children
            .as_deref()
            .ok_or_else(|| RenderError::MissingChildren {
                tag: self.tag.clone(),
            })
    }

    /// Class names in declaration order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.props
            .get(CLASS_NAME_KEY)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// Whether `props.className` contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.class_names().any(|c| c == class)
    }

    /// Literal value of a text leaf.
    pub fn text(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Concatenated text of this node and all its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(value) = &self.value {
            out.push_str(value);
        }
        for child in self.children.iter().flatten() {
            child.collect_text(out);
        }
    }

    /// Remove and return the first direct child matching `predicate`.
    ///
    /// Returns `Ok(None)` when no child matches.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingChildren`] when the node has no children
    /// sequence.
    pub fn extract_child<P>(&mut self, mut predicate: P) -> Result<Option<ContentNode>, RenderError>
    where
        P: FnMut(&ContentNode) -> bool,
    {
        let Some(children) = self.children.as_mut() else {
            return Err(RenderError::MissingChildren {
                tag: self.tag.clone(),
            });
        };
        Ok(children
            .iter()
            .position(|child| predicate(child))
            .map(|index| children.remove(index)))
    }
}
