//! Element factories.
//!
//! The host UI layer is abstracted behind [`ElementFactory`]. Renderers and the
//! tree walker only ever build elements through it, so the same chain can
//! target HTML strings ([`HtmlFactory`]) or an owned node tree ([`NodeFactory`]).

use std::fmt::{self, Write};

use serde_json::Value;
use tracing::debug;

use crate::attrs::Attrs;

/// Constructs host elements.
pub trait ElementFactory {
    /// Element type produced by this factory.
    type Element;

    /// Build an element with the given tag, attributes and children.
    fn element(&self, tag: &str, attrs: Attrs, children: Vec<Self::Element>) -> Self::Element;

    /// Build a literal text element.
    fn text(&self, value: &str) -> Self::Element;
}

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Rendered HTML fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Html(String);

impl Html {
    /// Wrap trusted markup without escaping.
    #[must_use]
    pub fn raw(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// Borrow the markup.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the markup.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Factory producing escaped HTML strings.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlFactory;

impl ElementFactory for HtmlFactory {
    type Element = Html;

    /// Tags that are not plain element names are dropped and only their
    /// children are emitted. Attributes with invalid names are omitted.
    fn element(&self, tag: &str, attrs: Attrs, children: Vec<Html>) -> Html {
        let mut out = String::with_capacity(children.iter().map(|c| c.0.len()).sum::<usize>() + 32);
        if !is_tag_name(tag) {
            debug!(tag, "dropping element with invalid tag name");
            for child in children {
                out.push_str(&child.0);
            }
            return Html(out);
        }

        out.push('<');
        out.push_str(tag);
        for (name, value) in &attrs {
            if is_attr_name(name) {
                push_attr(&mut out, name, value);
            } else {
                debug!(tag, attr = %name, "dropping attribute with invalid name");
            }
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&tag) {
            return Html(out);
        }

        for child in children {
            out.push_str(&child.0);
        }
        let _ = write!(out, "</{tag}>");
        Html(out)
    }

    fn text(&self, value: &str) -> Html {
        Html(escape_html(value))
    }
}

/// `[A-Za-z][A-Za-z0-9-]*`
fn is_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// `[A-Za-z_:][A-Za-z0-9_:.-]*`
fn is_attr_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-'))
}

/// Write ` name="value"`, or a bare ` name` for `true`. `false` and `null` are omitted.
fn push_attr(out: &mut String, name: &str, value: &Value) {
    let rendered = match value {
        Value::Null | Value::Bool(false) => return,
        Value::Bool(true) => {
            let _ = write!(out, " {name}");
            return;
        }
        Value::String(s) => escape_html(s),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => escape_html(
            &items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" "),
        ),
        Value::Object(_) => escape_html(&value.to_string()),
    };
    let _ = write!(out, r#" {name}="{rendered}""#);
}

/// Owned element tree produced by [`NodeFactory`].
#[derive(Clone, Debug, PartialEq)]
pub enum VNode {
    /// An element with attributes and children.
    Element {
        /// Tag name.
        tag: String,
        /// Attributes.
        attrs: Attrs,
        /// Child nodes.
        children: Vec<VNode>,
    },
    /// Literal text.
    Text(String),
}

impl VNode {
    /// Tag name, or `None` for text.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element { tag, .. } => Some(tag),
            Self::Text(_) => None,
        }
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Element { attrs, .. } => attrs.get(name),
            Self::Text(_) => None,
        }
    }

    /// Child nodes (empty for text).
    pub fn children(&self) -> &[VNode] {
        match self {
            Self::Element { children, .. } => children,
            Self::Text(_) => &[],
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Element { children, .. } => children.iter().map(Self::text_content).collect(),
        }
    }

    /// All descendants (including `self`) with the given tag, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<&VNode> {
        let mut found = Vec::new();
        self.collect_tagged(tag, &mut found);
        found
    }

    fn collect_tagged<'a>(&'a self, tag: &str, found: &mut Vec<&'a VNode>) {
        if self.tag() == Some(tag) {
            found.push(self);
        }
        for child in self.children() {
            child.collect_tagged(tag, found);
        }
    }

    /// Serialize to HTML.
    pub fn to_html(&self) -> Html {
        match self {
            Self::Text(text) => HtmlFactory.text(text),
            Self::Element {
                tag,
                attrs,
                children,
            } => HtmlFactory.element(
                tag,
                attrs.clone(),
                children.iter().map(Self::to_html).collect(),
            ),
        }
    }
}

/// Factory producing [`VNode`] trees.
#[derive(Clone, Copy, Debug, Default)]
pub struct NodeFactory;

impl ElementFactory for NodeFactory {
    type Element = VNode;

    fn element(&self, tag: &str, attrs: Attrs, children: Vec<VNode>) -> VNode {
        VNode::Element {
            tag: tag.to_owned(),
            attrs,
            children,
        }
    }

    fn text(&self, value: &str) -> VNode {
        VNode::Text(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn attrs(pairs: &[(&str, Value)]) -> Attrs {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">'&'</a>"), "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;");
    }

    #[test]
    fn test_html_element_with_attrs_and_children() {
        let html = HtmlFactory.element(
            "a",
            attrs(&[("href", json!("/guide")), ("class", json!("link"))]),
            vec![HtmlFactory.text("Guide & more")],
        );
        assert_eq!(html.as_str(), r#"<a class="link" href="/guide">Guide &amp; more</a>"#);
    }

    #[test]
    fn test_html_void_element() {
        let html = HtmlFactory.element("img", attrs(&[("src", json!("a.png"))]), Vec::new());
        assert_eq!(html.as_str(), r#"<img src="a.png">"#);
    }

    #[test]
    fn test_html_boolean_and_null_attrs() {
        let html = HtmlFactory.element(
            "input",
            attrs(&[
                ("checked", json!(true)),
                ("disabled", json!(false)),
                ("value", Value::Null),
                ("tabindex", json!(-1)),
            ]),
            Vec::new(),
        );
        assert_eq!(html.as_str(), r#"<input checked tabindex="-1">"#);
    }

    #[test]
    fn test_html_attr_value_escaped() {
        let html = HtmlFactory.element("div", attrs(&[("title", json!("a \"b\""))]), Vec::new());
        assert_eq!(html.as_str(), r#"<div title="a &quot;b&quot;"></div>"#);
    }

    #[test]
    fn test_html_invalid_attr_name_dropped() {
        let html = HtmlFactory.element(
            "p",
            attrs(&[
                (r#"x"><script>alert(1)</script><b y"#, json!("v")),
                ("data-line", json!(3)),
                ("xml:lang", json!("en")),
            ]),
            vec![HtmlFactory.text("hi")],
        );
        assert_eq!(html.as_str(), r#"<p data-line="3" xml:lang="en">hi</p>"#);
    }

    #[test]
    fn test_html_invalid_tag_keeps_children_only() {
        let html = HtmlFactory.element(
            "img src=x onerror=alert(1)",
            attrs(&[("alt", json!("x"))]),
            vec![HtmlFactory.text("caption")],
        );
        assert_eq!(html.as_str(), "caption");
        assert!(!html.as_str().contains("onerror"));

        let html = HtmlFactory.element("h2", Attrs::new(), vec![HtmlFactory.element("", Attrs::new(), Vec::new())]);
        assert_eq!(html.as_str(), "<h2></h2>");
    }

    #[test]
    fn test_vnode_queries() {
        let tree = NodeFactory.element(
            "ul",
            Attrs::new(),
            vec![
                NodeFactory.element("li", Attrs::new(), vec![NodeFactory.text("one")]),
                NodeFactory.element("li", Attrs::new(), vec![NodeFactory.text("two")]),
            ],
        );

        assert_eq!(tree.tag(), Some("ul"));
        assert_eq!(tree.find_all("li").len(), 2);
        assert_eq!(tree.text_content(), "onetwo");
        assert_eq!(tree.to_html().as_str(), "<ul><li>one</li><li>two</li></ul>");
    }
}
