//! Recursive tree walker.

use crate::attrs::props_to_attrs;
use crate::chain::{Rendered, RendererChain};
use crate::element::ElementFactory;
use crate::error::RenderError;
use crate::node::{ContentNode, Props};

/// Tag of the container synthesized around the root's children.
const ROOT_TAG: &str = "div";

/// Walks a [`ContentNode`] tree and projects it through a [`RendererChain`].
///
/// Element nodes are offered to the chain first. When every renderer passes,
/// the node is rebuilt structurally from its `tag`, `props` and children, each
/// child dispatched again through the same chain. Text leaves bypass the chain
/// and sentinel title nodes never render at all.
///
/// The walker holds no mutable state, so one instance can render independent
/// trees from several threads at once.
#[derive(Debug)]
pub struct TreeRenderer<F: ElementFactory> {
    factory: F,
    chain: RendererChain<F>,
}

impl<F: ElementFactory> TreeRenderer<F> {
    /// Create a walker with an empty chain.
    pub fn new(factory: F) -> Self {
        Self::with_chain(factory, RendererChain::new())
    }

    /// Create a walker with the given chain.
    pub fn with_chain(factory: F, chain: RendererChain<F>) -> Self {
        Self { factory, chain }
    }

    /// Element factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Renderer chain.
    pub fn chain(&self) -> &RendererChain<F> {
        &self.chain
    }

    /// Render a whole document tree.
    ///
    /// The root's children are wrapped in a `div` with no attributes; the
    /// root's own tag and props are not rendered. The wrapper itself goes
    /// through the chain like any other element.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingChildren`] when the root has no children
    /// sequence, or any error raised while rendering the tree.
    pub fn render_tree(&self, root: &ContentNode) -> Result<F::Element, RenderError> {
        let wrapper = ContentNode {
            kind: Some("element".to_owned()),
            tag: ROOT_TAG.to_owned(),
            props: Props::new(),
            children: Some(root.children()?.to_vec()),
            value: None,
        };

        match self.render_node(&wrapper)? {
            Some(element) => Ok(element),
            // A renderer skipped the wrapper itself.
            None => Ok(self.factory.element(ROOT_TAG, Default::default(), Vec::new())),
        }
    }

    /// Render a single node.
    ///
    /// Returns `Ok(None)` when the node is elided or a renderer skipped it.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed nodes or when a renderer fails.
    pub fn render_node(&self, node: &ContentNode) -> Result<Option<F::Element>, RenderError> {
        if node.is_elided() {
            return Ok(None);
        }

        if node.is_text() {
            let value = node.text().ok_or(RenderError::MissingValue)?;
            return Ok(Some(self.factory.text(value)));
        }

        let recurse = Recurse::new(self);
        match self.chain.dispatch(node, &recurse, &self.factory)? {
            Rendered::Skip => Ok(None),
            Rendered::Replace(element) => Ok(Some(element)),
            Rendered::PassThrough => self.render_default(node).map(Some),
        }
    }

    /// Render every child of `node`, dropping elided and skipped ones.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingChildren`] when `node` has no children
    /// sequence, or the first error raised by a child.
    pub fn render_children(&self, node: &ContentNode) -> Result<Vec<F::Element>, RenderError> {
        let mut rendered = Vec::new();
        for child in node.children()? {
            if let Some(element) = self.render_node(child)? {
                rendered.push(element);
            }
        }
        Ok(rendered)
    }

    /// Structural rendering from `tag`, `props` and children.
    fn render_default(&self, node: &ContentNode) -> Result<F::Element, RenderError> {
        let children = self.render_children(node)?;
        Ok(self
            .factory
            .element(&node.tag, props_to_attrs(&node.props), children))
    }
}

/// Handle given to renderers for descending into children they keep.
#[derive(Debug)]
pub struct Recurse<'a, F: ElementFactory> {
    walker: &'a TreeRenderer<F>,
}

impl<'a, F: ElementFactory> Recurse<'a, F> {
    pub(crate) fn new(walker: &'a TreeRenderer<F>) -> Self {
        Self { walker }
    }

    /// Render one node through the full pipeline.
    ///
    /// # Errors
    ///
    /// See [`TreeRenderer::render_node`].
    pub fn render(&self, node: &ContentNode) -> Result<Option<F::Element>, RenderError> {
        self.walker.render_node(node)
    }

    /// Render all children of `node`.
    ///
    /// # Errors
    ///
    /// See [`TreeRenderer::render_children`].
    pub fn children(&self, node: &ContentNode) -> Result<Vec<F::Element>, RenderError> {
        self.walker.render_children(node)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::element::{Html, HtmlFactory, NodeFactory, VNode};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn html(chain: RendererChain<HtmlFactory>, root: &ContentNode) -> String {
        TreeRenderer::with_chain(HtmlFactory, chain)
            .render_tree(root)
            .unwrap()
            .into_string()
    }

    fn sample_root() -> ContentNode {
        ContentNode::element("root").with_children([
            ContentNode::element("dimertitle").with_child(ContentNode::text_node("Title")),
            ContentNode::element("h2")
                .with_prop("id", "intro")
                .with_child(ContentNode::text_node("Intro")),
            ContentNode::element("p")
                .with_class("lead")
                .with_class("muted")
                .with_prop("dataLine", 3)
                .with_child(ContentNode::text_node("Some "))
                .with_child(ContentNode::element("em").with_child(ContentNode::text_node("text"))),
        ])
    }

    #[test]
    fn test_default_rendering() {
        assert_eq!(
            html(RendererChain::new(), &sample_root()),
            r#"<div><h2 id="intro">Intro</h2><p class="lead muted" data-line="3">Some <em>text</em></p></div>"#
        );
    }

    #[test]
    fn test_root_tag_and_props_not_rendered() {
        let root = ContentNode::element("section")
            .with_prop("id", "ignored")
            .with_child(ContentNode::text_node("x"));
        assert_eq!(html(RendererChain::new(), &root), "<div>x</div>");
    }

    #[test]
    fn test_pass_through_chain_matches_default() {
        let chain = RendererChain::<HtmlFactory>::new()
            .with_fn(|_, _, _| Ok(Rendered::PassThrough))
            .with_fn(|_, _, _| Ok(Rendered::PassThrough));
        assert_eq!(
            html(chain, &sample_root()),
            html(RendererChain::new(), &sample_root())
        );
    }

    #[test]
    fn test_skip_drops_subtree() {
        let chain = RendererChain::<HtmlFactory>::new().with_fn(|node, _, _| {
            Ok(if node.tag == "p" {
                Rendered::Skip
            } else {
                Rendered::PassThrough
            })
        });
        assert_eq!(
            html(chain, &sample_root()),
            r#"<div><h2 id="intro">Intro</h2></div>"#
        );
    }

    #[test]
    fn test_replace_does_not_descend() {
        let visited = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&visited);
        let chain = RendererChain::<HtmlFactory>::new()
            .with_fn(|node, _, factory| {
                Ok(if node.tag == "p" {
                    Rendered::Replace(factory.element("aside", Default::default(), Vec::new()))
                } else {
                    Rendered::PassThrough
                })
            })
            .with_fn(move |node, _, _| {
                if node.tag == "em" {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                Ok(Rendered::PassThrough)
            });

        let out = html(chain, &sample_root());

        assert_eq!(out, r#"<div><h2 id="intro">Intro</h2><aside></aside></div>"#);
        assert_eq!(visited.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_renderer_can_recurse_into_children() {
        let chain = RendererChain::<HtmlFactory>::new().with_fn(|node, recurse, factory| {
            if node.tag != "p" {
                return Ok(Rendered::PassThrough);
            }
            let children = recurse.children(node)?;
            Ok(Rendered::Replace(factory.element("blockquote", Default::default(), children)))
        });
        assert_eq!(
            html(chain, &sample_root()),
            r#"<div><h2 id="intro">Intro</h2><blockquote>Some <em>text</em></blockquote></div>"#
        );
    }

    #[test]
    fn test_sentinel_never_reaches_chain() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let chain = RendererChain::<HtmlFactory>::new().with_fn(move |node, _, _| {
            if node.tag.eq_ignore_ascii_case("dimertitle") {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            Ok(Rendered::PassThrough)
        });
        let root = ContentNode::element("root").with_children([
            ContentNode::element("dimerTitle"),
            ContentNode::element("dimertitle"),
            ContentNode::element("p"),
        ]);

        assert_eq!(html(chain, &root), "<div><p></p></div>");
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_text_nodes_bypass_chain() {
        let chain = RendererChain::<HtmlFactory>::new().with_fn(|node, _, _| {
            assert!(!node.is_text());
            Ok(Rendered::PassThrough)
        });
        let root = ContentNode::element("root").with_child(ContentNode::text_node("a < b"));
        assert_eq!(html(chain, &root), "<div>a &lt; b</div>");
    }

    #[test]
    fn test_root_without_children_is_error() {
        let root = ContentNode::text_node("lonely");
        let err = TreeRenderer::new(HtmlFactory).render_tree(&root).unwrap_err();
        assert!(matches!(err, RenderError::MissingChildren { .. }));
    }

    #[test]
    fn test_structural_node_without_children_is_error() {
        let root = ContentNode::element("root").with_child(ContentNode {
            tag: "ul".to_owned(),
            ..ContentNode::default()
        });
        let err = TreeRenderer::new(HtmlFactory).render_tree(&root).unwrap_err();
        assert_eq!(
            err,
            RenderError::MissingChildren {
                tag: "ul".to_owned()
            }
        );
    }

    #[test]
    fn test_text_without_value_is_error() {
        let root = ContentNode::element("root").with_child(ContentNode {
            kind: Some("text".to_owned()),
            ..ContentNode::default()
        });
        let err = TreeRenderer::new(HtmlFactory).render_tree(&root).unwrap_err();
        assert_eq!(err, RenderError::MissingValue);
    }

    #[test]
    fn test_skipped_wrapper_renders_empty_div() {
        let chain = RendererChain::<HtmlFactory>::new().with_fn(|_, _, _| Ok(Rendered::Skip));
        assert_eq!(html(chain, &sample_root()), "<div></div>");
    }

    #[test]
    fn test_node_factory_tree() {
        let walker = TreeRenderer::new(NodeFactory);
        let tree = walker.render_tree(&sample_root()).unwrap();

        assert_eq!(tree.tag(), Some("div"));
        assert_eq!(tree.children().len(), 2);
        let p = &tree.children()[1];
        assert_eq!(p.attr("class"), Some(&json!("lead muted")));
        assert_eq!(p.attr("data-line"), Some(&json!(3)));
        assert_eq!(p.text_content(), "Some text");
        assert_eq!(
            tree.to_html(),
            Html::raw(html(RendererChain::new(), &sample_root()))
        );
        assert!(matches!(&p.children()[0], VNode::Text(t) if t == "Some "));
    }

    #[test]
    fn test_hostile_names_from_json_do_not_leak_markup() {
        let root: ContentNode = serde_json::from_value(json!({
            "tag": "root",
            "children": [
                {
                    "tag": "p",
                    "props": { "x\"><script>alert(1)</script><b y": "v" },
                    "children": [{ "type": "text", "value": "hi" }]
                },
                {
                    "tag": "img src=x onerror=alert(1)",
                    "children": [{ "type": "text", "value": "alt" }]
                }
            ]
        }))
        .unwrap();

        let out = html(RendererChain::new(), &root);
        assert_eq!(out, "<div><p>hi</p>alt</div>");
        assert!(!out.contains("onerror"));
        assert!(!out.contains("<script>"));
    }
}
