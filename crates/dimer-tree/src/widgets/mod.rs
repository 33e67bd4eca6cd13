//! Structural widgets for class-marked subtrees.
//!
//! The markdown pipeline emits tab sets and collapsible sections as plain
//! `div` trees carrying a marker class:
//!
//! ```text
//! div.tabs
//! ├── div            navigation block
//! │   └── ul         single list container
//! │       ├── li     "macOS"
//! │       └── li     "Linux"
//! └── div            body block
//!     ├── div        pane for "macOS"
//!     └── div        pane for "Linux"
//!
//! div.collapse
//! ├── div            title block
//! │   └── "Details"
//! └── div            body block
//! ```
//!
//! [`TabsRenderer`] and [`CollapseRenderer`] validate those shapes
//! ([`TabSet::parse`], [`CollapseBlock::parse`]) and hand the result to a
//! projection. A malformed shape is an error, never a silent fallback.
//!
//! # Usage
//!
//! ```
//! use dimer_tree::widgets::{CollapseRenderer, TabsRenderer};
//! use dimer_tree::{ContentNode, HtmlFactory, RendererChain, TreeRenderer};
//!
//! let chain = RendererChain::<HtmlFactory>::new()
//!     .with(TabsRenderer::new())
//!     .with(CollapseRenderer::new());
//!
//! let root = ContentNode::element("root").with_child(
//!     ContentNode::element("div")
//!         .with_class("collapse")
//!         .with_child(ContentNode::element("div").with_child(ContentNode::text_node("More")))
//!         .with_child(ContentNode::element("div").with_child(ContentNode::text_node("Body"))),
//! );
//!
//! let html = TreeRenderer::with_chain(HtmlFactory, chain)
//!     .render_tree(&root)
//!     .unwrap();
//! assert_eq!(
//!     html.as_str(),
//!     r#"<div><div class="dimer-collapse-wrapper"><details><summary>More</summary>Body</details></div></div>"#
//! );
//! ```

mod collapse;
mod tabs;

pub use collapse::{CollapseBlock, CollapseProjection, CollapseRenderer};
pub use tabs::{TabSet, TabsProjection, TabsRenderer};

use serde_json::Value;

use crate::attrs::Attrs;
use crate::element::ElementFactory;
use crate::error::RenderError;
use crate::node::ContentNode;
use crate::walker::Recurse;

/// Attributes holding a single `class`.
fn class_attrs(class: &str) -> Attrs {
    Attrs::from([("class".to_owned(), Value::String(class.to_owned()))])
}

/// Wrap widget output in a `div` carrying the wrapper class.
fn wrap<F: ElementFactory>(factory: &F, wrapper_class: &str, content: F::Element) -> F::Element {
    factory.element("div", class_attrs(wrapper_class), vec![content])
}

/// Render the contents of a block.
///
/// Structural blocks contribute their rendered children; a leaf block renders
/// as itself.
fn render_block<F: ElementFactory>(
    recurse: &Recurse<'_, F>,
    block: &ContentNode,
) -> Result<Vec<F::Element>, RenderError> {
    if block.children.is_some() {
        recurse.children(block)
    } else {
        Ok(recurse.render(block)?.into_iter().collect())
    }
}
