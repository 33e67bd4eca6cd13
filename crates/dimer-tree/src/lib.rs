//! Content-tree rendering with a pluggable renderer chain.
//!
//! This crate turns the JSON content tree produced by the dimer markdown
//! pipeline ([`ContentNode`]) into host elements through an [`ElementFactory`].
//!
//! # Architecture
//!
//! - [`TreeRenderer`]: walks the tree, consulting the [`RendererChain`] at every
//!   element node and falling back to structural rendering.
//! - [`RendererChain`]: ordered [`Renderer`]s with first-answer-wins dispatch.
//!   Each renderer answers with a [`Rendered`] value: skip the node, replace it,
//!   or pass it through to the next renderer.
//! - [`widgets`]: renderers that interpret class-marked subtrees as tab sets
//!   and collapsible sections, failing fast on malformed shapes.
//! - [`search`]: highlighting of search-result marks and keyboard handling for
//!   a search box.
//!
//! Two factories are provided: [`HtmlFactory`] (escaped HTML strings) and
//! [`NodeFactory`] (an owned [`VNode`] tree).
//!
//! # Example
//!
//! ```
//! use dimer_tree::{ContentNode, HtmlFactory, Rendered, RendererChain, TreeRenderer};
//!
//! let root = ContentNode::element("root").with_child(
//!     ContentNode::element("p")
//!         .with_class("lead")
//!         .with_child(ContentNode::text_node("Hello")),
//! );
//!
//! let chain = RendererChain::<HtmlFactory>::new().with_fn(|node, _recurse, _factory| {
//!     if node.tag == "script" {
//!         return Ok(Rendered::Skip);
//!     }
//!     Ok(Rendered::PassThrough)
//! });
//!
//! let html = TreeRenderer::with_chain(HtmlFactory, chain)
//!     .render_tree(&root)
//!     .unwrap();
//! assert_eq!(html.as_str(), r#"<div><p class="lead">Hello</p></div>"#);
//! ```

mod attrs;
mod chain;
mod element;
mod error;
mod node;
pub mod search;
mod walker;
pub mod widgets;

pub use attrs::{Attrs, props_to_attrs};
pub use chain::{Rendered, Renderer, RendererChain};
pub use element::{ElementFactory, Html, HtmlFactory, NodeFactory, VNode, escape_html};
pub use error::{RenderError, WidgetError};
pub use node::{ContentNode, Props};
pub use walker::{Recurse, TreeRenderer};
