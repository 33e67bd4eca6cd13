//! Collapsible sections.

use std::fmt;

use tracing::debug;

use super::{render_block, wrap};
use crate::attrs::Attrs;
use crate::chain::{Rendered, Renderer};
use crate::element::ElementFactory;
use crate::error::{RenderError, WidgetError};
use crate::node::ContentNode;
use crate::walker::Recurse;

const DEFAULT_MARKER_CLASS: &str = "collapse";
const DEFAULT_WRAPPER_CLASS: &str = "dimer-collapse-wrapper";

/// Validated collapsible section.
#[derive(Clone, Debug, PartialEq)]
pub struct CollapseBlock<'a> {
    /// Title text.
    pub title: String,
    /// Body block.
    pub body: &'a ContentNode,
}

impl<'a> CollapseBlock<'a> {
    /// Interpret `node` as a title block followed by a body block.
    ///
    /// The title is the literal value of the title block's only child, or the
    /// text of that child's descendants when it is an element.
    ///
    /// # Errors
    ///
    /// - [`WidgetError::CollapseShape`] unless `node` has exactly two children
    /// - [`WidgetError::CollapseTitle`] unless the title block has exactly one child
    pub fn parse(node: &'a ContentNode) -> Result<Self, RenderError> {
        let [head, body] = node.children()? else {
            return Err(WidgetError::CollapseShape.into());
        };
        let Some([title]) = head.children.as_deref() else {
            return Err(WidgetError::CollapseTitle.into());
        };

        let title = match title.text() {
            Some(value) => value.to_owned(),
            None => title.text_content(),
        };
        Ok(Self { title, body })
    }
}

/// Caller projection turning a validated [`CollapseBlock`] into an element.
pub type CollapseProjection<F> = Box<
    dyn Fn(&CollapseBlock<'_>, &Recurse<'_, F>, &F) -> Result<<F as ElementFactory>::Element, RenderError>
        + Send
        + Sync,
>;

/// Renderer for nodes carrying the collapse marker class.
///
/// The default projection is `<details><summary>{title}</summary>{body}</details>`.
pub struct CollapseRenderer<F: ElementFactory> {
    marker_class: String,
    wrapper_class: String,
    projection: Option<CollapseProjection<F>>,
}

impl<F: ElementFactory> Default for CollapseRenderer<F> {
    fn default() -> Self {
        Self {
            marker_class: DEFAULT_MARKER_CLASS.to_owned(),
            wrapper_class: DEFAULT_WRAPPER_CLASS.to_owned(),
            projection: None,
        }
    }
}

impl<F: ElementFactory> fmt::Debug for CollapseRenderer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollapseRenderer")
            .field("marker_class", &self.marker_class)
            .field("wrapper_class", &self.wrapper_class)
            .field("projection", &self.projection.is_some())
            .finish()
    }
}

impl<F: ElementFactory> CollapseRenderer<F> {
    /// Create a renderer with default classes and projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Class that marks a node as a collapsible section.
    #[must_use]
    pub fn with_marker_class(mut self, class: impl Into<String>) -> Self {
        self.marker_class = class.into();
        self
    }

    /// Class of the wrapper `div`.
    #[must_use]
    pub fn with_wrapper_class(mut self, class: impl Into<String>) -> Self {
        self.wrapper_class = class.into();
        self
    }

    /// Replace the default projection.
    #[must_use]
    pub fn with_projection<P>(mut self, projection: P) -> Self
    where
        P: Fn(&CollapseBlock<'_>, &Recurse<'_, F>, &F) -> Result<F::Element, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.projection = Some(Box::new(projection));
        self
    }
}

impl<F: ElementFactory> Renderer<F> for CollapseRenderer<F> {
    fn render(
        &self,
        node: &ContentNode,
        recurse: &Recurse<'_, F>,
        factory: &F,
    ) -> Result<Rendered<F::Element>, RenderError> {
        if !node.has_class(&self.marker_class) {
            return Ok(Rendered::PassThrough);
        }

        let block = CollapseBlock::parse(node)?;
        debug!(title = %block.title, "rendering collapsible section");

        let content = match &self.projection {
            Some(projection) => projection(&block, recurse, factory)?,
            None => {
                let mut children = vec![factory.element(
                    "summary",
                    Attrs::new(),
                    vec![factory.text(&block.title)],
                )];
                children.extend(render_block(recurse, block.body)?);
                factory.element("details", Attrs::new(), children)
            }
        };

        Ok(Rendered::Replace(wrap(factory, &self.wrapper_class, content)))
    }
}
