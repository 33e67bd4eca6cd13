//! Tab sets.

use std::fmt;

use serde_json::Value;
use tracing::debug;

use super::{class_attrs, render_block, wrap};
use crate::attrs::Attrs;
use crate::chain::{Rendered, Renderer};
use crate::element::ElementFactory;
use crate::error::{RenderError, WidgetError};
use crate::node::ContentNode;
use crate::walker::Recurse;

/// Default marker class of a tabs node.
const DEFAULT_MARKER_CLASS: &str = "tabs";

/// Default class of the wrapper around rendered tabs.
const DEFAULT_WRAPPER_CLASS: &str = "dimer-tabs-wrapper";

/// Id prefix used when the tabs node has no `id` prop.
const DEFAULT_ID_PREFIX: &str = "tabs";

/// Validated tab set: labels paired with content panes by position.
#[derive(Clone, Debug, PartialEq)]
pub struct TabSet<'a> {
    /// Navigation labels in display order.
    pub links: Vec<String>,
    /// Content panes, `panes[i]` belongs to `links[i]`.
    pub panes: &'a [ContentNode],
}

impl<'a> TabSet<'a> {
    /// Interpret `node` as a navigation block followed by a body block.
    ///
    /// Navigation items are the `li` children of the single list container
    /// inside the navigation block; anything else in that list is ignored.
    /// Each label is the text of the item's first child.
    ///
    /// # Errors
    ///
    /// - [`WidgetError::TabsShape`] unless `node` has exactly two children
    /// - [`WidgetError::TabsNavigation`] unless the navigation block has exactly one child
    /// - [`WidgetError::TabsCountMismatch`] when items and panes differ in number
    /// - [`WidgetError::MissingTabLabel`] when an item has no text label
    pub fn parse(node: &'a ContentNode) -> Result<Self, RenderError> {
        let [nav, body] = node.children()? else {
            return Err(WidgetError::TabsShape.into());
        };
        let [list] = nav.children()? else {
            return Err(WidgetError::TabsNavigation.into());
        };

        let items: Vec<&ContentNode> = list
            .children()?
            .iter()
            .filter(|item| item.tag == "li")
            .collect();
        let panes = body.children()?;

        if items.len() != panes.len() {
            return Err(WidgetError::TabsCountMismatch {
                links: items.len(),
                panes: panes.len(),
            }
            .into());
        }

        let links = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.children
                    .as_deref()
                    .and_then(<[ContentNode]>::first)
                    .and_then(ContentNode::text)
                    .map(str::to_owned)
                    .ok_or(WidgetError::MissingTabLabel { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { links, panes })
    }

    /// Number of tabs.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the set has no tabs.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Caller projection turning a validated [`TabSet`] into an element.
pub type TabsProjection<F> = Box<
    dyn Fn(&TabSet<'_>, &Recurse<'_, F>, &F) -> Result<<F as ElementFactory>::Element, RenderError>
        + Send
        + Sync,
>;

/// Renderer for nodes carrying the tabs marker class.
///
/// Nodes without the marker class pass through. Marked nodes are validated
/// with [`TabSet::parse`], projected, and wrapped in a `div` with the wrapper
/// class.
///
/// Without a custom projection, tabs render as an accessible tab list:
///
/// ```html
/// <div class="tabs" id="tabs">
///   <div class="tabs-buttons" role="tablist">
///     <button role="tab" id="tabs-tab-0" aria-controls="tabs-panel-0"
///             aria-selected="true" tabindex="0">macOS</button>
///     <button role="tab" id="tabs-tab-1" aria-controls="tabs-panel-1"
///             aria-selected="false" tabindex="-1">Linux</button>
///   </div>
///   <div role="tabpanel" id="tabs-panel-0" aria-labelledby="tabs-tab-0">...</div>
///   <div role="tabpanel" id="tabs-panel-1" aria-labelledby="tabs-tab-1" hidden>...</div>
/// </div>
/// ```
///
/// The id prefix is the node's `id` prop when present.
pub struct TabsRenderer<F: ElementFactory> {
    marker_class: String,
    wrapper_class: String,
    projection: Option<TabsProjection<F>>,
}

impl<F: ElementFactory> Default for TabsRenderer<F> {
    fn default() -> Self {
        Self {
            marker_class: DEFAULT_MARKER_CLASS.to_owned(),
            wrapper_class: DEFAULT_WRAPPER_CLASS.to_owned(),
            projection: None,
        }
    }
}

impl<F: ElementFactory> fmt::Debug for TabsRenderer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabsRenderer")
            .field("marker_class", &self.marker_class)
            .field("wrapper_class", &self.wrapper_class)
            .field("projection", &self.projection.is_some())
            .finish()
    }
}

impl<F: ElementFactory> TabsRenderer<F> {
    /// Create a renderer with default classes and projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Class that marks a node as a tab set.
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
        P: Fn(&TabSet<'_>, &Recurse<'_, F>, &F) -> Result<F::Element, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.projection = Some(Box::new(projection));
        self
    }
}

impl<F: ElementFactory> Renderer<F> for TabsRenderer<F> {
    fn render(
        &self,
        node: &ContentNode,
        recurse: &Recurse<'_, F>,
        factory: &F,
    ) -> Result<Rendered<F::Element>, RenderError> {
        if !node.has_class(&self.marker_class) {
            return Ok(Rendered::PassThrough);
        }

        let tabs = TabSet::parse(node)?;
        debug!(tabs = tabs.len(), "rendering tab set");

        let content = match &self.projection {
            Some(projection) => projection(&tabs, recurse, factory)?,
            None => {
                let prefix = node
                    .props
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_ID_PREFIX);
                aria_tabs(&tabs, prefix, recurse, factory)?
            }
        };

        Ok(Rendered::Replace(wrap(factory, &self.wrapper_class, content)))
    }
}

fn attrs<const N: usize>(pairs: [(&str, Value); N]) -> Attrs {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect()
}

/// Accessible tab list with one panel per pane. The first tab is selected.
fn aria_tabs<F: ElementFactory>(
    tabs: &TabSet<'_>,
    prefix: &str,
    recurse: &Recurse<'_, F>,
    factory: &F,
) -> Result<F::Element, RenderError> {
    let mut buttons = Vec::with_capacity(tabs.len());
    let mut panels = Vec::with_capacity(tabs.len());

    for (idx, (label, pane)) in tabs.links.iter().zip(tabs.panes).enumerate() {
        let selected = idx == 0;
        let tab_id = format!("{prefix}-tab-{idx}");
        let panel_id = format!("{prefix}-panel-{idx}");

        buttons.push(factory.element(
            "button",
            attrs([
                ("role", "tab".into()),
                ("id", tab_id.clone().into()),
                ("aria-controls", panel_id.clone().into()),
                ("aria-selected", selected.to_string().into()),
                ("tabindex", Value::from(if selected { "0" } else { "-1" })),
            ]),
            vec![factory.text(label)],
        ));

        panels.push(factory.element(
            "div",
            attrs([
                ("role", "tabpanel".into()),
                ("id", panel_id.into()),
                ("aria-labelledby", tab_id.into()),
                ("hidden", Value::Bool(!selected)),
            ]),
            render_block(recurse, pane)?,
        ));
    }

    let mut children = Vec::with_capacity(panels.len() + 1);
    children.push(factory.element(
        "div",
        attrs([
            ("class", "tabs-buttons".into()),
            ("role", "tablist".into()),
        ]),
        buttons,
    ));
    children.extend(panels);

    let mut container = class_attrs("tabs");
    container.insert("id".to_owned(), prefix.into());
    Ok(factory.element("div", container, children))
}
