//! Error types for tree rendering.

/// Error raised while walking or projecting a content tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// A structural node has no `children` sequence.
    #[error("node <{tag}> has no children sequence")]
    MissingChildren {
        /// Tag of the offending node.
        tag: String,
    },

    /// A text node has no `value`.
    #[error("text node has no value")]
    MissingValue,

    /// A class-marked subtree does not have the shape its widget expects.
    #[error(transparent)]
    Widget(#[from] WidgetError),
}

/// Shape-validation error for tab sets and collapsible sections.
///
/// These indicate malformed upstream content and are never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum WidgetError {
    /// The tabs node does not have exactly two children.
    #[error("invalid tabs node: missing head or body")]
    TabsShape,

    /// The navigation block does not have exactly one child.
    #[error("invalid tabs node: navigation must be wrapped in a single list container")]
    TabsNavigation,

    /// Number of `li` items differs from the number of panes.
    #[error("tab navigation count mismatches content pane count")]
    TabsCountMismatch {
        /// Number of navigation items.
        links: usize,
        /// Number of content panes.
        panes: usize,
    },

    /// A navigation item has no text as its first child.
    #[error("invalid tabs node: navigation item {index} has no label")]
    MissingTabLabel {
        /// Zero-based position of the item.
        index: usize,
    },

    /// The collapse node does not have exactly two children.
    #[error("invalid collapse node: must have title and body")]
    CollapseShape,

    /// The title block does not have exactly one child.
    #[error("invalid collapse node: must have a title")]
    CollapseTitle,
}
