//! Renderer setup for terminal commands.

use console::Style;
use dimer_config::RenderConfig;
use dimer_tree::search::{Marked, render_marks};
use dimer_tree::widgets::{CollapseRenderer, TabsRenderer};
use dimer_tree::{Attrs, ElementFactory, HtmlFactory, RendererChain, TreeRenderer};

/// HTML renderer with the tab and collapse widgets configured from `config`.
pub(crate) fn html_renderer(config: &RenderConfig) -> TreeRenderer<HtmlFactory> {
    let chain = RendererChain::new()
        .with(
            TabsRenderer::new()
                .with_marker_class(&config.tabs_class)
                .with_wrapper_class(&config.tabs_wrapper_class),
        )
        .with(
            CollapseRenderer::new()
                .with_marker_class(&config.collapse_class)
                .with_wrapper_class(&config.collapse_wrapper_class),
        );
    TreeRenderer::with_chain(HtmlFactory, chain)
}

/// Flattens elements to text, styling `strong` runs.
pub(crate) struct TermFactory {
    highlight: Style,
}

impl TermFactory {
    pub(crate) fn new() -> Self {
        Self {
            highlight: Style::new().yellow().bold(),
        }
    }

    /// One line of highlighted search text.
    pub(crate) fn line(&self, marked: &Marked) -> String {
        render_marks(&marked.marks, self).concat()
    }
}

impl ElementFactory for TermFactory {
    type Element = String;

    fn element(&self, tag: &str, _attrs: Attrs, children: Vec<String>) -> String {
        let text = children.concat();
        if tag == "strong" {
            self.highlight.apply_to(text).to_string()
        } else {
            text
        }
    }

    fn text(&self, value: &str) -> String {
        value.to_owned()
    }
}
