//! Renderer chain with first-answer-wins dispatch.

use std::fmt;

use tracing::trace;

use crate::element::ElementFactory;
use crate::error::RenderError;
use crate::node::ContentNode;
use crate::walker::Recurse;

/// Answer of a single [`Renderer`] for a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rendered<E> {
    /// Omit the node and its entire subtree.
    Skip,
    /// Use this element verbatim. Children are not descended automatically.
    Replace(E),
    /// No opinion; ask the next renderer or fall back to structural rendering.
    PassThrough,
}

impl<E> Rendered<E> {
    /// Whether this renderer declined to handle the node.
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Self::PassThrough)
    }
}

/// A node transform registered into a [`RendererChain`].
///
/// Implementations should be free of side effects: the same tree may be
/// rendered concurrently by independent walkers.
pub trait Renderer<F: ElementFactory>: Send + Sync {
    /// Decide how `node` is rendered.
    ///
    /// Use `recurse` to render children the renderer wants to keep, and
    /// `factory` to build replacement elements.
    fn render(
        &self,
        node: &ContentNode,
        recurse: &Recurse<'_, F>,
        factory: &F,
    ) -> Result<Rendered<F::Element>, RenderError>;
}

/// Adapter turning a closure into a [`Renderer`].
struct FnRenderer<C>(C);

impl<F, C> Renderer<F> for FnRenderer<C>
where
    F: ElementFactory,
    C: Fn(&ContentNode, &Recurse<'_, F>, &F) -> Result<Rendered<F::Element>, RenderError>
        + Send
        + Sync,
{
    fn render(
        &self,
        node: &ContentNode,
        recurse: &Recurse<'_, F>,
        factory: &F,
    ) -> Result<Rendered<F::Element>, RenderError> {
        (self.0)(node, recurse, factory)
    }
}

/// Ordered renderers consulted for every element node.
///
/// Renderers are tried strictly in registration order. The first one that
/// answers [`Rendered::Skip`] or [`Rendered::Replace`] wins and later ones are
/// never consulted for that node.
pub struct RendererChain<F: ElementFactory> {
    renderers: Vec<Box<dyn Renderer<F>>>,
}

impl<F: ElementFactory> Default for RendererChain<F> {
    fn default() -> Self {
        Self {
            renderers: Vec::new(),
        }
    }
}

impl<F: ElementFactory> fmt::Debug for RendererChain<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererChain")
            .field("renderers", &self.renderers.len())
            .finish()
    }
}

impl<F: ElementFactory> RendererChain<F> {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a renderer.
    pub fn push<R>(&mut self, renderer: R)
    where
        R: Renderer<F> + 'static,
    {
        self.renderers.push(Box::new(renderer));
    }

    /// Append a closure renderer.
    pub fn push_fn<C>(&mut self, renderer: C)
    where
        C: Fn(&ContentNode, &Recurse<'_, F>, &F) -> Result<Rendered<F::Element>, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.renderers.push(Box::new(FnRenderer(renderer)));
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with<R>(mut self, renderer: R) -> Self
    where
        R: Renderer<F> + 'static,
    {
        self.push(renderer);
        self
    }

    /// Builder form of [`push_fn`](Self::push_fn).
    #[must_use]
    pub fn with_fn<C>(mut self, renderer: C) -> Self
    where
        C: Fn(&ContentNode, &Recurse<'_, F>, &F) -> Result<Rendered<F::Element>, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.push_fn(renderer);
        self
    }

    /// Number of registered renderers.
    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    /// Whether no renderer is registered.
    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    /// Ask each renderer in order until one answers.
    ///
    /// Returns [`Rendered::PassThrough`] when every renderer passes.
    ///
    /// # Errors
    ///
    /// Propagates the first error raised by a renderer.
    pub fn dispatch(
        &self,
        node: &ContentNode,
        recurse: &Recurse<'_, F>,
        factory: &F,
    ) -> Result<Rendered<F::Element>, RenderError> {
        for (index, renderer) in self.renderers.iter().enumerate() {
            let answer = renderer.render(node, recurse, factory)?;
            if !answer.is_pass_through() {
                trace!(
                    tag = %node.tag,
                    index,
                    skip = matches!(answer, Rendered::Skip),
                    "renderer answered"
                );
                return Ok(answer);
            }
        }
        Ok(Rendered::PassThrough)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::element::{NodeFactory, VNode};
    use crate::walker::TreeRenderer;

    /// Renderer that counts calls and always gives the same answer.
    struct Counting {
        calls: Arc<AtomicUsize>,
        answer: fn() -> Rendered<VNode>,
    }

    impl Renderer<NodeFactory> for Counting {
        fn render(
            &self,
            _node: &ContentNode,
            _recurse: &Recurse<'_, NodeFactory>,
            _factory: &NodeFactory,
        ) -> Result<Rendered<VNode>, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((self.answer)())
        }
    }

    fn counting(answer: fn() -> Rendered<VNode>) -> (Counting, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Counting {
                calls: Arc::clone(&calls),
                answer,
            },
            calls,
        )
    }

    fn dispatch(chain: RendererChain<NodeFactory>) -> Rendered<VNode> {
        let walker = TreeRenderer::with_chain(NodeFactory, RendererChain::new());
        let recurse = Recurse::new(&walker);
        chain
            .dispatch(&ContentNode::element("p"), &recurse, &NodeFactory)
            .unwrap()
    }

    #[test]
    fn test_empty_chain_passes_through() {
        assert_eq!(dispatch(RendererChain::new()), Rendered::PassThrough);
    }

    #[test]
    fn test_first_replace_wins_and_stops() {
        let (first, first_calls) = counting(|| Rendered::PassThrough);
        let (second, second_calls) = counting(|| Rendered::Replace(VNode::Text("second".to_owned())));
        let (third, third_calls) = counting(|| Rendered::Skip);

        let answer = dispatch(RendererChain::new().with(first).with(second).with(third));

        assert_eq!(answer, Rendered::Replace(VNode::Text("second".to_owned())));
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_skip_wins_and_stops() {
        let (first, _) = counting(|| Rendered::Skip);
        let (second, second_calls) = counting(|| Rendered::Replace(VNode::Text("late".to_owned())));

        let answer = dispatch(RendererChain::new().with(first).with(second));

        assert_eq!(answer, Rendered::Skip);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_pass_through() {
        let (first, first_calls) = counting(|| Rendered::PassThrough);
        let (second, second_calls) = counting(|| Rendered::PassThrough);

        let answer = dispatch(RendererChain::new().with(first).with(second));

        assert_eq!(answer, Rendered::PassThrough);
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_error_stops_dispatch() {
        let (later, later_calls) = counting(|| Rendered::PassThrough);
        let chain = RendererChain::<NodeFactory>::new()
            .with_fn(|_, _, _| Err(RenderError::MissingValue))
            .with(later);

        let walker = TreeRenderer::new(NodeFactory);
        let recurse = Recurse::new(&walker);
        let result = chain.dispatch(&ContentNode::element("p"), &recurse, &NodeFactory);

        assert_eq!(result, Err(RenderError::MissingValue));
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_len_and_debug() {
        let chain = RendererChain::<NodeFactory>::new()
            .with_fn(|_, _, _| Ok(Rendered::PassThrough))
            .with_fn(|_, _, _| Ok(Rendered::PassThrough));
        assert_eq!(chain.len(), 2);
        assert!(!chain.is_empty());
        assert_eq!(format!("{chain:?}"), "RendererChain { renderers: 2 }");
    }
}
