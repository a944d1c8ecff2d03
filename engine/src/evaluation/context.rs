//! Evaluation context — the borrowed services a walker steps with.

use crate::cache::ValueCache;
use crate::index::ElementIndex;
use crate::model::Graph;

/// Everything a [`super::GraphWalker`] needs while evaluating one graph:
/// the live graph resolved from host storage this tick, plus the scheduler's
/// index and value cache. Exactly one context exists at a time, which is
/// what keeps cache mutation single-writer.
pub struct EvalContext<'a> {
    pub graph: &'a Graph,
    pub index: &'a mut ElementIndex,
    pub cache: &'a mut ValueCache,
}

impl<'a> EvalContext<'a> {
    pub fn new(graph: &'a Graph, index: &'a mut ElementIndex, cache: &'a mut ValueCache) -> Self {
        Self {
            graph,
            index,
            cache,
        }
    }
}
