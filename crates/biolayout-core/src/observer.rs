use crate::force::ForceGraph;

/// Progress callbacks for one layout run.
///
/// `step` fires after every completed iteration, including iteration 0 (the
/// initial state right after placement); `finish` fires exactly once when
/// [`crate::SpringLayout::process`] ends, whether by convergence,
/// cancellation, or the iteration cap. Both run synchronously on the thread
/// that called `process`.
pub trait LayoutObserver<I> {
    fn step(&mut self, graph: &ForceGraph<I>, iteration: u64, stress: f64) {
        let _ = (graph, iteration, stress);
    }

    fn finish(&mut self, graph: &ForceGraph<I>, iteration: u64, stress: f64) {
        let _ = (graph, iteration, stress);
    }
}

/// Headless runs pass `&mut ()` as the observer.
impl<I> LayoutObserver<I> for () {}
