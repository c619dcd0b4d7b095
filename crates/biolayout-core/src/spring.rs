use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;

use crate::error::Result;
use crate::force::ForceGraph;
use crate::graph::Graph;
use crate::observer::LayoutObserver;
use crate::rng::XorShift64Star;
use crate::vector::Vector;

/// Movement threshold: the run has converged once no node moves at least
/// this far in one iteration.
pub const DEFAULT_MIN_MOVES: f64 = 0.01;

pub const DEFAULT_MAX_ITERATIONS: u64 = 20_000;

/// Stand-in weight range for graphs with no edges at all. Ordinarily the
/// range comes from the edge weights; without edges there is nothing to
/// anchor the scale, so nodes are spread as if connected at this distance.
const DEFAULT_SPREAD: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct SpringOptions {
    /// Seed for the solver's PRNG. Two runs with the same seed over the same
    /// graph produce bit-identical coordinates.
    pub random_seed: u64,
    pub min_moves: f64,
    pub max_iterations: u64,
    /// Skip far-apart unconnected pairs in the O(n²) scan. This is a
    /// performance heuristic, not a correctness guarantee; disable it to get
    /// the exact all-pairs behavior in tests.
    pub far_pair_pruning: bool,
}

impl Default for SpringOptions {
    fn default() -> Self {
        Self {
            random_seed: 0,
            min_moves: DEFAULT_MIN_MOVES,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            far_pair_pruning: true,
        }
    }
}

/// Shared handle for cooperative cancellation and stop observation.
///
/// `cancel` may be called from any thread, or from inside an observer's
/// `step` callback; the solver checks it once per iteration at the top of
/// the loop, so the current iteration always completes first. `is_stopped`
/// turns true only after the loop has fully exited and the final observer
/// notification ran — a caller seeing `true` can assume no further mutation
/// will occur.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<TokenState>,
}

#[derive(Debug, Default)]
struct TokenState {
    canceled: AtomicBool,
    stopped: AtomicBool,
}

impl CancelToken {
    pub fn cancel(&self) {
        self.inner.canceled.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.inner.canceled.load(Ordering::Relaxed)
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.inner.canceled.store(false, Ordering::Relaxed);
        self.inner.stopped.store(false, Ordering::Relaxed);
    }

    fn mark_stopped(&self) {
        self.inner.stopped.store(true, Ordering::Relaxed);
    }
}

/// Final coordinates of one layout run, keyed by domain node id in the
/// graph's enumeration order.
#[derive(Debug, Clone)]
pub struct LayoutResult<I> {
    pub positions: IndexMap<I, Vector>,
    /// Completed iterations (0 for the trivial short-circuit paths).
    pub iterations: u64,
    /// Global stress at the end of the run.
    pub stress: f64,
}

impl<I: Copy + Eq + Hash> LayoutResult<I> {
    pub fn position(&self, id: I) -> Option<Vector> {
        self.positions.get(&id).copied()
    }
}

/// The iterative spring solver.
///
/// Every edge weight is a target distance; each iteration moves every node
/// by the *average* pairwise force from all other nodes, which keeps the
/// step size independent of node degree and graph size. Unconnected pairs
/// are pushed toward the largest edge weight, so isolated nodes neither
/// collapse onto the cluster nor fly off.
#[derive(Debug)]
pub struct SpringLayout<I> {
    forces: ForceGraph<I>,
    rng: XorShift64Star,
    opts: SpringOptions,
    min_weight: f64,
    max_weight: f64,
    token: CancelToken,
}

impl<I: Copy + Eq + Hash + Debug> SpringLayout<I> {
    /// Wraps `graph` for simulation. Fails fast on malformed input (see
    /// [`ForceGraph::from_graph`]); nothing is simulated on error.
    pub fn new<G>(graph: &G, opts: SpringOptions) -> Result<Self>
    where
        G: Graph<NodeId = I>,
    {
        let forces = ForceGraph::from_graph(graph)?;
        let mut min_weight = f64::INFINITY;
        let mut max_weight = f64::NEG_INFINITY;
        for edge in forces.edges() {
            min_weight = min_weight.min(edge.weight());
            max_weight = max_weight.max(edge.weight());
        }
        if forces.edges().is_empty() {
            min_weight = DEFAULT_SPREAD;
            max_weight = DEFAULT_SPREAD;
        }
        let rng = XorShift64Star::new(opts.random_seed);
        Ok(Self {
            forces,
            rng,
            opts,
            min_weight,
            max_weight,
            token: CancelToken::default(),
        })
    }

    pub fn options(&self) -> &SpringOptions {
        &self.opts
    }

    pub fn min_weight(&self) -> f64 {
        self.min_weight
    }

    pub fn max_weight(&self) -> f64 {
        self.max_weight
    }

    pub fn force_graph(&self) -> &ForceGraph<I> {
        &self.forces
    }

    /// Shared handle usable from other threads or observer callbacks.
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Requests cooperative cancellation; the current iteration completes
    /// before the loop exits.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True only after [`Self::process`] has fully returned (including the
    /// final observer notification).
    pub fn is_stopped(&self) -> bool {
        self.token.is_stopped()
    }

    /// Runs the relaxation loop to convergence, cancellation, or the
    /// iteration cap, and hands back the final coordinates.
    ///
    /// Graphs with two or fewer nodes are placed directly without entering
    /// the loop: the averaged-force normalization degenerates for a single
    /// pair (the step oscillates instead of contracting), and the closed-form
    /// placement is exact anyway.
    pub fn process<O>(&mut self, observer: &mut O) -> LayoutResult<I>
    where
        O: LayoutObserver<I>,
    {
        self.token.reset();

        if self.forces.node_count() <= 2 {
            self.place_trivial();
            let stress = self.global_stress();
            self.token.mark_stopped();
            observer.finish(&self.forces, 0, stress);
            return self.result(0, stress);
        }

        self.initialize();
        let mut iteration = 0u64;
        let mut stress = self.global_stress();
        observer.step(&self.forces, iteration, stress);

        while iteration < self.opts.max_iterations {
            if self.token.is_canceled() || self.token.is_stopped() {
                break;
            }
            if !self.move_nodes() {
                break;
            }
            iteration += 1;
            stress = self.global_stress();
            observer.step(&self.forces, iteration, stress);
            if iteration.is_multiple_of(1000) {
                tracing::trace!(iteration, stress, "relaxation progress");
            }
        }

        let stress = self.global_stress();
        self.token.mark_stopped();
        observer.finish(&self.forces, iteration, stress);
        self.result(iteration, stress)
    }

    /// Scatters nodes uniformly over a square whose side scales with graph
    /// size relative to the largest target distance, so the initial state is
    /// sparse rather than a dense clump.
    fn initialize(&mut self) {
        let n = self.forces.node_count() as f64;
        let side = self.max_weight * (n.sqrt().ceil() - 1.0);
        for i in 0..self.forces.node_count() {
            let x = self.rng.next_f64_unit() * side;
            let y = self.rng.next_f64_unit() * side;
            self.forces.nodes[i].position.set(x, y);
        }
    }

    /// Closed-form placement for 0, 1, or 2 nodes. A pair lands on one of
    /// the two diagonals of a square sized so their Euclidean distance equals
    /// the edge weight (or the weight ceiling when unconnected), the RNG
    /// picking the diagonal.
    fn place_trivial(&mut self) {
        match self.forces.node_count() {
            0 => {}
            1 => self.forces.nodes[0].position.set(0.0, 0.0),
            _ => {
                let weight = self
                    .forces
                    .edge_between(0, 1)
                    .map(|e| e.weight())
                    .unwrap_or(self.max_weight);
                let half = weight / std::f64::consts::SQRT_2;
                let (pa, pb) = if self.rng.next_bool() {
                    (Vector::new(0.0, 0.0), Vector::new(half, half))
                } else {
                    (Vector::new(0.0, half), Vector::new(half, 0.0))
                };
                self.forces.nodes[0].position = pa;
                self.forces.nodes[1].position = pb;
            }
        }
    }

    /// One relaxation iteration. Returns whether the loop should keep going
    /// (some node moved at least `min_moves`).
    fn move_nodes(&mut self) -> bool {
        let n = self.forces.node_count();
        let mut max_move = 0.0f64;
        for a in 0..n {
            let pa = self.forces.nodes[a].position;
            let mut sum = Vector::default();
            let mut contributing = 0u32;
            for b in 0..n {
                if b == a {
                    continue;
                }
                let pb = self.forces.nodes[b].position;
                let mut dx = pb.x - pa.x;
                let mut dy = pb.y - pa.y;
                if dx == 0.0 && dy == 0.0 {
                    // Coincident points have no direction; nudge each
                    // component so the pair separates deterministically.
                    dx = if self.rng.next_bool() {
                        self.opts.min_moves
                    } else {
                        -self.opts.min_moves
                    };
                    dy = if self.rng.next_bool() {
                        self.opts.min_moves
                    } else {
                        -self.opts.min_moves
                    };
                }
                let edge_ix = self.forces.nodes[a].edge_to(b);
                if edge_ix.is_none()
                    && self.opts.far_pair_pruning
                    && dx.abs() > self.max_weight
                    && dy.abs() > self.max_weight
                {
                    // Bounding-box pre-check, cheaper than the distance below.
                    continue;
                }
                let dist = (dx * dx + dy * dy).sqrt();
                let weight = match edge_ix {
                    Some(ix) => {
                        self.forces.edges[ix].length = dist;
                        self.forces.edges[ix].weight
                    }
                    None => {
                        if self.opts.far_pair_pruning && dist > self.max_weight {
                            continue;
                        }
                        self.max_weight
                    }
                };
                // Positive factor pulls A toward B, negative pushes away.
                let factor = (dist - weight) / dist.max(1.0);
                sum.x += factor * dx;
                sum.y += factor * dy;
                contributing += 1;
            }
            if contributing == 0 {
                self.forces.nodes[a].force = Vector::default();
                continue;
            }
            sum.scale(1.0 / f64::from(contributing));
            let node = &mut self.forces.nodes[a];
            node.force = sum;
            node.position.add(sum);
            let moved = sum.length();
            if moved > max_move {
                max_move = moved;
            }
        }
        max_move >= self.opts.min_moves
    }

    /// Sum of `|distance − target|` over node pairs, using the same far-pair
    /// skip rule as the relaxation scan. Diagnostic only — the solver steers
    /// by movement, not stress. Refreshes each edge's cached length.
    pub fn global_stress(&mut self) -> f64 {
        let n = self.forces.node_count();
        let mut total = 0.0;
        for a in 0..n {
            for b in (a + 1)..n {
                let pa = self.forces.nodes[a].position;
                let pb = self.forces.nodes[b].position;
                let dx = pb.x - pa.x;
                let dy = pb.y - pa.y;
                let edge_ix = self.forces.nodes[a].edge_to(b);
                if edge_ix.is_none()
                    && self.opts.far_pair_pruning
                    && dx.abs() > self.max_weight
                    && dy.abs() > self.max_weight
                {
                    continue;
                }
                let dist = (dx * dx + dy * dy).sqrt();
                match edge_ix {
                    Some(ix) => {
                        self.forces.edges[ix].length = dist;
                        total += (dist - self.forces.edges[ix].weight).abs();
                    }
                    None => {
                        if self.opts.far_pair_pruning && dist > self.max_weight {
                            continue;
                        }
                        total += (dist - self.max_weight).abs();
                    }
                }
            }
        }
        total
    }

    fn result(&self, iterations: u64, stress: f64) -> LayoutResult<I> {
        let mut positions = IndexMap::with_capacity(self.forces.node_count());
        for node in self.forces.nodes() {
            positions.insert(node.node_id, node.position);
        }
        LayoutResult {
            positions,
            iterations,
            stress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SpringLayout, SpringOptions};
    use crate::graph::{Edge, Graph};

    struct TestEdge(u32, u32, f64);

    impl Edge for TestEdge {
        type NodeId = u32;

        fn endpoints(&self) -> (u32, u32) {
            (self.0, self.1)
        }

        fn weight(&self) -> f64 {
            self.2
        }
    }

    struct TestGraph {
        nodes: Vec<u32>,
        edges: Vec<TestEdge>,
    }

    impl Graph for TestGraph {
        type NodeId = u32;
        type Edge = TestEdge;

        fn node_ids(&self) -> impl Iterator<Item = u32> + '_ {
            self.nodes.iter().copied()
        }

        fn edges(&self) -> impl Iterator<Item = &TestEdge> + '_ {
            self.edges.iter()
        }
    }

    #[test]
    fn defaults_match_documented_thresholds() {
        let opts = SpringOptions::default();
        assert_eq!(opts.min_moves, 0.01);
        assert_eq!(opts.max_iterations, 20_000);
        assert!(opts.far_pair_pruning);
    }

    #[test]
    fn coincident_nodes_are_nudged_apart() {
        // Complete graph on 4 nodes: each node averages 3 pair forces, so the
        // ±min_moves nudges can never cancel to a zero step.
        let mut edges = Vec::new();
        for a in 1..=4u32 {
            for b in (a + 1)..=4 {
                edges.push(TestEdge(a, b, 5.0));
            }
        }
        let graph = TestGraph {
            nodes: vec![1, 2, 3, 4],
            edges,
        };
        let mut solver = SpringLayout::new(&graph, SpringOptions::default()).unwrap();
        // Force the degenerate start the random initializer avoids.
        for i in 0..solver.forces.node_count() {
            solver.forces.nodes[i].position.set(2.0, 2.0);
        }
        let keep_going = solver.move_nodes();
        assert!(keep_going);
        let positions: Vec<_> = solver.forces.nodes().iter().map(|n| n.position()).collect();
        for p in &positions {
            assert!(p.x.is_finite() && p.y.is_finite());
        }
        assert!(positions.iter().any(|p| *p != positions[0]));
    }

    #[test]
    fn edge_lengths_are_cached_by_stress_scan() {
        let graph = TestGraph {
            nodes: vec![1, 2, 3],
            edges: vec![TestEdge(1, 2, 5.0)],
        };
        let mut solver = SpringLayout::new(&graph, SpringOptions::default()).unwrap();
        solver.forces.nodes[0].position.set(0.0, 0.0);
        solver.forces.nodes[1].position.set(3.0, 4.0);
        solver.forces.nodes[2].position.set(100.0, 100.0);
        solver.global_stress();
        let edge = solver.force_graph().edge_between(0, 1).unwrap();
        assert_eq!(edge.length(), 5.0);
        assert_eq!(edge.stress(), 0.0);
    }

    #[test]
    fn edgeless_graph_gets_default_spread() {
        let graph = TestGraph {
            nodes: vec![1, 2, 3],
            edges: vec![],
        };
        let solver = SpringLayout::new(&graph, SpringOptions::default()).unwrap();
        assert_eq!(solver.max_weight(), super::DEFAULT_SPREAD);
        assert_eq!(solver.min_weight(), super::DEFAULT_SPREAD);
    }
}
