use std::fmt::Debug;
use std::hash::Hash;

/// Read capabilities the solver needs from a domain edge.
///
/// `endpoints` returns the (query, subject) node ids; the order carries no
/// meaning for layout. `weight` is the target Euclidean distance between the
/// endpoints and must be strictly positive — [`crate::ForceGraph`] rejects
/// anything else at construction time.
pub trait Edge {
    type NodeId: Copy + Eq + Hash + Debug;

    fn endpoints(&self) -> (Self::NodeId, Self::NodeId);

    fn weight(&self) -> f64;
}

/// Read capabilities the solver needs from a domain graph.
///
/// Any concrete gene/score model satisfies this structurally; the engine
/// never mutates it. Node enumeration order is observable: dense internal
/// ids and the order of [`crate::LayoutResult::positions`] both follow it.
pub trait Graph {
    type NodeId: Copy + Eq + Hash + Debug;
    type Edge: Edge<NodeId = Self::NodeId>;

    fn node_ids(&self) -> impl Iterator<Item = Self::NodeId> + '_;

    fn edges(&self) -> impl Iterator<Item = &Self::Edge> + '_;
}
