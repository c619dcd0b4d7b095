use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graph::{Edge, Graph};
use crate::vector::Vector;

/// Internal wrapper around one domain node.
///
/// Owns the simulation state the domain model must not see: the position
/// buffer, the per-iteration force, a dense id, and the adjacency map from
/// neighbour dense id to edge index.
#[derive(Debug, Clone)]
pub struct ForceNode<I> {
    pub(crate) id: usize,
    pub(crate) node_id: I,
    pub(crate) position: Vector,
    pub(crate) force: Vector,
    pub(crate) neighbours: FxHashMap<usize, usize>,
}

impl<I: Copy + Eq + Hash + Debug> ForceNode<I> {
    /// Dense id, 0..n-1 in enumeration order, stable for one layout run.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Identity of the wrapped domain node.
    pub fn node_id(&self) -> I {
        self.node_id
    }

    pub fn position(&self) -> Vector {
        self.position
    }

    /// Averaged force applied in the most recent iteration.
    pub fn force(&self) -> Vector {
        self.force
    }

    pub fn neighbour_count(&self) -> usize {
        self.neighbours.len()
    }

    /// Index (into [`ForceGraph::edges`]) of the edge to the node with dense
    /// id `other`, if one exists. O(1).
    pub fn edge_to(&self, other: usize) -> Option<usize> {
        self.neighbours.get(&other).copied()
    }
}

/// Internal wrapper around one domain edge.
#[derive(Debug, Clone)]
pub struct ForceEdge {
    pub(crate) a: usize,
    pub(crate) b: usize,
    pub(crate) weight: f64,
    pub(crate) length: f64,
}

impl ForceEdge {
    /// Dense ids of the two endpoints.
    pub fn endpoints(&self) -> (usize, usize) {
        (self.a, self.b)
    }

    /// Target distance. Strictly positive by construction.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Euclidean distance between the endpoints as of the last stress
    /// computation. Cached for reporting only.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Normalized discrepancy between actual and target distance.
    pub fn stress(&self) -> f64 {
        (self.length - self.weight).abs() / self.weight
    }
}

/// The wrapper graph one [`crate::SpringLayout`] simulates on.
///
/// Built once per layout run from a domain [`Graph`] snapshot; read-only
/// after construction except for the per-node position/force fields and the
/// per-edge cached lengths the solver updates while iterating.
#[derive(Debug, Clone)]
pub struct ForceGraph<I> {
    pub(crate) nodes: Vec<ForceNode<I>>,
    pub(crate) edges: Vec<ForceEdge>,
}

impl<I: Copy + Eq + Hash + Debug> ForceGraph<I> {
    /// Wraps a domain graph, assigning dense ids in enumeration order and
    /// registering every edge in both endpoints' neighbour maps.
    ///
    /// Fails fast on a duplicate node id, an edge endpoint missing from the
    /// node set, or a non-positive (or non-finite) edge weight. Validation
    /// happens here, before any iteration, so a malformed graph never begins
    /// simulating.
    pub fn from_graph<G>(graph: &G) -> Result<Self>
    where
        G: Graph<NodeId = I>,
    {
        let mut nodes = Vec::new();
        let mut index: FxHashMap<I, usize> = FxHashMap::default();
        for node_id in graph.node_ids() {
            let id = nodes.len();
            if index.insert(node_id, id).is_some() {
                return Err(Error::DuplicateNode {
                    node: format!("{node_id:?}"),
                });
            }
            nodes.push(ForceNode {
                id,
                node_id,
                position: Vector::default(),
                force: Vector::default(),
                neighbours: FxHashMap::default(),
            });
        }

        let mut edges = Vec::new();
        for edge in graph.edges() {
            let (qa, qb) = edge.endpoints();
            let a = *index.get(&qa).ok_or_else(|| Error::MissingEndpoint {
                node: format!("{qa:?}"),
            })?;
            let b = *index.get(&qb).ok_or_else(|| Error::MissingEndpoint {
                node: format!("{qb:?}"),
            })?;
            let weight = edge.weight();
            if !(weight > 0.0 && weight.is_finite()) {
                return Err(Error::NonPositiveWeight { weight });
            }
            let ix = edges.len();
            edges.push(ForceEdge {
                a,
                b,
                weight,
                length: 0.0,
            });
            // Symmetric registration: if A lists B, B lists A with the same
            // edge. A self-loop collapses to a single entry keyed by the
            // node's own id, which the pairwise scan never consults.
            nodes[a].neighbours.insert(b, ix);
            nodes[b].neighbours.insert(a, ix);
        }

        Ok(Self { nodes, edges })
    }

    pub fn nodes(&self) -> &[ForceNode<I>] {
        &self.nodes
    }

    pub fn edges(&self) -> &[ForceEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The edge between dense ids `a` and `b`, if any. O(1).
    pub fn edge_between(&self, a: usize, b: usize) -> Option<&ForceEdge> {
        let ix = self.nodes.get(a)?.edge_to(b)?;
        Some(&self.edges[ix])
    }
}

#[cfg(test)]
mod tests {
    use super::ForceGraph;
    use crate::error::Error;
    use crate::graph::{Edge, Graph};

    struct TestEdge {
        a: u32,
        b: u32,
        weight: f64,
    }

    impl Edge for TestEdge {
        type NodeId = u32;

        fn endpoints(&self) -> (u32, u32) {
            (self.a, self.b)
        }

        fn weight(&self) -> f64 {
            self.weight
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

    fn edge(a: u32, b: u32, weight: f64) -> TestEdge {
        TestEdge { a, b, weight }
    }

    #[test]
    fn assigns_dense_ids_in_enumeration_order() {
        let graph = TestGraph {
            nodes: vec![100, 7, 42],
            edges: vec![edge(100, 42, 5.0)],
        };
        let forces = ForceGraph::from_graph(&graph).unwrap();
        assert_eq!(forces.node_count(), 3);
        let ids: Vec<u32> = forces.nodes().iter().map(|n| n.node_id()).collect();
        assert_eq!(ids, vec![100, 7, 42]);
        assert_eq!(forces.nodes()[0].id(), 0);
        assert_eq!(forces.nodes()[2].id(), 2);
    }

    #[test]
    fn adjacency_is_symmetric_and_shared() {
        let graph = TestGraph {
            nodes: vec![1, 2, 3],
            edges: vec![edge(1, 2, 4.0), edge(2, 3, 6.0)],
        };
        let forces = ForceGraph::from_graph(&graph).unwrap();
        let ab = forces.nodes()[0].edge_to(1).unwrap();
        let ba = forces.nodes()[1].edge_to(0).unwrap();
        assert_eq!(ab, ba);
        assert!(std::ptr::eq(
            forces.edge_between(0, 1).unwrap(),
            forces.edge_between(1, 0).unwrap()
        ));
        assert!(forces.edge_between(0, 2).is_none());
    }

    #[test]
    fn rejects_non_positive_weight() {
        for bad in [0.0, -3.5, f64::NAN] {
            let graph = TestGraph {
                nodes: vec![1, 2],
                edges: vec![edge(1, 2, bad)],
            };
            let err = ForceGraph::from_graph(&graph).unwrap_err();
            assert!(matches!(err, Error::NonPositiveWeight { .. }), "{bad}");
            assert!(err.to_string().contains("Weight must be positive"));
        }
    }

    #[test]
    fn rejects_unknown_endpoint() {
        let graph = TestGraph {
            nodes: vec![1, 2],
            edges: vec![edge(1, 9, 4.0)],
        };
        let err = ForceGraph::from_graph(&graph).unwrap_err();
        assert!(matches!(err, Error::MissingEndpoint { .. }));
    }

    #[test]
    fn rejects_duplicate_node_id() {
        let graph = TestGraph {
            nodes: vec![1, 2, 1],
            edges: vec![],
        };
        let err = ForceGraph::from_graph(&graph).unwrap_err();
        assert!(matches!(err, Error::DuplicateNode { .. }));
    }
}
