#![forbid(unsafe_code)]

//! Headless force-directed layout for similarity-weighted graphs.
//!
//! Given a graph whose edge weights are target Euclidean distances (in the
//! ortholog-group pipeline these are derived from BLAST e-values upstream),
//! the solver iteratively moves nodes so that inter-node distances approach
//! the edge weights while unconnected nodes stay apart. The engine is
//! runtime-agnostic and deterministic: all randomness flows through a seeded
//! PRNG supplied via [`SpringOptions`].
//!
//! The solver never mutates the caller's graph. It reads the domain model
//! through the [`Graph`]/[`Edge`] capability traits, simulates on its own
//! internal wrappers, and hands the final coordinates back as a
//! [`LayoutResult`] keyed by node id.

pub mod error;
pub mod force;
pub mod graph;
pub mod observer;
pub mod rng;
pub mod spring;
pub mod vector;

pub use error::{Error, Result};
pub use force::{ForceEdge, ForceGraph, ForceNode};
pub use graph::{Edge, Graph};
pub use observer::LayoutObserver;
pub use spring::{CancelToken, LayoutResult, SpringLayout, SpringOptions};
pub use vector::Vector;

/// One-shot layout entry point.
///
/// Builds a [`SpringLayout`] over `graph` and runs it to convergence (or the
/// iteration cap) without progress callbacks.
pub fn layout<G: Graph>(graph: &G, opts: SpringOptions) -> Result<LayoutResult<G::NodeId>> {
    let mut solver = SpringLayout::new(graph, opts)?;
    Ok(solver.process(&mut ()))
}
