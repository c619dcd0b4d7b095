#![forbid(unsafe_code)]

//! Domain model for ortholog groups.
//!
//! A [`Group`] is a set of genes connected by BLAST similarity scores. The
//! scores double as layout edges: their e-values are folded into target
//! distances by [`WeightDeriver`], after which the group satisfies the
//! `biolayout-core` graph contract and can be laid out directly. Groups
//! round-trip through the JSON exchange document used between the loading
//! pipeline and the viewer.

pub mod error;
pub mod gene;
pub mod group;
pub mod score;
pub mod weight;

pub use error::{Error, Result};
pub use gene::Gene;
pub use group::Group;
pub use score::{BlastScore, EdgeType, Evalue, GenePair};
pub use weight::WeightDeriver;
