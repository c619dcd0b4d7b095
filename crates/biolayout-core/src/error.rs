pub type Result<T> = std::result::Result<T, Error>;

/// Construction-time validation failures.
///
/// All of these are raised eagerly, before any simulation state moves; a
/// malformed graph never begins iterating. No error is expected to escape
/// [`crate::SpringLayout::process`] under correct usage.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Weight must be positive: {weight}")]
    NonPositiveWeight { weight: f64 },

    #[error("edge references a node not present in the graph: {node}")]
    MissingEndpoint { node: String },

    #[error("duplicate node id in graph: {node}")]
    DuplicateNode { node: String },
}
