pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("layout artifact truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("layout artifact has {extra} trailing bytes")]
    TrailingBytes { extra: usize },

    #[error("layout artifact declares invalid counts: {nodes} nodes, {edges} edges")]
    InvalidCounts { nodes: i32, edges: i32 },

    #[error("group submitted after the pool shut down")]
    QueueClosed,

    #[error("layout worker panicked")]
    WorkerPanic,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Layout(#[from] biolayout_core::Error),

    #[error(transparent)]
    Model(#[from] biolayout_model::Error),
}
