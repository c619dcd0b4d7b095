#![forbid(unsafe_code)]

//! Batch layout of many independent ortholog groups.
//!
//! Parallelism is *across* groups, never within one: each worker thread owns
//! its own solver instance for the group it pulled from the shared queue, so
//! no simulation state is ever shared between threads. The finished
//! coordinates are packed into the compact binary artifact the group store
//! persists (optionally deflate-compressed).

pub mod codec;
pub mod error;
pub mod pool;

pub use codec::{EdgeRecord, LayoutRecord, NodeRecord};
pub use error::{Error, Result};
pub use pool::{LaidOutGroup, LayoutPool, PoolConfig, PoolStats, layout_all};
