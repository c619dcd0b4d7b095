use crate::score::EdgeType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid e-value literal: {literal}")]
    InvalidEvalue { literal: String },

    #[error("unknown edge type tag: {tag}")]
    UnknownEdgeType { tag: u8 },

    #[error("duplicate gene {gene_id} in group {group}")]
    DuplicateGene { gene_id: i32, group: String },

    #[error("score references unknown gene {gene_id} in group {group}")]
    UnknownGene { gene_id: i32, group: String },

    #[error("no score exists for gene pair ({query_id}, {subject_id})")]
    MissingScore { query_id: i32, subject_id: i32 },

    #[error("gene pair ({query_id}, {subject_id}) already classified as {existing:?}")]
    EdgeTypeConflict {
        query_id: i32,
        subject_id: i32,
        existing: EdgeType,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
