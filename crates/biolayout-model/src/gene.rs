use biolayout_core::Vector;
use serde::{Deserialize, Serialize};

/// One member gene of an ortholog group.
///
/// `point` is the laid-out position; it is flattened into the exchange
/// document as top-level `x`/`y` fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gene {
    pub id: i32,
    pub source_id: String,
    #[serde(default)]
    pub organism_id: i32,
    #[serde(default)]
    pub length: u32,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub point: Vector,
}

impl Gene {
    pub fn new(id: i32, source_id: impl Into<String>) -> Self {
        Self {
            id,
            source_id: source_id.into(),
            organism_id: 0,
            length: 0,
            description: String::new(),
            point: Vector::default(),
        }
    }
}
