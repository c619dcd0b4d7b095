use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use biolayout_core::LayoutResult;

use crate::error::{Error, Result};
use crate::gene::Gene;
use crate::score::{BlastScore, EdgeType, GenePair};
use crate::weight::WeightDeriver;

/// One ortholog group: genes plus the similarity scores between them.
///
/// Both collections preserve insertion order, which fixes the dense node ids
/// the layout engine assigns and keeps exchange documents and persisted
/// artifacts stable across runs.
#[derive(Debug, Clone)]
pub struct Group {
    id: i32,
    name: String,
    genes: IndexMap<i32, Gene>,
    scores: IndexMap<GenePair, BlastScore>,
}

impl Group {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            genes: IndexMap::new(),
            scores: IndexMap::new(),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn genes(&self) -> &IndexMap<i32, Gene> {
        &self.genes
    }

    pub fn scores(&self) -> &IndexMap<GenePair, BlastScore> {
        &self.scores
    }

    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }

    pub fn score_count(&self) -> usize {
        self.scores.len()
    }

    pub fn add_gene(&mut self, gene: Gene) -> Result<()> {
        if self.genes.contains_key(&gene.id) {
            return Err(Error::DuplicateGene {
                gene_id: gene.id,
                group: self.name.clone(),
            });
        }
        self.genes.insert(gene.id, gene);
        Ok(())
    }

    /// Registers a directed BLAST hit. The first hit for a pair creates the
    /// score; the reciprocal direction, if reported later, is folded into the
    /// existing entry so weight derivation can average the two.
    pub fn add_score(&mut self, score: BlastScore) -> Result<()> {
        for gene_id in [score.query_id, score.subject_id] {
            if !self.genes.contains_key(&gene_id) {
                return Err(Error::UnknownGene {
                    gene_id,
                    group: self.name.clone(),
                });
            }
        }
        match self.scores.get_mut(&score.pair()) {
            Some(existing) => existing.reciprocal = Some(score.evalue),
            None => {
                self.scores.insert(score.pair(), score);
            }
        }
        Ok(())
    }

    /// Classifies an existing pair. A pair may be classified once; the
    /// ortholog/co-ortholog/in-paralog queries upstream are disjoint, so a
    /// second classification indicates corrupt input.
    pub fn set_edge_type(&mut self, pair: GenePair, edge_type: EdgeType) -> Result<()> {
        let score = self
            .scores
            .get_mut(&pair)
            .ok_or(Error::MissingScore {
                query_id: pair.query_id,
                subject_id: pair.subject_id,
            })?;
        if score.edge_type != EdgeType::Normal {
            return Err(Error::EdgeTypeConflict {
                query_id: pair.query_id,
                subject_id: pair.subject_id,
                existing: score.edge_type,
            });
        }
        score.edge_type = edge_type;
        Ok(())
    }

    /// Computes every score's target distance from its e-value(s).
    pub fn derive_weights(&mut self, deriver: &WeightDeriver) {
        for score in self.scores.values_mut() {
            score.weight = match score.reciprocal {
                Some(reverse) => deriver.paired(score.evalue, reverse),
                None => deriver.single(score.evalue),
            };
        }
    }

    /// Copies a finished layout back onto the gene positions. Ids absent
    /// from the result (never the case for a result produced from this
    /// group) are left untouched.
    pub fn apply_layout(&mut self, result: &LayoutResult<i32>) {
        for (gene_id, position) in &result.positions {
            if let Some(gene) = self.genes.get_mut(gene_id) {
                gene.point = *position;
            }
        }
    }

    pub fn from_json(document: &str) -> Result<Self> {
        let doc: GroupDoc = serde_json::from_str(document)?;
        let mut group = Group::new(doc.id, doc.name);
        for gene in doc.genes {
            group.add_gene(gene)?;
        }
        for score in doc.scores {
            group.add_score(score)?;
        }
        Ok(group)
    }

    pub fn to_json(&self) -> Result<String> {
        let doc = GroupDoc {
            id: self.id,
            name: self.name.clone(),
            genes: self.genes.values().cloned().collect(),
            scores: self.scores.values().cloned().collect(),
        };
        Ok(serde_json::to_string(&doc)?)
    }
}

impl biolayout_core::Graph for Group {
    type NodeId = i32;
    type Edge = BlastScore;

    fn node_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.genes.keys().copied()
    }

    fn edges(&self) -> impl Iterator<Item = &BlastScore> + '_ {
        self.scores.values()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupDoc {
    id: i32,
    name: String,
    genes: Vec<Gene>,
    scores: Vec<BlastScore>,
}

#[cfg(test)]
mod tests {
    use super::Group;
    use crate::error::Error;
    use crate::gene::Gene;
    use crate::score::{BlastScore, EdgeType, Evalue, GenePair};
    use crate::weight::WeightDeriver;

    fn group_of(gene_ids: &[i32]) -> Group {
        let mut group = Group::new(1, "OG6_100000");
        for &id in gene_ids {
            group.add_gene(Gene::new(id, format!("gene{id}"))).unwrap();
        }
        group
    }

    #[test]
    fn duplicate_gene_is_rejected() {
        let mut group = group_of(&[1, 2]);
        let err = group.add_gene(Gene::new(1, "again")).unwrap_err();
        assert!(matches!(err, Error::DuplicateGene { gene_id: 1, .. }));
    }

    #[test]
    fn score_requires_known_genes() {
        let mut group = group_of(&[1, 2]);
        let err = group
            .add_score(BlastScore::new(1, 3, Evalue::new(1.0, -10)))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownGene { gene_id: 3, .. }));
    }

    #[test]
    fn reciprocal_hit_merges_into_one_score() {
        let mut group = group_of(&[1, 2]);
        group
            .add_score(BlastScore::new(1, 2, Evalue::new(1.0, -10)))
            .unwrap();
        group
            .add_score(BlastScore::new(2, 1, Evalue::new(1.0, -30)))
            .unwrap();
        assert_eq!(group.score_count(), 1);

        group.derive_weights(&WeightDeriver::new(50.0));
        let score = &group.scores()[&GenePair::new(1, 2)];
        assert_eq!(score.weight, 30.0);
    }

    #[test]
    fn single_direction_weight_uses_one_evalue() {
        let mut group = group_of(&[1, 2]);
        group
            .add_score(BlastScore::new(1, 2, Evalue::new(1.0, -10)))
            .unwrap();
        group.derive_weights(&WeightDeriver::new(50.0));
        assert_eq!(group.scores()[&GenePair::new(1, 2)].weight, 40.0);
    }

    #[test]
    fn edge_type_can_be_set_once() {
        let mut group = group_of(&[1, 2]);
        group
            .add_score(BlastScore::new(1, 2, Evalue::new(1.0, -10)))
            .unwrap();
        let pair = GenePair::new(2, 1);
        group.set_edge_type(pair, EdgeType::Ortholog).unwrap();
        let err = group.set_edge_type(pair, EdgeType::Inparalog).unwrap_err();
        assert!(matches!(
            err,
            Error::EdgeTypeConflict {
                existing: EdgeType::Ortholog,
                ..
            }
        ));
        let err = group
            .set_edge_type(GenePair::new(1, 5), EdgeType::Ortholog)
            .unwrap_err();
        assert!(matches!(err, Error::MissingScore { .. }));
    }

    #[test]
    fn json_round_trip_preserves_order_and_evalues() {
        let mut group = group_of(&[5, 3, 8]);
        group
            .add_score(BlastScore::new(5, 3, Evalue::new(2.0, -12)))
            .unwrap();
        group
            .add_score(BlastScore::new(3, 8, Evalue::new(1.0, -7)))
            .unwrap();
        group.set_edge_type(GenePair::new(5, 3), EdgeType::Coortholog).unwrap();

        let json = group.to_json().unwrap();
        let back = Group::from_json(&json).unwrap();

        assert_eq!(back.id(), group.id());
        assert_eq!(back.name(), group.name());
        let ids: Vec<i32> = back.genes().keys().copied().collect();
        assert_eq!(ids, vec![5, 3, 8]);
        let score = &back.scores()[&GenePair::new(5, 3)];
        assert_eq!(score.evalue, Evalue::new(2.0, -12));
        assert_eq!(score.edge_type, EdgeType::Coortholog);
    }
}
