use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Classification of a similarity edge, carried through for rendering; the
/// layout engine ignores it. The byte tag is stable — it is what the
/// persisted layout artifact stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EdgeType {
    Ortholog,
    Coortholog,
    Inparalog,
    PeripheralCore,
    PeripheralPeripheral,
    #[default]
    Normal,
}

impl EdgeType {
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Single-letter display code used by the viewer legend.
    pub fn code(self) -> &'static str {
        match self {
            EdgeType::Ortholog => "O",
            EdgeType::Coortholog => "C",
            EdgeType::Inparalog => "P",
            EdgeType::PeripheralCore => "L",
            EdgeType::PeripheralPeripheral => "M",
            EdgeType::Normal => "N",
        }
    }
}

impl From<EdgeType> for u8 {
    fn from(value: EdgeType) -> u8 {
        value.tag()
    }
}

impl TryFrom<u8> for EdgeType {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self, Error> {
        match tag {
            0 => Ok(EdgeType::Ortholog),
            1 => Ok(EdgeType::Coortholog),
            2 => Ok(EdgeType::Inparalog),
            3 => Ok(EdgeType::PeripheralCore),
            4 => Ok(EdgeType::PeripheralPeripheral),
            5 => Ok(EdgeType::Normal),
            _ => Err(Error::UnknownEdgeType { tag }),
        }
    }
}

/// BLAST e-value as mantissa × 10^exponent, kept in its reported form
/// rather than collapsed to an `f64` (exponents routinely exceed the range
/// a double can represent as a plain value).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evalue {
    pub mant: f32,
    pub exp: i16,
}

impl Evalue {
    pub const fn new(mant: f32, exp: i16) -> Self {
        Self { mant, exp }
    }

    /// log10 of the e-value; −∞ for an exact zero mantissa.
    pub fn log10(&self) -> f64 {
        f64::from(self.mant).log10() + f64::from(self.exp)
    }
}

impl fmt::Display for Evalue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}E{}", self.mant, self.exp)
    }
}

impl FromStr for Evalue {
    type Err = Error;

    fn from_str(literal: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidEvalue {
            literal: literal.to_string(),
        };
        let (mant, exp) = literal
            .split_once(['E', 'e'])
            .ok_or_else(invalid)?;
        Ok(Self {
            mant: mant.trim().parse().map_err(|_| invalid())?,
            exp: exp.trim().parse().map_err(|_| invalid())?,
        })
    }
}

impl Serialize for Evalue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Evalue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        literal.parse().map_err(serde::de::Error::custom)
    }
}

/// Unordered pair of gene ids. Equality and hashing ignore orientation, so
/// a hit and its reciprocal land on the same map entry.
#[derive(Debug, Clone, Copy, Eq)]
pub struct GenePair {
    pub query_id: i32,
    pub subject_id: i32,
}

impl GenePair {
    pub fn new(query_id: i32, subject_id: i32) -> Self {
        Self {
            query_id,
            subject_id,
        }
    }

    fn ordered(&self) -> (i32, i32) {
        if self.query_id <= self.subject_id {
            (self.query_id, self.subject_id)
        } else {
            (self.subject_id, self.query_id)
        }
    }
}

impl PartialEq for GenePair {
    fn eq(&self, other: &Self) -> bool {
        self.ordered() == other.ordered()
    }
}

impl Hash for GenePair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
    }
}

/// One similarity edge between two genes of a group.
///
/// `weight` is the layout target distance, derived from the e-value(s) by
/// [`crate::WeightDeriver`] — it is not part of the exchange document.
/// When the reciprocal BLAST hit was also reported, its e-value is kept so
/// the two directions can be averaged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlastScore {
    pub query_id: i32,
    pub subject_id: i32,
    pub evalue: Evalue,
    #[serde(default, rename = "type")]
    pub edge_type: EdgeType,
    #[serde(skip)]
    pub weight: f64,
    #[serde(skip)]
    pub reciprocal: Option<Evalue>,
}

impl BlastScore {
    pub fn new(query_id: i32, subject_id: i32, evalue: Evalue) -> Self {
        Self {
            query_id,
            subject_id,
            evalue,
            edge_type: EdgeType::Normal,
            weight: 0.0,
            reciprocal: None,
        }
    }

    pub fn pair(&self) -> GenePair {
        GenePair::new(self.query_id, self.subject_id)
    }
}

impl biolayout_core::Edge for BlastScore {
    type NodeId = i32;

    fn endpoints(&self) -> (i32, i32) {
        (self.query_id, self.subject_id)
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

#[cfg(test)]
mod tests {
    use super::{BlastScore, EdgeType, Evalue, GenePair};
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(pair: GenePair) -> u64 {
        let mut hasher = DefaultHasher::new();
        pair.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn gene_pair_ignores_orientation() {
        let forward = GenePair::new(3, 9);
        let reverse = GenePair::new(9, 3);
        assert_eq!(forward, reverse);
        assert_eq!(hash_of(forward), hash_of(reverse));
        assert_ne!(forward, GenePair::new(3, 10));
    }

    #[test]
    fn evalue_literal_round_trip() {
        let parsed: Evalue = "1.5E-32".parse().unwrap();
        assert_eq!(parsed, Evalue::new(1.5, -32));
        assert_eq!(parsed.to_string(), "1.5E-32");

        let lower: Evalue = "2e10".parse().unwrap();
        assert_eq!(lower, Evalue::new(2.0, 10));

        assert!("garbage".parse::<Evalue>().is_err());
        assert!("1.5E".parse::<Evalue>().is_err());
        assert!("E-32".parse::<Evalue>().is_err());
    }

    #[test]
    fn evalue_log10_combines_mantissa_and_exponent() {
        let ev = Evalue::new(1.0, -50);
        assert_eq!(ev.log10(), -50.0);
        let ev = Evalue::new(0.0, 0);
        assert_eq!(ev.log10(), f64::NEG_INFINITY);
    }

    #[test]
    fn edge_type_tags_are_stable() {
        let expected: [(EdgeType, u8, &str); 6] = [
            (EdgeType::Ortholog, 0, "O"),
            (EdgeType::Coortholog, 1, "C"),
            (EdgeType::Inparalog, 2, "P"),
            (EdgeType::PeripheralCore, 3, "L"),
            (EdgeType::PeripheralPeripheral, 4, "M"),
            (EdgeType::Normal, 5, "N"),
        ];
        for (edge_type, tag, code) in expected {
            assert_eq!(edge_type.tag(), tag);
            assert_eq!(edge_type.code(), code);
            assert_eq!(EdgeType::try_from(tag).unwrap(), edge_type);
        }
        assert!(EdgeType::try_from(6).is_err());
    }

    #[test]
    fn score_serializes_like_the_exchange_document() {
        let mut score = BlastScore::new(11, 22, Evalue::new(4.2, -88));
        score.edge_type = EdgeType::Ortholog;
        score.weight = 12.5;
        let json = serde_json::to_value(&score).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "queryId": 11,
                "subjectId": 22,
                "evalue": "4.2E-88",
                "type": 0,
            })
        );
        let back: BlastScore = serde_json::from_value(json).unwrap();
        assert_eq!(back.evalue, Evalue::new(4.2, -88));
        assert_eq!(back.edge_type, EdgeType::Ortholog);
        // Weight is derived, not exchanged.
        assert_eq!(back.weight, 0.0);
    }
}
