//! Binary layout artifact.
//!
//! Big-endian, fixed-stride records; field order and widths are load-bearing
//! because existing stored layouts were written in exactly this shape:
//!
//! ```text
//! 0x0000  node_count: i32
//! 0x0004  edge_count: i32
//! then per node (12 B):  id: i32, x: f32, y: f32
//! then per edge (19 B):  query_id: i32, subject_id: i32, type_tag: u8,
//!                        evalue_mant: f32, evalue_exp: i16, weight: f32
//! ```

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use biolayout_model::{EdgeType, Evalue, Group};

use crate::error::{Error, Result};

const HEADER_STRIDE: usize = 8;
const NODE_STRIDE: usize = 12;
const EDGE_STRIDE: usize = 19;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRecord {
    pub id: i32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    pub query_id: i32,
    pub subject_id: i32,
    pub edge_type: EdgeType,
    pub evalue: Evalue,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRecord {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

/// Packs a laid-out group into the artifact bytes.
pub fn encode(group: &Group) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        HEADER_STRIDE + group.gene_count() * NODE_STRIDE + group.score_count() * EDGE_STRIDE,
    );
    out.extend_from_slice(&(group.gene_count() as i32).to_be_bytes());
    out.extend_from_slice(&(group.score_count() as i32).to_be_bytes());
    for gene in group.genes().values() {
        out.extend_from_slice(&gene.id.to_be_bytes());
        out.extend_from_slice(&(gene.point.x as f32).to_be_bytes());
        out.extend_from_slice(&(gene.point.y as f32).to_be_bytes());
    }
    for score in group.scores().values() {
        out.extend_from_slice(&score.query_id.to_be_bytes());
        out.extend_from_slice(&score.subject_id.to_be_bytes());
        out.push(score.edge_type.tag());
        out.extend_from_slice(&score.evalue.mant.to_be_bytes());
        out.extend_from_slice(&score.evalue.exp.to_be_bytes());
        out.extend_from_slice(&(score.weight as f32).to_be_bytes());
    }
    out
}

/// Unpacks artifact bytes. The byte length must match the declared counts
/// exactly; anything else indicates a corrupt store.
pub fn decode(bytes: &[u8]) -> Result<LayoutRecord> {
    if bytes.len() < HEADER_STRIDE {
        return Err(Error::Truncated {
            expected: HEADER_STRIDE,
            actual: bytes.len(),
        });
    }
    let mut reader = Reader { bytes, pos: 0 };
    let node_count = reader.read_i32()?;
    let edge_count = reader.read_i32()?;
    if node_count < 0 || edge_count < 0 {
        return Err(Error::InvalidCounts {
            nodes: node_count,
            edges: edge_count,
        });
    }
    let expected =
        HEADER_STRIDE + node_count as usize * NODE_STRIDE + edge_count as usize * EDGE_STRIDE;
    if bytes.len() < expected {
        return Err(Error::Truncated {
            expected,
            actual: bytes.len(),
        });
    }
    if bytes.len() > expected {
        return Err(Error::TrailingBytes {
            extra: bytes.len() - expected,
        });
    }

    let mut nodes = Vec::with_capacity(node_count as usize);
    for _ in 0..node_count {
        nodes.push(NodeRecord {
            id: reader.read_i32()?,
            x: reader.read_f32()?,
            y: reader.read_f32()?,
        });
    }
    let mut edges = Vec::with_capacity(edge_count as usize);
    for _ in 0..edge_count {
        edges.push(EdgeRecord {
            query_id: reader.read_i32()?,
            subject_id: reader.read_i32()?,
            edge_type: EdgeType::try_from(reader.read_u8()?)?,
            evalue: Evalue::new(reader.read_f32()?, reader.read_i16()?),
            weight: reader.read_f32()?,
        });
    }
    Ok(LayoutRecord { nodes, edges })
}

/// Deflate (zlib) compression for storage, matching the store's existing
/// `Deflater`-written blobs.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(bytes.len()), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(bytes.len() * 2);
    ZlibDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.pos + N;
        let slice = self.bytes.get(self.pos..end).ok_or(Error::Truncated {
            expected: end,
            actual: self.bytes.len(),
        })?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.take()?))
    }

    fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_be_bytes(self.take()?))
    }

    fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.take()?))
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }
}
