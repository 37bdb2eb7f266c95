use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroupingError {
    #[error("face {id}: expected {expected}-dim embedding, got {got}")]
    DimensionMismatch { id: u64, expected: usize, got: usize },
    #[error("face {id}: embedding is empty")]
    EmptyEmbedding { id: u64 },
    #[error("face {id} appears more than once")]
    DuplicateId { id: u64 },
    #[error("face {id}: embedding contains non-finite values")]
    NonFinite { id: u64 },
}

/// A freshly uploaded face: identity key plus raw embedding, nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestFace {
    pub id: u64,
    pub mu: Vec<f64>,
}

impl IngestFace {
    pub fn new(id: u64, mu: Vec<f64>) -> Self {
        Self { id, mu }
    }
}

/// Domain interface for grouping faces by likely identity.
///
/// Returns disjoint groups of face ids covering every input face.
pub trait FaceGrouper: Send {
    fn group(&self, faces: &[IngestFace]) -> Result<Vec<Vec<u64>>, GroupingError>;
}
