//! Ingestion-time face grouper over raw embedding distance.
//!
//! Runs before uncertainty or era evidence exists, so it compares means only
//! and groups transitively (A~B and B~C puts A, B, C together).

use std::collections::HashSet;

use crate::clustering::domain::face_grouper::{FaceGrouper, GroupingError, IngestFace};
use crate::clustering::domain::thresholds::{Thresholds, GROUPING_THRESHOLD};
use crate::clustering::infrastructure::math;

pub struct EuclideanFaceGrouper {
    threshold: f64,
}

impl EuclideanFaceGrouper {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn from_thresholds(thresholds: &Thresholds) -> Self {
        Self::new(thresholds.grouping)
    }
}

impl Default for EuclideanFaceGrouper {
    fn default() -> Self {
        Self::new(GROUPING_THRESHOLD)
    }
}

impl FaceGrouper for EuclideanFaceGrouper {
    fn group(&self, faces: &[IngestFace]) -> Result<Vec<Vec<u64>>, GroupingError> {
        let Some(first) = faces.first() else {
            return Ok(Vec::new());
        };

        let dim = first.mu.len();
        if dim == 0 {
            return Err(GroupingError::EmptyEmbedding { id: first.id });
        }
        let mut seen = HashSet::with_capacity(faces.len());
        for face in faces {
            if !seen.insert(face.id) {
                return Err(GroupingError::DuplicateId { id: face.id });
            }
            if face.mu.len() != dim {
                return Err(GroupingError::DimensionMismatch {
                    id: face.id,
                    expected: dim,
                    got: face.mu.len(),
                });
            }
            if !face.mu.iter().all(|v| v.is_finite()) {
                return Err(GroupingError::NonFinite { id: face.id });
            }
        }

        let n = faces.len();
        let mut parent: Vec<usize> = (0..n).collect();

        for i in 0..n {
            for j in (i + 1)..n {
                if math::euclidean_distance(&faces[i].mu, &faces[j].mu) < self.threshold {
                    math::union(&mut parent, i, j);
                }
            }
        }

        let entries: Vec<(usize, u64)> = faces
            .iter()
            .enumerate()
            .map(|(idx, face)| (idx, face.id))
            .collect();
        let groups = math::collect_groups(&mut parent, &entries);
        log::debug!("Grouped {n} uploaded faces into {} groups", groups.len());
        Ok(groups)
    }
}
