use std::collections::{HashMap, HashSet};
use std::time::Instant;

use thiserror::Error;

use crate::clustering::domain::cluster::{Cluster, MatchRange};
use crate::clustering::infrastructure::hierarchical::{complete_linkage, CondensedMatrix};
use crate::embedding::domain::pfe::Pfe;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::config::ClusterConfig;
use crate::temporal::domain::temporal_prior::TemporalPrior;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    #[error("face {face_id}: expected {expected}-dim embedding, got {got}")]
    DimensionMismatch {
        face_id: u64,
        expected: usize,
        got: usize,
    },
    #[error("face {face_id} appears more than once")]
    DuplicateFace { face_id: u64 },
    #[error("non-finite similarity between faces {first} and {second}")]
    NonFiniteScore { first: u64, second: u64 },
}

/// Groups PFEs into identity clusters with an era-aware, adaptive cut.
///
/// Each run is a from-scratch batch over the given faces: scores every pair
/// with MLS plus the temporal prior, builds a complete-linkage dendrogram and
/// cuts it at a threshold derived from the dataset's average photo quality.
/// The outcome depends only on the set of faces, not on their order.
pub struct ClusterFacesUseCase {
    config: ClusterConfig,
    prior: TemporalPrior,
    logger: Box<dyn PipelineLogger>,
}

impl ClusterFacesUseCase {
    pub fn new(config: ClusterConfig, logger: Box<dyn PipelineLogger>) -> Self {
        let prior = TemporalPrior::new(config.temporal_scale);
        Self {
            config,
            prior,
            logger,
        }
    }

    pub fn execute(&mut self, mut faces: Vec<Pfe>) -> Result<Vec<Cluster>, ClusterError> {
        self.logger.reset();
        self.logger.metric("faces", faces.len() as f64);
        self.validate(&faces)?;

        if faces.len() <= 1 {
            return Ok(faces
                .into_iter()
                .map(|face| Cluster {
                    cluster_id: 0,
                    faces: vec![face],
                    match_range: None,
                })
                .collect());
        }

        faces.sort_by(|a, b| {
            a.filename()
                .cmp(b.filename())
                .then(a.face_id().cmp(&b.face_id()))
        });

        let reference_mls = reference_mls(&faces);
        let mls_threshold = reference_mls - self.config.mls_drop_threshold;
        let cut_distance = -mls_threshold;
        log::debug!(
            "Reference MLS {reference_mls:.2}, threshold {mls_threshold:.2} over {} faces",
            faces.len()
        );

        let start = Instant::now();
        let scores = self.score_pairs(&faces)?;
        self.logger
            .timing("scoring", start.elapsed().as_secs_f64() * 1000.0);

        let start = Instant::now();
        let dendrogram = complete_linkage(&scores.map(|s| -s));
        let labels = dendrogram.cut(cut_distance);
        self.logger
            .timing("linkage", start.elapsed().as_secs_f64() * 1000.0);

        let clusters = self.assemble(faces, &labels, &scores);
        self.logger.metric("clusters", clusters.len() as f64);
        self.logger.info(&format!(
            "Clustered {} faces into {} identities",
            labels.len(),
            clusters.len()
        ));
        self.logger.summary();
        Ok(clusters)
    }

    /// Every face must carry the configured dimension and a unique id.
    fn validate(&self, faces: &[Pfe]) -> Result<(), ClusterError> {
        let expected = self.config.embedding_dim;
        let mut seen = HashSet::with_capacity(faces.len());
        for face in faces {
            if face.dim() != expected {
                return Err(ClusterError::DimensionMismatch {
                    face_id: face.face_id(),
                    expected,
                    got: face.dim(),
                });
            }
            if !seen.insert(face.face_id()) {
                return Err(ClusterError::DuplicateFace {
                    face_id: face.face_id(),
                });
            }
        }
        Ok(())
    }

    /// Temporal-adjusted MLS for every unordered pair.
    fn score_pairs(&self, faces: &[Pfe]) -> Result<CondensedMatrix, ClusterError> {
        let scores = CondensedMatrix::from_fn(faces.len(), |i, j| {
            self.prior.mls_with_temporal(&faces[i], &faces[j])
        });
        if let Some(pos) = scores.values().iter().position(|s| !s.is_finite()) {
            let (i, j) = pair_at(faces.len(), pos);
            return Err(ClusterError::NonFiniteScore {
                first: faces[i].face_id(),
                second: faces[j].face_id(),
            });
        }
        Ok(scores)
    }

    /// Groups faces by label, numbering clusters by first appearance.
    fn assemble(&self, faces: Vec<Pfe>, labels: &[usize], scores: &CondensedMatrix) -> Vec<Cluster> {
        let mut cluster_of_label: HashMap<usize, usize> = HashMap::new();
        let mut members: Vec<Vec<usize>> = Vec::new();
        for (idx, &label) in labels.iter().enumerate() {
            let cluster_id = *cluster_of_label.entry(label).or_insert_with(|| {
                members.push(Vec::new());
                members.len() - 1
            });
            members[cluster_id].push(idx);
        }

        let ranges: Vec<Option<MatchRange>> = members
            .iter()
            .map(|idxs| self.match_range(idxs, scores))
            .collect();

        let mut slots: Vec<Option<Pfe>> = faces.into_iter().map(Some).collect();
        members
            .into_iter()
            .zip(ranges)
            .enumerate()
            .map(|(cluster_id, (idxs, match_range))| Cluster {
                cluster_id,
                faces: idxs.iter().filter_map(|&i| slots[i].take()).collect(),
                match_range,
            })
            .collect()
    }

    fn match_range(&self, members: &[usize], scores: &CondensedMatrix) -> Option<MatchRange> {
        let scale = self.config.probability_scale;
        let probabilities = members.iter().enumerate().flat_map(move |(k, &i)| {
            members[k + 1..]
                .iter()
                .map(move |&j| match_probability(scores.get(i, j), scale))
        });
        MatchRange::from_probabilities(probabilities)
    }
}

/// Best achievable same-identity MLS at the dataset's mean photo quality.
fn reference_mls(faces: &[Pfe]) -> f64 {
    let mean_sigma_sq =
        faces.iter().map(Pfe::sigma_sq_scalar).sum::<f64>() / faces.len() as f64;
    -(faces[0].dim() as f64) * (2.0 * mean_sigma_sq).ln()
}

/// Calibrated sigmoid: MLS 0 → 50%, -500 → ~1%, +500 → ~99% at scale 100.
pub fn match_probability(mls: f64, scale: f64) -> f64 {
    1.0 / (1.0 + (-mls / scale).exp())
}

/// Inverse of the condensed index: position → `(i, j)` with `i < j`.
fn pair_at(n: usize, pos: usize) -> (usize, usize) {
    let mut remaining = pos;
    for i in 0..n {
        let row = n - i - 1;
        if remaining < row {
            return (i, i + 1 + remaining);
        }
        remaining -= row;
    }
    (n.saturating_sub(2), n.saturating_sub(1))
}
