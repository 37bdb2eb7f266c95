use ndarray::{Array1, ArrayView1};
use thiserror::Error;

use crate::shared::config::ClusterConfig;
use crate::shared::constants::{
    DEFAULT_MAX_SIGMA_SQ, DEFAULT_MIN_SIGMA_SQ, EMBEDDING_DIM, REFERENCE_FACE_AREA,
};
use crate::shared::face_detection::{BoundingBox, FaceDetection};
use crate::temporal::domain::era::EraEstimate;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PfeError {
    #[error("face {face_id}: expected {expected}-dim embedding, got {got}")]
    DimensionMismatch {
        face_id: u64,
        expected: usize,
        got: usize,
    },
    #[error("face {face_id}: embedding is empty")]
    EmptyEmbedding { face_id: u64 },
    #[error("face {face_id}: embedding contains non-finite values")]
    NonFiniteEmbedding { face_id: u64 },
    #[error("face {face_id}: sigma_sq must be positive and finite")]
    InvalidVariance { face_id: u64 },
    #[error("face {face_id}: mu has {mu} dims but sigma_sq has {sigma_sq}")]
    ShapeMismatch {
        face_id: u64,
        mu: usize,
        sigma_sq: usize,
    },
}

/// Probabilistic Face Embedding: a mean vector plus per-dimension variance.
///
/// Only constructible through [`Pfe::new`], which rejects empty or
/// non-finite means and non-positive variances, so every `Pfe` is safe to
/// score.
#[derive(Clone, Debug, PartialEq)]
pub struct Pfe {
    face_id: u64,
    filename: String,
    quality: f64,
    det_score: f64,
    era: Option<EraEstimate>,
    mu: Array1<f64>,
    sigma_sq: Array1<f64>,
}

impl Pfe {
    pub fn new(
        face_id: u64,
        filename: impl Into<String>,
        mu: Array1<f64>,
        sigma_sq: Array1<f64>,
    ) -> Result<Self, PfeError> {
        if mu.len() != sigma_sq.len() {
            return Err(PfeError::ShapeMismatch {
                face_id,
                mu: mu.len(),
                sigma_sq: sigma_sq.len(),
            });
        }
        if mu.is_empty() {
            return Err(PfeError::EmptyEmbedding { face_id });
        }
        if !mu.iter().all(|v| v.is_finite()) {
            return Err(PfeError::NonFiniteEmbedding { face_id });
        }
        if !sigma_sq.iter().all(|&s| s.is_finite() && s > 0.0) {
            return Err(PfeError::InvalidVariance { face_id });
        }
        Ok(Self {
            face_id,
            filename: filename.into(),
            quality: 0.0,
            det_score: 0.0,
            era: None,
            mu,
            sigma_sq,
        })
    }

    pub fn with_quality(mut self, quality: f64, det_score: f64) -> Self {
        self.quality = quality;
        self.det_score = det_score;
        self
    }

    pub fn with_era(mut self, era: EraEstimate) -> Self {
        self.era = Some(era);
        self
    }

    pub fn face_id(&self) -> u64 {
        self.face_id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn quality(&self) -> f64 {
        self.quality
    }

    pub fn det_score(&self) -> f64 {
        self.det_score
    }

    pub fn era(&self) -> Option<&EraEstimate> {
        self.era.as_ref()
    }

    pub fn mu(&self) -> ArrayView1<'_, f64> {
        self.mu.view()
    }

    pub fn sigma_sq(&self) -> ArrayView1<'_, f64> {
        self.sigma_sq.view()
    }

    pub fn dim(&self) -> usize {
        self.mu.len()
    }

    /// Mean variance across dimensions. Never empty, so always positive.
    pub fn sigma_sq_scalar(&self) -> f64 {
        self.sigma_sq.sum() / self.sigma_sq.len() as f64
    }

    /// The shared variance when every dimension carries the same value.
    pub fn uniform_sigma_sq(&self) -> Option<f64> {
        let first = *self.sigma_sq.first()?;
        self.sigma_sq
            .iter()
            .all(|&s| s == first)
            .then_some(first)
    }
}

/// Turns raw detections into PFEs, deriving variance from detection quality.
///
/// Sharp, confident, large faces get variance near `min_sigma_sq`; blurry,
/// tiny or doubtful ones approach `max_sigma_sq`.
#[derive(Clone, Debug)]
pub struct PfeBuilder {
    min_sigma_sq: f64,
    max_sigma_sq: f64,
    reference_area: f64,
    embedding_dim: usize,
}

impl PfeBuilder {
    pub fn new(
        min_sigma_sq: f64,
        max_sigma_sq: f64,
        reference_area: f64,
        embedding_dim: usize,
    ) -> Self {
        Self {
            min_sigma_sq,
            max_sigma_sq,
            reference_area,
            embedding_dim,
        }
    }

    pub fn from_config(config: &ClusterConfig) -> Self {
        Self::new(
            config.min_sigma_sq,
            config.max_sigma_sq,
            config.reference_area,
            config.embedding_dim,
        )
    }

    /// Detection quality in `[0, 1]`: confidence scaled by relative face size.
    pub fn quality(&self, det_score: f64, bbox: &BoundingBox) -> f64 {
        let det_score = if det_score.is_nan() {
            0.0
        } else {
            det_score.clamp(0.0, 1.0)
        };
        let area_factor = (bbox.area() / self.reference_area).min(1.0);
        det_score * area_factor
    }

    /// Scalar variance, always within `[min_sigma_sq, max_sigma_sq]`.
    pub fn sigma_sq(&self, det_score: f64, bbox: &BoundingBox) -> f64 {
        let quality = self.quality(det_score, bbox);
        // Same as max - (max - min) * quality, but exact at both endpoints.
        (self.min_sigma_sq * quality + self.max_sigma_sq * (1.0 - quality))
            .clamp(self.min_sigma_sq, self.max_sigma_sq)
    }

    pub fn build(
        &self,
        face_id: u64,
        detection: &FaceDetection,
        era: Option<EraEstimate>,
    ) -> Result<Pfe, PfeError> {
        if detection.embedding.len() != self.embedding_dim {
            return Err(PfeError::DimensionMismatch {
                face_id,
                expected: self.embedding_dim,
                got: detection.embedding.len(),
            });
        }

        let quality = self.quality(detection.det_score, &detection.bbox);
        let sigma_sq = self.sigma_sq(detection.det_score, &detection.bbox);
        let mu = Array1::from_vec(detection.embedding.clone());
        let sigma_sq = Array1::from_elem(self.embedding_dim, sigma_sq);

        let pfe = Pfe::new(face_id, detection.filename.clone(), mu, sigma_sq)?
            .with_quality(quality, detection.det_score);
        Ok(match era {
            Some(e) => pfe.with_era(e),
            None => pfe,
        })
    }
}

impl Default for PfeBuilder {
    fn default() -> Self {
        Self::new(
            DEFAULT_MIN_SIGMA_SQ,
            DEFAULT_MAX_SIGMA_SQ,
            REFERENCE_FACE_AREA,
            EMBEDDING_DIM,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::domain::era::Era;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn detection(det_score: f64, bbox: [f64; 4]) -> FaceDetection {
        FaceDetection {
            embedding: vec![0.05; EMBEDDING_DIM],
            det_score,
            bbox: BoundingBox::from(bbox),
            filename: "portrait.jpg".to_string(),
        }
    }

    #[test]
    fn test_best_quality_gives_min_sigma() {
        let builder = PfeBuilder::default();
        let bbox = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(builder.sigma_sq(1.0, &bbox), 0.01);
    }

    #[test]
    fn test_worst_quality_gives_max_sigma() {
        let builder = PfeBuilder::default();
        let bbox = BoundingBox::new(10.0, 10.0, 10.0, 10.0);
        assert_eq!(builder.sigma_sq(0.0, &bbox), 1.0);
    }

    #[test]
    fn test_area_beyond_reference_is_capped() {
        let builder = PfeBuilder::default();
        let bbox = BoundingBox::new(0.0, 0.0, 400.0, 400.0);
        assert_eq!(builder.quality(1.0, &bbox), 1.0);
    }

    #[test]
    fn test_partial_quality_interpolates() {
        let builder = PfeBuilder::default();
        // area 5000 -> factor 0.5, quality 0.4
        let bbox = BoundingBox::new(0.0, 0.0, 100.0, 50.0);
        assert_relative_eq!(builder.quality(0.8, &bbox), 0.4, epsilon = 1e-12);
        assert_relative_eq!(builder.sigma_sq(0.8, &bbox), 1.0 - 0.99 * 0.4, epsilon = 1e-12);
    }

    #[rstest]
    #[case(-3.0, [0.0, 0.0, 100.0, 100.0])]
    #[case(7.5, [0.0, 0.0, 100.0, 100.0])]
    #[case(f64::NAN, [0.0, 0.0, 100.0, 100.0])]
    #[case(0.7, [100.0, 100.0, 0.0, 0.0])]
    #[case(0.7, [0.0, 0.0, 1e9, 1e9])]
    fn test_sigma_always_within_bounds(#[case] det_score: f64, #[case] bbox: [f64; 4]) {
        let builder = PfeBuilder::default();
        let sigma = builder.sigma_sq(det_score, &BoundingBox::from(bbox));
        assert!((0.01..=1.0).contains(&sigma), "sigma {sigma} out of range");
    }

    #[test]
    fn test_build_broadcasts_uniform_sigma() {
        let builder = PfeBuilder::default();
        let pfe = builder
            .build(7, &detection(1.0, [0.0, 0.0, 100.0, 100.0]), None)
            .unwrap();
        assert_eq!(pfe.dim(), EMBEDDING_DIM);
        assert_eq!(pfe.uniform_sigma_sq(), Some(0.01));
        assert_eq!(pfe.face_id(), 7);
        assert_eq!(pfe.filename(), "portrait.jpg");
        assert_eq!(pfe.quality(), 1.0);
        assert!(pfe.era().is_none());
    }

    #[test]
    fn test_build_carries_era() {
        let builder = PfeBuilder::default();
        let pfe = builder
            .build(
                1,
                &detection(0.9, [0.0, 0.0, 50.0, 50.0]),
                Some(EraEstimate::certain(Era::Late)),
            )
            .unwrap();
        assert_eq!(pfe.era().map(|e| e.era), Some(Era::Late));
    }

    #[test]
    fn test_build_rejects_wrong_dimension() {
        let builder = PfeBuilder::default();
        let mut det = detection(0.9, [0.0, 0.0, 50.0, 50.0]);
        det.embedding.truncate(128);
        assert_eq!(
            builder.build(3, &det, None),
            Err(PfeError::DimensionMismatch {
                face_id: 3,
                expected: 512,
                got: 128
            })
        );
    }

    #[test]
    fn test_build_rejects_non_finite_embedding() {
        let builder = PfeBuilder::default();
        let mut det = detection(0.9, [0.0, 0.0, 50.0, 50.0]);
        det.embedding[42] = f64::INFINITY;
        assert_eq!(
            builder.build(4, &det, None),
            Err(PfeError::NonFiniteEmbedding { face_id: 4 })
        );
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.5)]
    #[case(f64::NAN)]
    fn test_new_rejects_bad_variance(#[case] sigma: f64) {
        let result = Pfe::new(
            1,
            "x.jpg",
            Array1::zeros(4),
            Array1::from_vec(vec![0.1, 0.1, sigma, 0.1]),
        );
        assert_eq!(result, Err(PfeError::InvalidVariance { face_id: 1 }));
    }

    #[test]
    fn test_new_rejects_shape_mismatch() {
        let result = Pfe::new(2, "x.jpg", Array1::zeros(4), Array1::ones(3));
        assert!(matches!(result, Err(PfeError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_new_rejects_empty_embedding() {
        let result = Pfe::new(9, "x.jpg", Array1::zeros(0), Array1::zeros(0));
        assert_eq!(result, Err(PfeError::EmptyEmbedding { face_id: 9 }));
    }

    #[test]
    fn test_non_uniform_sigma_has_no_scalar() {
        let pfe = Pfe::new(
            1,
            "x.jpg",
            Array1::zeros(3),
            Array1::from_vec(vec![0.1, 0.2, 0.3]),
        )
        .unwrap();
        assert_eq!(pfe.uniform_sigma_sq(), None);
        assert_relative_eq!(pfe.sigma_sq_scalar(), 0.2, epsilon = 1e-12);
    }
}
