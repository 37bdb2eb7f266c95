use crate::embedding::domain::mls::pfe_mls;
use crate::embedding::domain::pfe::Pfe;
use crate::temporal::domain::era::{EraEstimate, EraProbabilities};

pub const ADJACENT_ERA_PENALTY: f64 = -2.0;
pub const DISTANT_ERA_PENALTY: f64 = -10.0;

/// Penalty for each (era_i, era_j) pairing over the ordered bins.
const PENALTY_MATRIX: [[f64; 3]; 3] = [
    [0.0, ADJACENT_ERA_PENALTY, DISTANT_ERA_PENALTY],
    [ADJACENT_ERA_PENALTY, 0.0, ADJACENT_ERA_PENALTY],
    [DISTANT_ERA_PENALTY, ADJACENT_ERA_PENALTY, 0.0],
];

/// Bayesian era prior added to MLS scores.
///
/// The penalty is the expectation of the matrix over both era distributions,
/// so confident estimates in far-apart bins cost the full penalty while a
/// near-uniform estimate on either side only softens the score.
#[derive(Clone, Debug, PartialEq)]
pub struct TemporalPrior {
    scale: f64,
}

impl TemporalPrior {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn penalty(&self, a: &EraProbabilities, b: &EraProbabilities) -> f64 {
        let pa = a.as_array();
        let pb = b.as_array();
        let mut expected = 0.0;
        for (i, row) in PENALTY_MATRIX.iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                expected += pa[i] * pb[j] * cell;
            }
        }
        self.scale * expected
    }

    /// Penalty between two optional estimates; a missing estimate is uniform.
    pub fn penalty_between(&self, a: Option<&EraEstimate>, b: Option<&EraEstimate>) -> f64 {
        let uniform = EraProbabilities::uniform();
        let pa = a.map_or(uniform, |e| e.probabilities);
        let pb = b.map_or(uniform, |e| e.probabilities);
        self.penalty(&pa, &pb)
    }

    /// MLS plus the era penalty for the pair.
    pub fn mls_with_temporal(&self, a: &Pfe, b: &Pfe) -> f64 {
        pfe_mls(a, b) + self.penalty_between(a.era(), b.era())
    }
}

impl Default for TemporalPrior {
    fn default() -> Self {
        Self::new(1.0)
    }
}
