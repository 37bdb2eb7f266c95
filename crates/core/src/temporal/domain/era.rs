use serde::{Deserialize, Serialize};

/// Ordered, non-overlapping historical period buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Era {
    Early,
    Middle,
    Late,
}

impl Era {
    pub const ALL: [Era; 3] = [Era::Early, Era::Middle, Era::Late];

    pub fn index(self) -> usize {
        match self {
            Era::Early => 0,
            Era::Middle => 1,
            Era::Late => 2,
        }
    }
}

impl std::fmt::Display for Era {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Era::Early => write!(f, "early"),
            Era::Middle => write!(f, "middle"),
            Era::Late => write!(f, "late"),
        }
    }
}

/// Probability mass per era bin. Expected to sum to 1.0; not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EraProbabilities {
    pub early: f64,
    pub middle: f64,
    pub late: f64,
}

impl EraProbabilities {
    pub fn new(early: f64, middle: f64, late: f64) -> Self {
        Self {
            early,
            middle,
            late,
        }
    }

    /// All mass on a single bin.
    pub fn one_hot(era: Era) -> Self {
        let mut p = [0.0; 3];
        p[era.index()] = 1.0;
        Self::from(p)
    }

    /// No temporal evidence.
    pub fn uniform() -> Self {
        let third = 1.0 / 3.0;
        Self::new(third, third, third)
    }

    pub fn get(&self, era: Era) -> f64 {
        match era {
            Era::Early => self.early,
            Era::Middle => self.middle,
            Era::Late => self.late,
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.early, self.middle, self.late]
    }
}

impl From<[f64; 3]> for EraProbabilities {
    fn from(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

/// Era classification for one face, produced upstream and consumed as evidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EraEstimate {
    pub era: Era,
    pub probabilities: EraProbabilities,
    /// Gap between the top two bin probabilities.
    pub confidence: f64,
}

impl EraEstimate {
    /// Derives the most likely bin and the top1-top2 confidence gap.
    ///
    /// Ties resolve to the earliest bin.
    pub fn from_probabilities(probabilities: EraProbabilities) -> Self {
        let mut best = Era::Early;
        for era in Era::ALL {
            if probabilities.get(era) > probabilities.get(best) {
                best = era;
            }
        }

        let mut sorted = probabilities.as_array();
        sorted.sort_by(|a, b| b.total_cmp(a));

        Self {
            era: best,
            probabilities,
            confidence: sorted[0] - sorted[1],
        }
    }

    pub fn certain(era: Era) -> Self {
        Self::from_probabilities(EraProbabilities::one_hot(era))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_eras_are_ordered() {
        assert!(Era::Early < Era::Middle);
        assert!(Era::Middle < Era::Late);
        let indices: Vec<usize> = Era::ALL.iter().map(|e| e.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_one_hot() {
        let p = EraProbabilities::one_hot(Era::Middle);
        assert_eq!(p.as_array(), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_uniform_sums_to_one() {
        let p = EraProbabilities::uniform();
        assert_relative_eq!(p.as_array().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_probabilities_picks_argmax_and_gap() {
        let est = EraEstimate::from_probabilities(EraProbabilities::new(0.1, 0.25, 0.65));
        assert_eq!(est.era, Era::Late);
        assert_relative_eq!(est.confidence, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_from_probabilities_tie_prefers_earliest() {
        let est = EraEstimate::from_probabilities(EraProbabilities::new(0.2, 0.4, 0.4));
        assert_eq!(est.era, Era::Middle);
        assert_eq!(est.confidence, 0.0);
    }

    #[test]
    fn test_certain_has_full_confidence() {
        let est = EraEstimate::certain(Era::Early);
        assert_eq!(est.era, Era::Early);
        assert_eq!(est.confidence, 1.0);
    }

    #[test]
    fn test_estimate_serde_shape() {
        let json = r#"{
            "era": "late",
            "probabilities": {"early": 0.05, "middle": 0.15, "late": 0.8},
            "confidence": 0.65
        }"#;
        let est: EraEstimate = serde_json::from_str(json).unwrap();
        assert_eq!(est.era, Era::Late);
        assert_relative_eq!(est.probabilities.get(Era::Middle), 0.15);
    }

    #[test]
    fn test_display() {
        assert_eq!(Era::Early.to_string(), "early");
        assert_eq!(Era::Late.to_string(), "late");
    }
}
