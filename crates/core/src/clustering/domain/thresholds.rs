use serde::{Deserialize, Serialize};

/// Ingestion grouping cut-off (Euclidean distance over normalized embeddings).
pub const GROUPING_THRESHOLD: f64 = 1.00;
pub const MATCH_VERY_HIGH: f64 = 1.00;
pub const MATCH_HIGH: f64 = 1.10;
pub const MATCH_MODERATE: f64 = 1.20;
pub const MATCH_MEDIUM: f64 = 1.30;
pub const MATCH_LOW: f64 = 1.40;

const _: () = assert!(
    Thresholds::DEFAULT.is_ordered(),
    "compiled-in match thresholds must be monotonic"
);

/// Distance bands used for grouping and confidence labelling.
///
/// Must satisfy `grouping <= very_high < high < moderate < medium < low`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub grouping: f64,
    pub very_high: f64,
    pub high: f64,
    pub moderate: f64,
    pub medium: f64,
    pub low: f64,
}

impl Thresholds {
    pub const DEFAULT: Thresholds = Thresholds {
        grouping: GROUPING_THRESHOLD,
        very_high: MATCH_VERY_HIGH,
        high: MATCH_HIGH,
        moderate: MATCH_MODERATE,
        medium: MATCH_MEDIUM,
        low: MATCH_LOW,
    };

    pub const fn is_ordered(&self) -> bool {
        self.grouping <= self.very_high
            && self.very_high < self.high
            && self.high < self.moderate
            && self.moderate < self.medium
            && self.medium < self.low
    }

    /// Checks the band ordering; call once when configuration is loaded.
    pub fn validate(&self) -> Result<(), String> {
        let values = [
            self.grouping,
            self.very_high,
            self.high,
            self.moderate,
            self.medium,
            self.low,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(format!("thresholds must be finite: {self:?}"));
        }
        if !self.is_ordered() {
            return Err(format!(
                "thresholds must satisfy grouping <= very_high < high < moderate < medium < low, got {self:?}"
            ));
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Confidence label for a raw embedding distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    NoMatch,
    Low,
    Medium,
    Moderate,
    High,
    VeryHigh,
}

impl MatchConfidence {
    pub fn from_distance(distance: f64, thresholds: &Thresholds) -> Self {
        if distance < thresholds.very_high {
            MatchConfidence::VeryHigh
        } else if distance < thresholds.high {
            MatchConfidence::High
        } else if distance < thresholds.moderate {
            MatchConfidence::Moderate
        } else if distance < thresholds.medium {
            MatchConfidence::Medium
        } else if distance < thresholds.low {
            MatchConfidence::Low
        } else {
            MatchConfidence::NoMatch
        }
    }
}

impl std::fmt::Display for MatchConfidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchConfidence::VeryHigh => write!(f, "very high"),
            MatchConfidence::High => write!(f, "high"),
            MatchConfidence::Moderate => write!(f, "moderate"),
            MatchConfidence::Medium => write!(f, "medium"),
            MatchConfidence::Low => write!(f, "low"),
            MatchConfidence::NoMatch => write!(f, "no match"),
        }
    }
}
