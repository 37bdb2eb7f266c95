use serde::{Deserialize, Serialize};

use crate::embedding::domain::pfe::Pfe;
use crate::temporal::domain::era::Era;

/// Lowest and highest pairwise match probability inside one cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchRange {
    pub min: f64,
    pub max: f64,
}

impl MatchRange {
    /// Smallest range covering every probability, or `None` when empty.
    pub fn from_probabilities(probabilities: impl IntoIterator<Item = f64>) -> Option<Self> {
        probabilities.into_iter().fold(None, |range, p| {
            Some(match range {
                None => MatchRange { min: p, max: p },
                Some(r) => MatchRange {
                    min: r.min.min(p),
                    max: r.max.max(p),
                },
            })
        })
    }

    /// Formats as `"NN%-MM%"`, each bound rounded half-up independently.
    pub fn to_percent_string(&self) -> String {
        format!(
            "{}%-{}%",
            percent_half_up(self.min),
            percent_half_up(self.max)
        )
    }

    /// `"NN%-MM%"` for a range, `"N/A"` for a singleton.
    pub fn format(range: Option<&MatchRange>) -> String {
        range.map_or_else(|| "N/A".to_string(), MatchRange::to_percent_string)
    }
}

/// Rounds `p * 100` half-up, deciding ties on the exact product rather than
/// the rounded one (`0.825` is stored just below 82.5%, so it reads 82%).
fn percent_half_up(p: f64) -> i64 {
    let floor = (p * 100.0).floor();
    let excess = p.mul_add(100.0, -(floor + 0.5));
    if excess >= 0.0 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

/// Faces judged to be the same person in one clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub cluster_id: usize,
    pub faces: Vec<Pfe>,
    pub match_range: Option<MatchRange>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn to_report(&self) -> ClusterReport {
        ClusterReport {
            cluster_id: self.cluster_id,
            match_range: MatchRange::format(self.match_range.as_ref()),
            faces: self.faces.iter().map(FaceSummary::from).collect(),
        }
    }
}

/// Serializable cluster shape handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterReport {
    pub cluster_id: usize,
    pub match_range: String,
    pub faces: Vec<FaceSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceSummary {
    pub face_id: u64,
    pub filename: String,
    pub quality: f64,
    pub det_score: f64,
    pub era: Option<Era>,
    pub era_confidence: Option<f64>,
}

impl From<&Pfe> for FaceSummary {
    fn from(pfe: &Pfe) -> Self {
        Self {
            face_id: pfe.face_id(),
            filename: pfe.filename().to_string(),
            quality: pfe.quality(),
            det_score: pfe.det_score(),
            era: pfe.era().map(|e| e.era),
            era_confidence: pfe.era().map(|e| e.confidence),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::domain::era::EraEstimate;
    use ndarray::Array1;
    use rstest::rstest;

    #[test]
    fn test_format_example_range() {
        let range = MatchRange {
            min: 0.825,
            max: 0.914,
        };
        assert_eq!(range.to_percent_string(), "82%-91%");
    }

    #[test]
    fn test_format_none() {
        assert_eq!(MatchRange::format(None), "N/A");
    }

    #[rstest]
    #[case(0.0, 0)]
    #[case(1.0, 100)]
    #[case(0.125, 13)]
    #[case(0.375, 38)]
    #[case(0.004, 0)]
    #[case(0.005, 1)]
    #[case(0.5, 50)]
    #[case(0.999, 100)]
    #[case(0.914, 91)]
    fn test_percent_half_up(#[case] p: f64, #[case] expected: i64) {
        assert_eq!(percent_half_up(p), expected);
    }

    #[test]
    fn test_range_from_probabilities() {
        let range = MatchRange::from_probabilities([0.7, 0.2, 0.95, 0.4]).unwrap();
        assert_eq!(range, MatchRange { min: 0.2, max: 0.95 });
        assert!(MatchRange::from_probabilities(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn test_report_shape() {
        let pfe = Pfe::new(5, "1931_picnic.jpg", Array1::zeros(2), Array1::ones(2))
            .unwrap()
            .with_quality(0.6, 0.75)
            .with_era(EraEstimate::certain(Era::Middle));
        let cluster = Cluster {
            cluster_id: 3,
            faces: vec![pfe],
            match_range: None,
        };
        let report = cluster.to_report();
        assert_eq!(report.cluster_id, 3);
        assert_eq!(report.match_range, "N/A");
        assert_eq!(report.faces[0].filename, "1931_picnic.jpg");
        assert_eq!(report.faces[0].era, Some(Era::Middle));
        assert_eq!(report.faces[0].era_confidence, Some(1.0));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["match_range"], "N/A");
        assert_eq!(json["faces"][0]["era"], "middle");
        assert_eq!(json["faces"][0]["quality"], 0.6);
    }
}
