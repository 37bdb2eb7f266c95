use crate::temporal::domain::era::EraEstimate;

/// Domain interface for estimating when a face photo was taken.
///
/// Implementations own their model lifecycle; the clustering core only
/// consumes the estimates they produce.
pub trait EraClassifier: Send {
    fn classify(
        &self,
        rgb_data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<EraEstimate, Box<dyn std::error::Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::domain::era::{Era, EraProbabilities};

    /// Classifies by mean brightness: faded prints read as older.
    struct BrightnessClassifier;

    impl EraClassifier for BrightnessClassifier {
        fn classify(
            &self,
            rgb_data: &[u8],
            width: u32,
            height: u32,
        ) -> Result<EraEstimate, Box<dyn std::error::Error>> {
            let expected = (width * height * 3) as usize;
            if rgb_data.len() < expected {
                return Err(format!("crop too small: {} < {expected}", rgb_data.len()).into());
            }
            let mean = rgb_data.iter().map(|&v| v as f64).sum::<f64>() / rgb_data.len() as f64;
            let p = if mean > 170.0 {
                [0.8, 0.15, 0.05]
            } else if mean > 85.0 {
                [0.1, 0.8, 0.1]
            } else {
                [0.05, 0.15, 0.8]
            };
            Ok(EraEstimate::from_probabilities(EraProbabilities::from(p)))
        }
    }

    #[test]
    fn test_classifier_is_object_safe() {
        let classifier: Box<dyn EraClassifier> = Box::new(BrightnessClassifier);
        let crop = vec![200u8; 4 * 4 * 3];
        let est = classifier.classify(&crop, 4, 4).unwrap();
        assert_eq!(est.era, Era::Early);
    }

    #[test]
    fn test_classifier_errors_propagate() {
        let classifier = BrightnessClassifier;
        assert!(classifier.classify(&[0u8; 3], 4, 4).is_err());
    }
}
