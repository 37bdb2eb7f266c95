use serde::{Deserialize, Serialize};

/// Axis-aligned face box in source-image pixels, `[x1, y1, x2, y2]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box area with inverted or degenerate edges clamped to zero.
    pub fn area(&self) -> f64 {
        let width = (self.x2 - self.x1).max(0.0);
        let height = (self.y2 - self.y1).max(0.0);
        width * height
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(b: [f64; 4]) -> Self {
        Self::new(b[0], b[1], b[2], b[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One face as delivered by the feature extractor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    pub embedding: Vec<f64>,
    pub det_score: f64,
    pub bbox: BoundingBox,
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case([0.0, 0.0, 100.0, 100.0], 10_000.0)]
    #[case([10.0, 20.0, 40.0, 30.0], 300.0)]
    #[case([50.0, 50.0, 50.0, 80.0], 0.0)]
    #[case([100.0, 100.0, 0.0, 0.0], 0.0)]
    #[case([0.0, 100.0, 100.0, 0.0], 0.0)]
    fn test_area(#[case] coords: [f64; 4], #[case] expected: f64) {
        assert_relative_eq!(BoundingBox::from(coords).area(), expected);
    }

    #[test]
    fn test_bbox_deserializes_from_array() {
        let bbox: BoundingBox = serde_json::from_str("[1.0, 2.0, 3.0, 4.0]").unwrap();
        assert_eq!(bbox, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_detection_deserializes() {
        let json = r#"{
            "embedding": [0.1, 0.2],
            "det_score": 0.9,
            "bbox": [0, 0, 120, 140],
            "filename": "1912_wedding.jpg"
        }"#;
        let det: FaceDetection = serde_json::from_str(json).unwrap();
        assert_eq!(det.embedding, vec![0.1, 0.2]);
        assert_eq!(det.filename, "1912_wedding.jpg");
        assert_relative_eq!(det.bbox.area(), 16_800.0);
    }
}
