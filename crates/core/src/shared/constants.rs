/// Dimensionality of the face embeddings produced by the feature extractor.
pub const EMBEDDING_DIM: usize = 512;

pub const DEFAULT_MIN_SIGMA_SQ: f64 = 0.01;
pub const DEFAULT_MAX_SIGMA_SQ: f64 = 1.0;

/// Bounding-box area (px²) at which a face counts as full resolution.
pub const REFERENCE_FACE_AREA: f64 = 10_000.0;

/// How far below the dataset's reference MLS a pair may fall and still cluster.
///
/// Calibrated against one ground-truth evaluation set; recalibrate when the
/// embedding model changes.
pub const DEFAULT_MLS_DROP_THRESHOLD: f64 = 150.0;

/// Multiplier applied to the raw era penalty matrix during clustering.
///
/// At 18.0 two confident estimates two bins apart cost ~180, above the
/// default drop threshold, while adjacent bins cost ~36.
pub const DEFAULT_TEMPORAL_SCALE: f64 = 18.0;

/// Sigmoid temperature mapping MLS to match probability (MLS -500 ≈ 1%).
pub const DEFAULT_PROBABILITY_SCALE: f64 = 100.0;

pub const CONFIG_DIR_NAME: &str = "facelineage";
pub const CONFIG_FILE_NAME: &str = "config.json";
