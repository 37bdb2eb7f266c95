//! Uncertainty-aware face similarity and era-constrained identity clustering
//! for historical photo collections.

pub mod shared {
    pub mod config;
    pub mod constants;
    pub mod face_detection;
}

pub mod embedding {
    pub mod domain {
        pub mod mls;
        pub mod pfe;
    }
}

pub mod temporal {
    pub mod domain {
        pub mod era;
        pub mod era_classifier;
        pub mod temporal_prior;
    }
}

pub mod clustering {
    pub mod domain {
        pub mod cluster;
        pub mod face_grouper;
        pub mod thresholds;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod cluster_faces_use_case;
    pub mod pipeline_logger;
}
