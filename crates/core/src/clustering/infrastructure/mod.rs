pub mod euclidean_face_grouper;
pub mod hierarchical;
pub mod math;
