pub mod batch;
pub mod detection;

pub use batch::DetectionBatch;
pub use detection::{BoundingBox, Detection};
