pub mod detection;
pub mod draw;
pub mod error;
pub mod matcher;
pub mod rect;

mod lapjv;

pub use detection::{DetectionSet, MAX_DETECTIONS};
pub use error::StereoError;
pub use matcher::{associate, min_cost_pairs, Association, CostParams};
pub use rect::Rect;
