pub mod assoc;
pub mod disparity;

pub use crate::rect::Rect;
pub use assoc::{associate, cost_batch, min_cost_pairs, Association, CostParams};
pub use disparity::{dist_to_reference_br, dist_to_reference_tl, pair_disparities};
