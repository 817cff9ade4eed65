//! Association functions for stereo detection pairing
//!
//! This module computes the pairing cost between the detections of the
//! left and right views and solves the resulting assignment problem
//! with the LAPJV algorithm.

use crate::detection::DetectionSet;
use crate::error::StereoError;
use crate::lapjv::lapjv;
use crate::rect::Rect;
use nalgebra::DMatrix;

/// Cost written into the padding cells when a rectangular cost matrix is
/// squared for LAPJV. Any uniform value larger than every real cell works;
/// the number of padding assignments in a complete matching is fixed, so
/// padding shifts the total by a constant and keeps the real pairs optimal.
const PAD_COST: f64 = 1e6;

/// Weights of the pairing cost terms.
///
/// The defaults reproduce the reference calibration for a parallel
/// stereo rig: rows of the two views are epipolar-aligned, so vertical
/// offsets are weighted heavily, and a matching right-view box may only
/// appear shifted towards the left (positive disparity), so a shift the
/// other way is penalized.
#[derive(Debug, Clone)]
pub struct CostParams {
    /// Weight of the absolute vertical center distance.
    pub vertical_weight: f32,
    /// Penalty factor applied to a negative horizontal center distance.
    pub leftward_penalty: f32,
    /// Divisor normalizing the absolute area difference.
    pub area_scale: f32,
    /// Constant added when the class labels of a pair differ.
    pub class_penalty: f32,
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            vertical_weight: 5.0,
            leftward_penalty: 10.0,
            area_scale: 400.0,
            class_penalty: 50_500.0,
        }
    }
}

/// Compute signed vertical center distances between all pairs of boxes.
///
/// # Arguments
/// * `left` - Boxes of the left view
/// * `right` - Boxes of the right view
///
/// # Returns
/// A matrix of shape (num_left, num_right) with entries `cy_left - cy_right`
pub fn vertical_center_dist_batch(
    left: &[Rect<f32>],
    right: &[Rect<f32>],
) -> DMatrix<f32> {
    // L: num_left, R: num_right
    let num_left = left.len();
    let num_right = right.len();

    if num_left == 0 || num_right == 0 {
        return DMatrix::zeros(num_left, num_right);
    }

    // dy: [L, R]
    let mut dy = DMatrix::zeros(num_left, num_right);
    for (i, l) in left.iter().enumerate() {
        let (_, cy_l) = l.center();
        for (j, r) in right.iter().enumerate() {
            let (_, cy_r) = r.center();
            dy[(i, j)] = cy_l - cy_r;
        }
    }
    dy
}

/// Compute signed horizontal center distances between all pairs of boxes.
///
/// For a true stereo pair this is the disparity estimate at the box
/// center; it is non-negative when the rig geometry holds.
///
/// # Arguments
/// * `left` - Boxes of the left view
/// * `right` - Boxes of the right view
///
/// # Returns
/// A matrix of shape (num_left, num_right) with entries `cx_left - cx_right`
pub fn horizontal_center_dist_batch(
    left: &[Rect<f32>],
    right: &[Rect<f32>],
) -> DMatrix<f32> {
    // L: num_left, R: num_right
    let num_left = left.len();
    let num_right = right.len();

    if num_left == 0 || num_right == 0 {
        return DMatrix::zeros(num_left, num_right);
    }

    // dx: [L, R]
    let mut dx = DMatrix::zeros(num_left, num_right);
    for (i, l) in left.iter().enumerate() {
        let (cx_l, _) = l.center();
        for (j, r) in right.iter().enumerate() {
            let (cx_r, _) = r.center();
            dx[(i, j)] = cx_l - cx_r;
        }
    }
    dx
}

/// Compute signed area differences between all pairs of boxes.
///
/// # Arguments
/// * `left` - Boxes of the left view
/// * `right` - Boxes of the right view
///
/// # Returns
/// A matrix of shape (num_left, num_right) with entries `area_left - area_right`
pub fn area_diff_batch(
    left: &[Rect<f32>],
    right: &[Rect<f32>],
) -> DMatrix<f32> {
    // L: num_left, R: num_right
    let num_left = left.len();
    let num_right = right.len();

    if num_left == 0 || num_right == 0 {
        return DMatrix::zeros(num_left, num_right);
    }

    // da: [L, R]
    let mut da = DMatrix::zeros(num_left, num_right);
    for (i, l) in left.iter().enumerate() {
        let area_l = l.area();
        for (j, r) in right.iter().enumerate() {
            da[(i, j)] = area_l - r.area();
        }
    }
    da
}

// Horizontal term of the pairing cost. A non-negative center distance is
// plausible disparity and costs its own magnitude; a negative one cannot
// come from the same object and is scaled up instead.
fn horizontal_term(dx: f32, leftward_penalty: f32) -> f32 {
    if dx >= 0.0 {
        dx
    } else {
        leftward_penalty * dx.abs()
    }
}

/// Compute the pairing cost matrix between two detection sets.
///
/// The cost of a pair is the weighted sum of the vertical center
/// distance, the piecewise horizontal center distance and the
/// normalized area difference, plus `class_penalty` when both sets are
/// labeled and the labels of the pair differ.
///
/// # Arguments
/// * `left` - Detections of the left view
/// * `right` - Detections of the right view
/// * `params` - Weights of the cost terms
///
/// # Returns
/// A matrix of shape (num_left, num_right) of non-negative costs, or
/// [`StereoError::InvalidInput`] when exactly one of the sets carries
/// class labels.
pub fn cost_batch(
    left: &DetectionSet<f32>,
    right: &DetectionSet<f32>,
    params: &CostParams,
) -> Result<DMatrix<f32>, StereoError> {
    if left.labels().is_some() != right.labels().is_some() {
        return Err(StereoError::InvalidInput(
            "class labels must be present on both detection sets or neither"
                .to_string(),
        ));
    }

    // L: num_left, R: num_right
    let num_left = left.len();
    let num_right = right.len();

    if num_left == 0 || num_right == 0 {
        return Ok(DMatrix::zeros(num_left, num_right));
    }

    let dy = vertical_center_dist_batch(left.rects(), right.rects());
    let dx = horizontal_center_dist_batch(left.rects(), right.rects());
    let da = area_diff_batch(left.rects(), right.rects());

    // cost: [L, R]
    let mut cost = DMatrix::zeros(num_left, num_right);
    for i in 0..num_left {
        for j in 0..num_right {
            cost[(i, j)] = params.vertical_weight * dy[(i, j)].abs()
                + horizontal_term(dx[(i, j)], params.leftward_penalty)
                + da[(i, j)].abs() / params.area_scale;
        }
    }

    if let (Some(left_lbls), Some(right_lbls)) = (left.labels(), right.labels())
    {
        for i in 0..num_left {
            for j in 0..num_right {
                if left_lbls[i] != right_lbls[j] {
                    cost[(i, j)] += params.class_penalty;
                }
            }
        }
    }

    Ok(cost)
}

/// Solve the minimum-cost one-to-one assignment over a cost matrix.
///
/// # Arguments
/// * `cost` - Cost matrix of shape (num_left, num_right)
///
/// # Returns
/// The `min(num_left, num_right)` matched pairs as (left_index,
/// right_index), in ascending left index order. An empty dimension
/// yields an empty vector.
pub fn min_cost_pairs(
    cost: &DMatrix<f32>,
) -> Result<Vec<(usize, usize)>, StereoError> {
    let nrows = cost.nrows();
    let ncols = cost.ncols();

    if nrows == 0 || ncols == 0 {
        return Ok(Vec::new());
    }

    // LAPJV requires a square matrix, so a rectangular one is padded to
    // size max(nrows, ncols) with a uniform large cost; the padded
    // assignments are filtered out afterwards.
    let n = nrows.max(ncols);
    let mut padded = DMatrix::from_element(n, n, PAD_COST);
    for i in 0..nrows {
        for j in 0..ncols {
            padded[(i, j)] = cost[(i, j)] as f64;
        }
    }

    let mut x = vec![-1isize; n];
    let mut y = vec![-1isize; n];
    lapjv(&padded, &mut x, &mut y)?;

    // x[i] = j means row i is assigned to column j
    let mut pairs = Vec::new();
    for (i, &j) in x.iter().enumerate() {
        if i < nrows && j >= 0 && (j as usize) < ncols {
            pairs.push((i, j as usize));
        }
    }
    Ok(pairs)
}

/// Result of pairing the detections of two views.
#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    /// Matched pairs as (left_index, right_index), ascending in left index
    pub pairs: Vec<(usize, usize)>,
    /// The cost matrix the pairs were selected from, shape (num_left, num_right)
    pub cost: DMatrix<f32>,
}

/// Pair the detections of the left and right views of a stereo frame.
///
/// Computes the pairing cost matrix and selects the minimum-cost
/// one-to-one assignment. The surplus detections of the larger view
/// stay unmatched.
///
/// # Arguments
/// * `left` - Detections of the left view
/// * `right` - Detections of the right view
/// * `params` - Weights of the cost terms
///
/// # Returns
/// The matched pairs together with the cost matrix they were selected from
pub fn associate(
    left: &DetectionSet<f32>,
    right: &DetectionSet<f32>,
    params: &CostParams,
) -> Result<Association, StereoError> {
    let cost = cost_batch(left, right, params)?;
    let pairs = min_cost_pairs(&cost)?;
    Ok(Association { pairs, cost })
}
