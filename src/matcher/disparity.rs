//! Disparity readout for matched detection pairs
//!
//! The horizontal offset between the two boxes of a matched pair is the
//! stereo disparity of the object. It is read at a single box corner:
//! the corner nearer the reference column of the image, where the
//! differing visible extent of the object between the two views moves
//! the box edge the least.

use crate::detection::DetectionSet;
use crate::error::StereoError;
use crate::rect::Rect;
use nalgebra::DMatrix;

/// Compute signed horizontal top-left corner distances between all pairs
/// of boxes.
///
/// # Arguments
/// * `left` - Boxes of the left view
/// * `right` - Boxes of the right view
///
/// # Returns
/// A matrix of shape (num_left, num_right) with entries `tl_x_left - tl_x_right`
pub fn horizontal_tl_dist_batch(
    left: &[Rect<f32>],
    right: &[Rect<f32>],
) -> DMatrix<f32> {
    // L: num_left, R: num_right
    let num_left = left.len();
    let num_right = right.len();

    if num_left == 0 || num_right == 0 {
        return DMatrix::zeros(num_left, num_right);
    }

    // dtl: [L, R]
    let mut dtl = DMatrix::zeros(num_left, num_right);
    for (i, l) in left.iter().enumerate() {
        for (j, r) in right.iter().enumerate() {
            dtl[(i, j)] = l.tl_x() - r.tl_x();
        }
    }
    dtl
}

/// Compute signed horizontal bottom-right corner distances between all
/// pairs of boxes.
///
/// # Arguments
/// * `left` - Boxes of the left view
/// * `right` - Boxes of the right view
///
/// # Returns
/// A matrix of shape (num_left, num_right) with entries `br_x_left - br_x_right`
pub fn horizontal_br_dist_batch(
    left: &[Rect<f32>],
    right: &[Rect<f32>],
) -> DMatrix<f32> {
    // L: num_left, R: num_right
    let num_left = left.len();
    let num_right = right.len();

    if num_left == 0 || num_right == 0 {
        return DMatrix::zeros(num_left, num_right);
    }

    // dbr: [L, R]
    let mut dbr = DMatrix::zeros(num_left, num_right);
    for (i, l) in left.iter().enumerate() {
        for (j, r) in right.iter().enumerate() {
            dbr[(i, j)] = l.br_x() - r.br_x();
        }
    }
    dbr
}

/// Horizontal distance of each top-left corner to a reference column.
pub fn dist_to_reference_tl(rects: &[Rect<f32>], reference: f32) -> Vec<f32> {
    rects.iter().map(|r| (r.tl_x() - reference).abs()).collect()
}

/// Horizontal distance of each bottom-right corner to a reference column.
pub fn dist_to_reference_br(rects: &[Rect<f32>], reference: f32) -> Vec<f32> {
    rects.iter().map(|r| (r.br_x() - reference).abs()).collect()
}

/// Read the disparity of each matched pair.
///
/// For each pair the disparity is the horizontal corner distance between
/// the two boxes, taken at the corner of the left-view box that lies
/// nearer to `reference` (usually the center column of the image).
///
/// # Arguments
/// * `left` - Detections of the left view
/// * `right` - Detections of the right view
/// * `pairs` - Matched pairs as (left_index, right_index)
/// * `reference` - Reference column for the corner selection
///
/// # Returns
/// One disparity per pair, in pair order, or
/// [`StereoError::InvalidInput`] when a pair indexes outside the sets
pub fn pair_disparities(
    left: &DetectionSet<f32>,
    right: &DetectionSet<f32>,
    pairs: &[(usize, usize)],
    reference: f32,
) -> Result<Vec<f32>, StereoError> {
    let dtl = horizontal_tl_dist_batch(left.rects(), right.rects());
    let dbr = horizontal_br_dist_batch(left.rects(), right.rects());
    let near_tl = dist_to_reference_tl(left.rects(), reference);
    let near_br = dist_to_reference_br(left.rects(), reference);

    let mut disparities = Vec::with_capacity(pairs.len());
    for &(i, j) in pairs {
        if i >= left.len() || j >= right.len() {
            return Err(StereoError::InvalidInput(format!(
                "pair ({}, {}) indexes outside the detection sets ({} x {})",
                i,
                j,
                left.len(),
                right.len()
            )));
        }
        let d = if near_tl[i] < near_br[i] {
            dtl[(i, j)]
        } else {
            dbr[(i, j)]
        };
        disparities.push(d);
    }
    Ok(disparities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearly_eq::assert_nearly_eq;

    fn set(boxes: &[[f32; 4]]) -> DetectionSet<f32> {
        DetectionSet::from_parts(boxes, None, None).unwrap()
    }

    // ==========================================================================
    // corner distance tests
    // ==========================================================================

    #[test]
    fn test_horizontal_corner_dist_batch() {
        let left = set(&[[300.0, 0.0, 400.0, 10.0]]);
        let right = set(&[[280.0, 0.0, 385.0, 10.0]]);

        let dtl = horizontal_tl_dist_batch(left.rects(), right.rects());
        let dbr = horizontal_br_dist_batch(left.rects(), right.rects());

        assert_nearly_eq!(dtl[(0, 0)], 20.0, 1e-5);
        assert_nearly_eq!(dbr[(0, 0)], 15.0, 1e-5);
    }

    #[test]
    fn test_dist_to_reference() {
        let rects = set(&[[300.0, 0.0, 400.0, 10.0], [100.0, 0.0, 250.0, 10.0]]);

        let tl = dist_to_reference_tl(rects.rects(), 320.0);
        let br = dist_to_reference_br(rects.rects(), 320.0);

        assert_nearly_eq!(tl[0], 20.0, 1e-5);
        assert_nearly_eq!(br[0], 80.0, 1e-5);
        assert_nearly_eq!(tl[1], 220.0, 1e-5);
        assert_nearly_eq!(br[1], 70.0, 1e-5);
    }

    // ==========================================================================
    // pair_disparities tests
    // ==========================================================================

    #[test]
    fn test_pair_disparities_selects_inner_corner() {
        // Box 0 has its top-left corner nearer the reference column, box 1
        // its bottom-right corner; each pair reads the matching corner.
        let left = set(&[
            [300.0, 0.0, 400.0, 10.0],
            [100.0, 0.0, 250.0, 10.0],
        ]);
        let right = set(&[
            [280.0, 0.0, 385.0, 10.0],
            [90.0, 0.0, 235.0, 10.0],
        ]);

        let d = pair_disparities(&left, &right, &[(0, 0), (1, 1)], 320.0)
            .unwrap();

        assert_eq!(d.len(), 2);
        assert_nearly_eq!(d[0], 20.0, 1e-5);
        assert_nearly_eq!(d[1], 15.0, 1e-5);
    }

    #[test]
    fn test_pair_disparities_tie_reads_bottom_right() {
        // Both corners 20 away from the reference column.
        let left = set(&[[300.0, 0.0, 340.0, 10.0]]);
        let right = set(&[[290.0, 0.0, 325.0, 10.0]]);

        let d = pair_disparities(&left, &right, &[(0, 0)], 320.0).unwrap();

        assert_nearly_eq!(d[0], 15.0, 1e-5);
    }

    #[test]
    fn test_pair_disparities_empty_pairs() {
        let left = set(&[[0.0, 0.0, 10.0, 10.0]]);
        let right = set(&[[0.0, 0.0, 10.0, 10.0]]);

        let d = pair_disparities(&left, &right, &[], 320.0).unwrap();

        assert!(d.is_empty());
    }

    #[test]
    fn test_pair_disparities_rejects_out_of_range_pair() {
        let left = set(&[[0.0, 0.0, 10.0, 10.0]]);
        let right = set(&[[0.0, 0.0, 10.0, 10.0]]);

        let res = pair_disparities(&left, &right, &[(0, 1)], 320.0);

        assert!(matches!(res, Err(StereoError::InvalidInput(_))));
    }
}
