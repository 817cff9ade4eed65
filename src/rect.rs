use nalgebra::Matrix1x4;
use num::Float;
use std::fmt::Debug;

/* ------------------------------------------------------------------------------
 * Type aliases
 * ------------------------------------------------------------------------------ */
pub type Tlbr<T> = Matrix1x4<T>;

/* ------------------------------------------------------------------------------
 * Rect struct
 * ------------------------------------------------------------------------------ */

/// Axis-aligned box in pixel coordinates, stored as
/// (top-left x, top-left y, bottom-right x, bottom-right y).
///
/// This is the layout detection models emit, so it is the native layout
/// here; width/height forms are converted on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Rect<T>
where
    T: Debug + Float,
{
    tlbr: Tlbr<T>,
}

impl<T> Rect<T>
where
    T: Debug + Float + 'static,
{
    /// Swapped corners are normalized, so `br_x() >= tl_x()` and
    /// `br_y() >= tl_y()` hold for every constructed box.
    pub fn new(tl_x: T, tl_y: T, br_x: T, br_y: T) -> Self {
        let (x0, x1) = if br_x < tl_x { (br_x, tl_x) } else { (tl_x, br_x) };
        let (y0, y1) = if br_y < tl_y { (br_y, tl_y) } else { (tl_y, br_y) };
        let tlbr = Tlbr::new(x0, y0, x1, y1);
        Self { tlbr }
    }

    #[inline(always)]
    pub fn tl_x(&self) -> T {
        self.tlbr[(0, 0)]
    }

    #[inline(always)]
    pub fn tl_y(&self) -> T {
        self.tlbr[(0, 1)]
    }

    #[inline(always)]
    pub fn br_x(&self) -> T {
        self.tlbr[(0, 2)]
    }

    #[inline(always)]
    pub fn br_y(&self) -> T {
        self.tlbr[(0, 3)]
    }

    pub fn width(&self) -> T {
        self.tlbr[(0, 2)] - self.tlbr[(0, 0)]
    }

    pub fn height(&self) -> T {
        self.tlbr[(0, 3)] - self.tlbr[(0, 1)]
    }

    /// Center of mass of the box.
    pub fn center(&self) -> (T, T) {
        let two = T::from(2).unwrap();
        (
            (self.tlbr[(0, 0)] + self.tlbr[(0, 2)]) / two,
            (self.tlbr[(0, 1)] + self.tlbr[(0, 3)]) / two,
        )
    }

    pub fn top_left(&self) -> (T, T) {
        (self.tlbr[(0, 0)], self.tlbr[(0, 1)])
    }

    pub fn bottom_right(&self) -> (T, T) {
        (self.tlbr[(0, 2)], self.tlbr[(0, 3)])
    }

    /// Non-negative by construction: corners are normalized in `new`.
    pub fn area(&self) -> T {
        self.width() * self.height()
    }

    /// Create Rect from [x, y, width, height] format
    pub fn from_tlwh(x: T, y: T, width: T, height: T) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Get bounding box as [x, y, width, height] format
    pub fn get_tlwh(&self) -> [T; 4] {
        [
            self.tlbr[(0, 0)],
            self.tlbr[(0, 1)],
            self.width(),
            self.height(),
        ]
    }

    /// Get bounding box as [x1, y1, x2, y2] format
    pub fn get_tlbr(&self) -> [T; 4] {
        [
            self.tlbr[(0, 0)],
            self.tlbr[(0, 1)],
            self.tlbr[(0, 2)],
            self.tlbr[(0, 3)],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearly_eq::assert_nearly_eq;

    #[test]
    fn test_center_and_corners() {
        let rect = Rect::new(0.0f32, 0.0, 10.0, 20.0);
        assert_eq!(rect.center(), (5.0, 10.0));
        assert_eq!(rect.top_left(), (0.0, 0.0));
        assert_eq!(rect.bottom_right(), (10.0, 20.0));
        assert_nearly_eq!(rect.area(), 200.0, 1e-6);
    }

    #[test]
    fn test_swapped_corners_are_normalized() {
        let rect = Rect::new(10.0f32, 20.0, 0.0, 0.0);
        assert_eq!(rect.get_tlbr(), [0.0, 0.0, 10.0, 20.0]);
        assert!(rect.area() >= 0.0);
    }

    #[test]
    fn test_area_invariant_to_corner_labeling() {
        let a = Rect::new(2.0f64, 3.0, 12.0, 9.0);
        let b = Rect::new(12.0f64, 9.0, 2.0, 3.0);
        assert_nearly_eq!(a.area(), b.area(), 1e-12);
        assert_eq!(a, b);
    }

    #[test]
    fn test_tlwh_round_trip() {
        let rect = Rect::from_tlwh(4.0f32, 6.0, 30.0, 40.0);
        assert_eq!(rect.get_tlbr(), [4.0, 6.0, 34.0, 46.0]);
        assert_eq!(rect.get_tlwh(), [4.0, 6.0, 30.0, 40.0]);
    }

    #[test]
    fn test_degenerate_box_has_zero_area() {
        let rect = Rect::new(5.0f32, 5.0, 5.0, 5.0);
        assert_eq!(rect.width(), 0.0);
        assert_eq!(rect.height(), 0.0);
        assert_eq!(rect.area(), 0.0);
    }
}
