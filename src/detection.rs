use crate::error::StereoError;
use crate::rect::Rect;
use num::Float;
use std::cmp::Ordering;
use std::fmt::Debug;

/// Default cap on detections considered per view; bounds the size of the
/// assignment cost matrix.
pub const MAX_DETECTIONS: usize = 10;

/*------------------------------------------------------------------------------
DetectionSet struct
------------------------------------------------------------------------------*/

/// Detections of one view of a stereo pair: ordered boxes, optionally
/// paired with index-aligned class labels and confidence scores.
#[derive(Debug, Clone)]
pub struct DetectionSet<T>
where
    T: Debug + Float,
{
    rects: Vec<Rect<T>>,
    labels: Option<Vec<usize>>,
    scores: Option<Vec<f32>>,
}

impl<T> DetectionSet<T>
where
    T: Debug + Float + 'static,
{
    /// Build an unlabeled set from already typed boxes.
    ///
    /// Fails with [`StereoError::InvalidInput`] when any coordinate is
    /// not a finite number, same as [`DetectionSet::from_parts`].
    pub fn new(rects: Vec<Rect<T>>) -> Result<Self, StereoError> {
        for (i, rect) in rects.iter().enumerate() {
            if rect.get_tlbr().iter().any(|v| !v.is_finite()) {
                return Err(StereoError::InvalidInput(format!(
                    "box {} contains a non-finite coordinate: {:?}",
                    i,
                    rect.get_tlbr()
                )));
            }
        }
        Ok(Self {
            rects,
            labels: None,
            scores: None,
        })
    }

    /// Build a set from the parallel arrays a detector emits, one row per
    /// detection in `[tl_x, tl_y, br_x, br_y]` order.
    ///
    /// Fails with [`StereoError::InvalidInput`] when `labels` or `scores`
    /// is present but not index-aligned with `boxes`, or when any
    /// coordinate or score is not a finite number.
    pub fn from_parts(
        boxes: &[[T; 4]],
        labels: Option<&[usize]>,
        scores: Option<&[f32]>,
    ) -> Result<Self, StereoError> {
        if let Some(labels) = labels {
            if labels.len() != boxes.len() {
                return Err(StereoError::InvalidInput(format!(
                    "labels length {} does not match boxes length {}",
                    labels.len(),
                    boxes.len()
                )));
            }
        }
        if let Some(scores) = scores {
            if scores.len() != boxes.len() {
                return Err(StereoError::InvalidInput(format!(
                    "scores length {} does not match boxes length {}",
                    scores.len(),
                    boxes.len()
                )));
            }
            if let Some(score) = scores.iter().find(|s| !s.is_finite()) {
                return Err(StereoError::InvalidInput(format!(
                    "score {} is not a finite number",
                    score
                )));
            }
        }

        let mut rects = Vec::with_capacity(boxes.len());
        for (i, b) in boxes.iter().enumerate() {
            if b.iter().any(|v| !v.is_finite()) {
                return Err(StereoError::InvalidInput(format!(
                    "box {} contains a non-finite coordinate: {:?}",
                    i, b
                )));
            }
            rects.push(Rect::new(b[0], b[1], b[2], b[3]));
        }

        Ok(Self {
            rects,
            labels: labels.map(|l| l.to_vec()),
            scores: scores.map(|s| s.to_vec()),
        })
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn rects(&self) -> &[Rect<T>] {
        &self.rects
    }

    pub fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }

    pub fn scores(&self) -> Option<&[f32]> {
        self.scores.as_deref()
    }

    /// Keep at most `limit` detections.
    ///
    /// When scores are present the set is reordered score-descending
    /// first, so the survivors are the highest-confidence detections;
    /// the sort is stable, so input already in model order is unchanged.
    /// Without scores the collaborator's ordering is trusted and the
    /// tail is dropped.
    pub fn cap(&mut self, limit: usize) {
        if self.rects.len() <= limit {
            return;
        }

        let order = self.scores.as_ref().map(|scores| {
            let mut order: Vec<usize> = (0..scores.len()).collect();
            order.sort_by(|&a, &b| {
                scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal)
            });
            order
        });

        match order {
            Some(mut order) => {
                order.truncate(limit);
                self.rects = order.iter().map(|&i| self.rects[i].clone()).collect();
                let labels = self
                    .labels
                    .as_ref()
                    .map(|labels| order.iter().map(|&i| labels[i]).collect());
                self.labels = labels;
                let scores = self
                    .scores
                    .as_ref()
                    .map(|scores| order.iter().map(|&i| scores[i]).collect());
                self.scores = scores;
            }
            None => {
                self.rects.truncate(limit);
                if let Some(labels) = self.labels.as_mut() {
                    labels.truncate(limit);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxes(n: usize) -> Vec<[f32; 4]> {
        (0..n)
            .map(|i| {
                let x = 20.0 * i as f32;
                [x, 0.0, x + 10.0, 10.0]
            })
            .collect()
    }

    #[test]
    fn test_from_parts_aligned() {
        let set = DetectionSet::from_parts(
            &boxes(3),
            Some(&[1, 1, 18]),
            Some(&[0.9, 0.8, 0.7]),
        )
        .unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.labels(), Some(&[1, 1, 18][..]));
        assert_eq!(set.scores(), Some(&[0.9, 0.8, 0.7][..]));
    }

    #[test]
    fn test_from_parts_rejects_label_mismatch() {
        let res = DetectionSet::from_parts(&boxes(3), Some(&[1, 1]), None);
        assert!(matches!(res, Err(StereoError::InvalidInput(_))));
    }

    #[test]
    fn test_from_parts_rejects_score_mismatch() {
        let res = DetectionSet::from_parts(&boxes(2), None, Some(&[0.5]));
        assert!(matches!(res, Err(StereoError::InvalidInput(_))));
    }

    #[test]
    fn test_from_parts_rejects_non_finite_box() {
        let res = DetectionSet::from_parts(
            &[[0.0f32, 0.0, f32::NAN, 10.0]],
            None,
            None,
        );
        assert!(matches!(res, Err(StereoError::InvalidInput(_))));

        let res = DetectionSet::from_parts(
            &[[0.0f32, 0.0, f32::INFINITY, 10.0]],
            None,
            None,
        );
        assert!(matches!(res, Err(StereoError::InvalidInput(_))));
    }

    #[test]
    fn test_from_parts_rejects_non_finite_score() {
        let res =
            DetectionSet::from_parts(&boxes(1), None, Some(&[f32::NAN]));
        assert!(matches!(res, Err(StereoError::InvalidInput(_))));
    }

    #[test]
    fn test_new_from_typed_boxes() {
        let rects = vec![Rect::new(0.0f32, 0.0, 10.0, 10.0)];
        let set = DetectionSet::new(rects).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.labels().is_none());
        assert!(set.scores().is_none());
    }

    #[test]
    fn test_new_rejects_non_finite_rect() {
        let rects = vec![
            Rect::new(0.0f32, 0.0, 10.0, 10.0),
            Rect::new(0.0f32, 0.0, f32::NAN, 10.0),
        ];
        let res = DetectionSet::new(rects);
        assert!(matches!(res, Err(StereoError::InvalidInput(_))));

        let rects = vec![Rect::new(0.0f32, 0.0, f32::INFINITY, 10.0)];
        let res = DetectionSet::new(rects);
        assert!(matches!(res, Err(StereoError::InvalidInput(_))));
    }

    #[test]
    fn test_cap_keeps_highest_scores() {
        // Scores out of order: the false positive in the middle must go.
        let mut set = DetectionSet::from_parts(
            &boxes(4),
            Some(&[1, 1, 18, 24]),
            Some(&[0.9, 0.3, 0.8, 0.7]),
        )
        .unwrap();
        set.cap(3);
        assert_eq!(set.len(), 3);
        assert_eq!(set.scores(), Some(&[0.9, 0.8, 0.7][..]));
        assert_eq!(set.labels(), Some(&[1, 18, 24][..]));
        assert_eq!(set.rects()[1].tl_x(), 40.0);
    }

    #[test]
    fn test_cap_is_stable_for_presorted_input() {
        let mut set = DetectionSet::from_parts(
            &boxes(4),
            None,
            Some(&[0.9, 0.9, 0.9, 0.2]),
        )
        .unwrap();
        set.cap(2);
        assert_eq!(set.rects()[0].tl_x(), 0.0);
        assert_eq!(set.rects()[1].tl_x(), 20.0);
    }

    #[test]
    fn test_cap_without_scores_truncates_in_order() {
        let mut set = DetectionSet::from_parts(&boxes(5), None, None).unwrap();
        set.cap(2);
        assert_eq!(set.len(), 2);
        assert_eq!(set.rects()[1].tl_x(), 20.0);
    }

    #[test]
    fn test_cap_is_noop_below_limit() {
        let mut set = DetectionSet::from_parts(
            &boxes(3),
            None,
            Some(&[0.1, 0.9, 0.5]),
        )
        .unwrap();
        set.cap(MAX_DETECTIONS);
        assert_eq!(set.scores(), Some(&[0.1, 0.9, 0.5][..]));
    }
}
