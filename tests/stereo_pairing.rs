use nearly_eq::assert_nearly_eq;
use serde::Deserialize;
use stereopair_rs::matcher::{associate, pair_disparities, CostParams};
use stereopair_rs::DetectionSet;

const STEREO_JSON_PATH: &str = "data/stereo_detections.json";

/*----------------------------------------------------------------------------
Json schema for stereo detections
----------------------------------------------------------------------------*/

#[derive(Debug, Deserialize)]
struct StereoJson {
    name: String,
    image_width: u32,
    image_height: u32,
    left: ViewJson,
    right: ViewJson,
}

#[derive(Debug, Deserialize)]
struct ViewJson {
    boxes: Vec<[f32; 4]>,
    labels: Vec<usize>,
    scores: Vec<f32>,
}

impl ViewJson {
    fn to_set(&self) -> DetectionSet<f32> {
        DetectionSet::from_parts(
            &self.boxes,
            Some(&self.labels),
            Some(&self.scores),
        )
        .unwrap()
    }
}

/*----------------------------------------------------------------------------
Read json
----------------------------------------------------------------------------*/
fn read_stereo_json(path: &str) -> StereoJson {
    let file = std::fs::File::open(path).unwrap();
    serde_json::from_reader(file).unwrap()
}

#[test]
fn test_stereo_pairing_with_zoo_frame() {
    let stereo = read_stereo_json(STEREO_JSON_PATH);
    assert_eq!(stereo.name, "zoo_stereo_pair");
    assert_eq!(stereo.image_height, 480);

    let left = stereo.left.to_set();
    let mut right = stereo.right.to_set();
    assert_eq!(left.len(), 4);
    assert_eq!(right.len(), 5);

    // The right view carries a low-confidence false positive; capping
    // drops it and reorders the survivors score-descending.
    right.cap(4);
    assert_eq!(right.len(), 4);
    assert_eq!(right.labels(), Some(&[1, 1, 18, 24][..]));
    assert_nearly_eq!(right.scores().unwrap()[0], 0.99, 1e-6);

    let result = associate(&left, &right, &CostParams::default()).unwrap();

    assert_eq!(result.pairs, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);

    #[allow(non_snake_case)]
    let EPS = 1.0e-3;
    assert_nearly_eq!(result.cost[(0, 0)], 45.0, EPS);
    assert_nearly_eq!(result.cost[(1, 1)], 25.7, EPS);
    assert_nearly_eq!(result.cost[(2, 2)], 20.0, EPS);
    assert_nearly_eq!(result.cost[(3, 3)], 60.0, EPS);
    assert_nearly_eq!(result.cost[(0, 1)], 1509.7, EPS);
    assert_nearly_eq!(result.cost[(1, 0)], 229.0, EPS);

    // Cross-class cells carry the label penalty.
    assert!(result.cost[(0, 2)] > 50_500.0);
    assert!(result.cost[(3, 0)] > 50_500.0);

    let reference = stereo.image_width as f32 / 2.0;
    let disparities =
        pair_disparities(&left, &right, &result.pairs, reference).unwrap();

    assert_eq!(disparities.len(), 4);
    assert_nearly_eq!(disparities[0], 40.0, EPS);
    assert_nearly_eq!(disparities[1], 25.0, EPS);
    assert_nearly_eq!(disparities[2], 15.0, EPS);
    assert_nearly_eq!(disparities[3], 60.0, EPS);
}
