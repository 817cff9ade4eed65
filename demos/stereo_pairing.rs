use image::{Rgb, RgbImage};
use serde::Deserialize;
use std::{
    env,
    error::Error,
    fs,
    path::{Path, PathBuf},
};

use stereopair_rs::draw::{draw_detections, draw_label_tags, Palette};
use stereopair_rs::matcher::{associate, pair_disparities, CostParams};
use stereopair_rs::{DetectionSet, StereoError, MAX_DETECTIONS};

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

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        print_usage();
        return Ok(());
    }

    let stereo_json = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/stereo_detections.json"));
    let output_dir = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/annotated"));

    let stereo = load_stereo_json(&stereo_json)?;
    let left = to_set(&stereo.left)?;
    let mut right = to_set(&stereo.right)?;
    right.cap(MAX_DETECTIONS);

    let result = associate(&left, &right, &CostParams::default())?;
    let reference = stereo.image_width as f32 / 2.0;
    let disparities =
        pair_disparities(&left, &right, &result.pairs, reference)?;

    println!(
        "{}: {} left, {} right, {} pairs",
        stereo.name,
        left.len(),
        right.len(),
        result.pairs.len()
    );
    for (&(i, j), disparity) in result.pairs.iter().zip(&disparities) {
        let class = left.labels().map_or("object", |l| class_name(l[i]));
        println!(
            "  left {} <-> right {}  class {}  cost {:.1}  disparity {:.1} px",
            i,
            j,
            class,
            result.cost[(i, j)],
            disparity
        );
    }
    for i in 0..left.len() {
        if !result.pairs.iter().any(|&(l, _)| l == i) {
            println!("  left {} unmatched", i);
        }
    }
    for j in 0..right.len() {
        if !result.pairs.iter().any(|&(_, r)| r == j) {
            println!("  right {} unmatched", j);
        }
    }

    fs::create_dir_all(&output_dir)?;
    render_views(&stereo, &left, &right, &result.pairs, &output_dir)?;
    println!("Saved annotated views to {}", output_dir.display());

    Ok(())
}

fn print_usage() {
    println!(
        "Usage: cargo run --example stereo_pairing [stereo_json] [output_dir]\n\
Defaults:\n\
  stereo_json: data/stereo_detections.json\n\
  output_dir: data/annotated"
    );
}

fn load_stereo_json(path: &Path) -> Result<StereoJson, Box<dyn Error>> {
    let data = fs::read_to_string(path)?;
    let stereo: StereoJson = serde_json::from_str(&data)?;
    Ok(stereo)
}

fn to_set(view: &ViewJson) -> Result<DetectionSet<f32>, StereoError> {
    DetectionSet::from_parts(
        &view.boxes,
        Some(&view.labels),
        Some(&view.scores),
    )
}

fn class_name(label: usize) -> &'static str {
    match label {
        1 => "person",
        18 => "dog",
        24 => "zebra",
        _ => "object",
    }
}

fn class_texts(set: &DetectionSet<f32>) -> Vec<&'static str> {
    match set.labels() {
        Some(labels) => labels.iter().map(|&l| class_name(l)).collect(),
        None => vec!["object"; set.len()],
    }
}

fn render_views(
    stereo: &StereoJson,
    left: &DetectionSet<f32>,
    right: &DetectionSet<f32>,
    pairs: &[(usize, usize)],
    output_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let palette = Palette::default();
    let canvas =
        RgbImage::from_pixel(stereo.image_width, stereo.image_height, Rgb([20, 20, 20]));

    // Right-view boxes take the colour of their matched left box.
    let mut right_order: Vec<usize> = (0..right.len()).collect();
    for &(i, j) in pairs {
        right_order[j] = i;
    }

    let mut left_img = canvas.clone();
    draw_detections(&mut left_img, left.rects(), &palette, None);
    draw_label_tags(
        &mut left_img,
        left.rects(),
        &class_texts(left),
        &palette,
        None,
    );
    left_img.save(output_dir.join("left.png"))?;

    let mut right_img = canvas;
    draw_detections(&mut right_img, right.rects(), &palette, Some(&right_order));
    draw_label_tags(
        &mut right_img,
        right.rects(),
        &class_texts(right),
        &palette,
        Some(&right_order),
    );
    right_img.save(output_dir.join("right.png"))?;

    Ok(())
}
