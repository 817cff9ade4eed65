//! Overlay helpers for inspecting pairing results on the source images
//!
//! Boxes are drawn colour-coded by detection index so that a matched
//! pair can be rendered with the same colour in both views by passing
//! the pair order of the other view.

use crate::rect::Rect;
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect as PixelRect;

const OUTLINE_THICKNESS: i32 = 2;
const TAG_HEIGHT: u32 = 12;
const TAG_WIDTH_PER_CHAR: u32 = 12;
const TAG_OFFSET: i32 = 1;

/// Cycle of colours assigned to detections by index.
#[derive(Debug, Clone)]
pub struct Palette {
    colours: Vec<Rgb<u8>>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colours: vec![
                Rgb([31, 119, 180]),
                Rgb([255, 127, 14]),
                Rgb([44, 160, 44]),
                Rgb([214, 39, 40]),
                Rgb([148, 103, 189]),
                Rgb([140, 86, 75]),
                Rgb([227, 119, 194]),
                Rgb([127, 127, 127]),
                Rgb([188, 189, 34]),
                Rgb([23, 190, 207]),
            ],
        }
    }
}

impl Palette {
    pub fn new(colours: Vec<Rgb<u8>>) -> Self {
        Self { colours }
    }

    /// Colour for a detection index, cycling through the palette.
    pub fn colour(&self, index: usize) -> Rgb<u8> {
        if self.colours.is_empty() {
            return Rgb([255, 255, 255]);
        }
        self.colours[index % self.colours.len()]
    }
}

/// Draw a hollow outline for every box.
///
/// # Arguments
/// * `img` - Image to draw into
/// * `rects` - Boxes in pixel coordinates
/// * `palette` - Colour cycle
/// * `order` - Optional colour index per box; pass the matched indices of
///   the other view to give both boxes of a pair the same colour
pub fn draw_detections(
    img: &mut RgbImage,
    rects: &[Rect<f32>],
    palette: &Palette,
    order: Option<&[usize]>,
) {
    if let Some(order) = order {
        debug_assert!(
            order.len() == rects.len(),
            "order.len() must be equal to rects.len()"
        );
    }
    for (i, rect) in rects.iter().enumerate() {
        let colour = palette.colour(order.map_or(i, |o| o[i]));
        let x = rect.tl_x() as i32;
        let y = rect.tl_y() as i32;
        let w = rect.width() as i32;
        let h = rect.height() as i32;
        for t in 0..OUTLINE_THICKNESS {
            let ring_w = (w - 2 * t).max(1) as u32;
            let ring_h = (h - 2 * t).max(1) as u32;
            draw_hollow_rect_mut(
                img,
                PixelRect::at(x + t, y + t).of_size(ring_w, ring_h),
                colour,
            );
        }
    }
}

/// Draw a filled tag strip above every box, sized to its label text.
///
/// # Arguments
/// * `img` - Image to draw into
/// * `rects` - Boxes in pixel coordinates
/// * `texts` - Label text per box; only its length is used for the strip
/// * `palette` - Colour cycle
/// * `order` - Optional colour index per box, as in [`draw_detections`]
pub fn draw_label_tags(
    img: &mut RgbImage,
    rects: &[Rect<f32>],
    texts: &[&str],
    palette: &Palette,
    order: Option<&[usize]>,
) {
    debug_assert!(
        texts.len() == rects.len(),
        "texts.len() must be equal to rects.len()"
    );
    if let Some(order) = order {
        debug_assert!(
            order.len() == rects.len(),
            "order.len() must be equal to rects.len()"
        );
    }
    for (i, (rect, text)) in rects.iter().zip(texts).enumerate() {
        let colour = palette.colour(order.map_or(i, |o| o[i]));
        let x = rect.tl_x() as i32 - TAG_OFFSET;
        let y = rect.tl_y() as i32 - TAG_HEIGHT as i32 - TAG_OFFSET;
        let w = (text.len() as u32 * TAG_WIDTH_PER_CHAR).max(1);
        draw_filled_rect_mut(
            img,
            PixelRect::at(x, y).of_size(w, TAG_HEIGHT),
            colour,
        );
    }
}

/// Blend instance masks over the image, colour-coded by mask index.
///
/// Overlapping masks keep the brighter channel value. The blend matches
/// `0.75 * image + 0.75 * overlay + 1` per channel, saturating at white,
/// so unmasked regions come out slightly dimmed.
///
/// # Arguments
/// * `img` - Image to blend into
/// * `masks` - One grayscale mask per instance, image-sized, 255 = covered
/// * `palette` - Colour cycle
pub fn overlay_masks(
    img: &mut RgbImage,
    masks: &[GrayImage],
    palette: &Palette,
) {
    let (width, height) = img.dimensions();
    let mut overlay = RgbImage::new(width, height);

    for (k, mask) in masks.iter().enumerate() {
        debug_assert!(
            mask.dimensions() == (width, height),
            "mask dimensions must match the image"
        );
        let colour = palette.colour(k);
        for (x, y, p) in overlay.enumerate_pixels_mut() {
            if x >= mask.width() || y >= mask.height() {
                continue;
            }
            let coverage = mask.get_pixel(x, y)[0] as f32 / 255.0;
            for c in 0..3 {
                let v = (colour[c] as f32 * coverage) as u8;
                if v > p[c] {
                    p[c] = v;
                }
            }
        }
    }

    for (x, y, p) in img.enumerate_pixels_mut() {
        let o = overlay.get_pixel(x, y);
        for c in 0..3 {
            let v = 0.75 * p[c] as f32 + 0.75 * o[c] as f32 + 1.0;
            p[c] = v.min(255.0) as u8;
        }
    }
}
