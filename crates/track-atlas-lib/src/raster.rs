//! Drawing and finishing operations on page rasters

use crate::{AtlasError, Raster, Result};
use ab_glyph::FontArc;
use image::{GrayImage, Luma, Rgb, Rgba, imageops};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut, text_size};

const COVERED: Luma<u8> = Luma([255]);

/// Default overlay colour, a translucent light blue
pub const TRACK_COLOR: Rgba<u8> = Rgba([56, 201, 255, 100]);

/// Parse a TrueType/OpenType font for tick labels
pub fn load_font(bytes: Vec<u8>) -> Result<FontArc> {
    FontArc::try_from_vec(bytes).map_err(|err| AtlasError::InvalidFont(err.to_string()))
}

/// Stamp a thick segment onto a coverage mask as a chain of discs
fn stamp_segment(mask: &mut GrayImage, start: (f32, f32), end: (f32, f32), width: f32) {
    if width <= 1.0 {
        draw_line_segment_mut(mask, start, end, COVERED);
        return;
    }

    let radius = (width / 2.0).max(1.0) as i32;
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let length = (dx * dx + dy * dy).sqrt();

    let step = (radius as f32 * 0.5).max(0.5);
    let steps = (length / step).ceil() as i32;
    for i in 0..=steps {
        let t = if steps == 0 { 0.0 } else { i as f32 / steps as f32 };
        let x = start.0 + t * dx;
        let y = start.1 + t * dy;
        draw_filled_circle_mut(mask, (x as i32, y as i32), radius, COVERED);
    }
    draw_filled_circle_mut(mask, (end.0 as i32, end.1 as i32), radius, COVERED);
}

/// Mix `color` over every covered pixel, once, using its alpha channel
fn blend(image: &mut Raster, mask: &GrayImage, color: Rgba<u8>) {
    let alpha = f32::from(color[3]) / 255.0;
    for (pixel, coverage) in image.pixels_mut().zip(mask.pixels()) {
        if coverage[0] == 0 {
            continue;
        }
        for c in 0..3 {
            let mixed = f32::from(pixel[c]) * (1.0 - alpha) + f32::from(color[c]) * alpha;
            pixel[c] = mixed.round() as u8;
        }
    }
}

fn to_f32((x, y): (f64, f64)) -> (f32, f32) {
    (x as f32, y as f32)
}

/// Draw a polyline `width` pixels wide in translucent `color`
///
/// Overlapping parts of the line are blended once, so self-crossings do not darken.
pub fn draw_track(image: &mut Raster, points: &[(f64, f64)], color: Rgba<u8>, width: f32) {
    if points.is_empty() {
        return;
    }
    let mut mask = GrayImage::new(image.width(), image.height());
    if let [single] = points {
        let center = to_f32(*single);
        stamp_segment(&mut mask, center, center, width);
    }
    for pair in points.windows(2) {
        stamp_segment(&mut mask, to_f32(pair[0]), to_f32(pair[1]), width);
    }
    blend(image, &mask, color);
}

/// Draw a disc of `radius` pixels at every tick, labelled with its distance when a
/// font is given
pub fn draw_ticks(
    image: &mut Raster,
    ticks: &[((f64, f64), f64)],
    color: Rgba<u8>,
    radius: u32,
    font: Option<&FontArc>,
) {
    if ticks.is_empty() {
        return;
    }
    let mut mask = GrayImage::new(image.width(), image.height());
    for &((x, y), _) in ticks {
        draw_filled_circle_mut(&mut mask, (x as i32, y as i32), radius as i32, COVERED);
    }
    blend(image, &mask, color);

    let Some(font) = font else {
        return;
    };
    let scale = radius as f32 * 1.2;
    for &((x, y), km) in ticks {
        let label = format!("{km:.0}");
        let (w, h) = text_size(scale, font, &label);
        draw_text_mut(
            image,
            Rgb([0, 0, 0]),
            x as i32 - w as i32 / 2,
            y as i32 - h as i32 / 2,
            scale,
            font,
            &label,
        );
    }
}

/// Window of `size` pixels whose top-left corner is `origin`, clipped to the image
pub fn crop(image: &Raster, origin: (u32, u32), size: (u32, u32)) -> Raster {
    let x = origin.0.min(image.width());
    let y = origin.1.min(image.height());
    let width = size.0.min(image.width() - x);
    let height = size.1.min(image.height() - y);
    imageops::crop_imm(image, x, y, width, height).to_image()
}

/// Copy `item` onto `base` with its top-left corner at `origin`
pub fn paste(base: &mut Raster, item: &Raster, origin: (u32, u32)) {
    imageops::replace(base, item, i64::from(origin.0), i64::from(origin.1));
}

/// Surround `image` with a frame `border` pixels wide
pub fn add_border(image: &Raster, border: u32, color: Rgb<u8>) -> Raster {
    let mut framed = Raster::from_pixel(
        image.width() + 2 * border,
        image.height() + 2 * border,
        color,
    );
    paste(&mut framed, image, (border, border));
    framed
}
