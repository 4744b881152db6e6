use crate::scene::{canvas_to_data, data_to_canvas, CurvePath, SCENE_HEIGHT, SCENE_WIDTH};
use crate::timeline::{Camera, FrameState};
use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use anyhow::{Context, Result};
use image::{imageops, ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut, draw_text_mut, text_size};
use imageproc::point::Point;
use log::warn;
use palette::{LinSrgb, Mix, Srgb};
use std::str::FromStr;

// Named colors (RGBA format); anything else is parsed as hex
const COLOR_MAP: &[(&str, [u8; 4])] = &[
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("amber", [0xe6, 0xa7, 0x00, 255]),
];

// Stroke widths and marker sizes in scene units
const AXIS_WIDTH: f64 = 2.0;
const ARROW_SIZE: f64 = 12.0;
const CURVE_WIDTH: f64 = 3.0;
const TRACKER_WIDTH: f64 = 2.0;
const TRACKER_OPACITY: f32 = 0.5;
const FOOT_DIAMETER: f64 = 15.0;
const POINT_DIAMETER: f64 = 20.0;

const LABEL_FONT_SIZE: f64 = 20.0;
const TITLE_FONT_SIZE: f64 = 24.0;

const X_TICKS: [f64; 6] = [0.0, 2.0, 4.0, 6.0, 8.0, 10.0];
const Y_TICKS: [f64; 5] = [0.0, 0.5, 1.0, 1.5, 2.0];

static FONT_DATA: &[u8] = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/DejaVuSans.ttf"));

/// Bundled DejaVu Sans used for every label.
pub fn load_font() -> Result<FontRef<'static>> {
    FontRef::try_from_slice(FONT_DATA).context("Failed to load the bundled label font")
}

/// Parses a color name or a `#rrggbb` / `#rgb` hex string.
pub fn parse_color(color: &str) -> Result<Rgba<u8>> {
    if let Some(&(_, rgba)) = COLOR_MAP.iter().find(|(name, _)| name.eq_ignore_ascii_case(color)) {
        return Ok(Rgba(rgba));
    }
    let rgb = Srgb::<u8>::from_str(color.trim())
        .map_err(|e| anyhow::anyhow!("Color '{}' is neither a known name nor hex: {}", color, e))?;
    Ok(Rgba([rgb.red, rgb.green, rgb.blue, 255]))
}

/// Composites `fg` at `alpha` over an opaque `bg`.
pub fn blend(fg: Rgba<u8>, bg: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let to_linear = |c: Rgba<u8>| -> LinSrgb { Srgb::new(c[0], c[1], c[2]).into_format::<f32>().into_linear() };
    let mixed = to_linear(bg).mix(to_linear(fg), alpha.clamp(0.0, 1.0));
    let out: Srgb<u8> = Srgb::<f32>::from_linear(mixed).into_format();
    Rgba([out.red, out.green, out.blue, 255])
}

#[derive(Debug, Clone, Copy)]
pub struct Colors {
    pub background: Rgba<u8>,
    pub axis: Rgba<u8>,
    pub curve: Rgba<u8>,
    /// Curve color at tracker opacity over the background.
    pub tracker: Rgba<u8>,
}

impl Colors {
    pub fn new(background: Rgba<u8>, axis: Rgba<u8>, curve: Rgba<u8>) -> Self {
        Colors { background, axis, curve, tracker: blend(curve, background, TRACKER_OPACITY) }
    }
}

/// Draws frames of the response animation at a fixed output size.
pub struct Renderer {
    width: u32,
    height: u32,
    /// Output pixels per scene unit.
    pixels_per_unit: f64,
    colors: Colors,
    curve: CurvePath,
    font: FontRef<'static>,
}

impl Renderer {
    pub fn new(width: u32, height: u32, colors: Colors, curve: CurvePath) -> Result<Self> {
        let pixels_per_unit = (width as f64 / SCENE_WIDTH).min(height as f64 / SCENE_HEIGHT);
        let font = load_font()?;
        Ok(Renderer { width, height, pixels_per_unit, colors, curve, font })
    }

    /// Scene canvas coordinates to output pixel coordinates.
    fn to_pixel(&self, camera: &Camera, p: (f64, f64)) -> (f64, f64) {
        let sx = SCENE_WIDTH / 2.0 + camera.x + camera.scale * p.0;
        let sy = SCENE_HEIGHT / 2.0 + camera.y + camera.scale * p.1;
        // Center the scene if the output aspect differs
        let off_x = (self.width as f64 - SCENE_WIDTH * self.pixels_per_unit) / 2.0;
        let off_y = (self.height as f64 - SCENE_HEIGHT * self.pixels_per_unit) / 2.0;
        (off_x + sx * self.pixels_per_unit, off_y + sy * self.pixels_per_unit)
    }

    fn size_px(&self, camera: &Camera, size: f64) -> f64 {
        size * camera.scale * self.pixels_per_unit
    }

    pub fn draw_frame(&self, state: &FrameState) -> RgbaImage {
        let mut image = ImageBuffer::from_pixel(self.width, self.height, self.colors.background);
        let cam = &state.camera;
        let axis = self.colors.axis;
        let axis_w = self.size_px(cam, AXIS_WIDTH);
        let px = |x: f64, y: f64| self.to_pixel(cam, data_to_canvas(x, y));

        // Axes with arrowheads
        let arrow = self.size_px(cam, ARROW_SIZE);
        let x_axis = (px(0.0, 0.0), px(10.2, 0.0));
        let y_axis = (px(0.0, 0.0), px(0.0, 2.1));
        for (from, to) in [x_axis, y_axis] {
            draw_arrow(&mut image, from, to, axis_w, arrow, axis);
        }

        // Ticks and their labels
        let label_px = self.size_px(cam, LABEL_FONT_SIZE);
        for x in X_TICKS {
            draw_thick_line(&mut image, px(x, 0.0), px(x, -0.05), axis_w, axis);
            draw_label(&mut image, &self.font, &format!("{}", x), px(x, -0.15), label_px, axis, false);
        }
        for y in Y_TICKS {
            draw_thick_line(&mut image, px(0.0, y), px(-0.2, y), axis_w, axis);
            draw_label(&mut image, &self.font, &format!("{:.1}", y), px(-0.5, y), label_px, axis, false);
        }

        // Axis titles
        let title_px = self.size_px(cam, TITLE_FONT_SIZE);
        draw_label(&mut image, &self.font, "Time (s)", px(5.0, -0.3), title_px, axis, false);
        draw_label(&mut image, &self.font, "Response", px(-1.5, 1.0), title_px, axis, true);

        // Response curve up to the current progress
        let visible: Vec<(f64, f64)> = self
            .curve
            .prefix(state.progress)
            .into_iter()
            .map(|p| self.to_pixel(cam, p))
            .collect();
        let curve_w = self.size_px(cam, CURVE_WIDTH);
        draw_polyline(&mut image, &visible, curve_w, self.colors.curve);

        // Trackers from the pen position to both axes
        let pen = self.curve.point_at(state.progress);
        let (cur_x, cur_y) = canvas_to_data(pen.0, pen.1);
        let pen_px = self.to_pixel(cam, pen);
        let tracker_w = self.size_px(cam, TRACKER_WIDTH);
        let x_foot = px(cur_x, 0.0);
        let y_foot = px(0.0, cur_y);

        draw_thick_line(&mut image, x_foot, pen_px, tracker_w, self.colors.tracker);
        draw_dot(&mut image, x_foot, self.size_px(cam, FOOT_DIAMETER), self.colors.curve);
        draw_thick_line(&mut image, y_foot, pen_px, tracker_w, self.colors.tracker);
        draw_dot(&mut image, y_foot, self.size_px(cam, FOOT_DIAMETER), self.colors.curve);
        draw_dot(&mut image, pen_px, self.size_px(cam, POINT_DIAMETER), self.colors.curve);

        // Live readouts next to the tracker feet
        let curve = self.colors.curve;
        draw_label(&mut image, &self.font, &format!("{:.2}", cur_y), px(-0.8, cur_y), label_px, curve, false);
        draw_label(&mut image, &self.font, &format!("{:.2}", cur_x), px(cur_x, -0.2), label_px, curve, false);

        image
    }
}

fn to_point(p: (f64, f64)) -> Point<i32> {
    Point::new(p.0.round() as i32, p.1.round() as i32)
}

/// Filled polygon, skipping shapes that collapse after rounding to pixels.
fn fill_polygon(image: &mut RgbaImage, corners: &[(f64, f64)], color: Rgba<u8>) -> bool {
    let mut poly: Vec<Point<i32>> = corners.iter().map(|&c| to_point(c)).collect();
    poly.dedup();
    if poly.len() < 3 || poly.first() == poly.last() {
        return false;
    }
    draw_polygon_mut(image, &poly, color);
    true
}

pub fn draw_dot(image: &mut RgbaImage, center: (f64, f64), diameter: f64, color: Rgba<u8>) {
    let radius = (diameter / 2.0).round().max(0.0) as i32;
    let c = to_point(center);
    draw_filled_circle_mut(image, (c.x, c.y), radius, color);
}

/// Line segment with a given stroke width in pixels.
pub fn draw_thick_line(image: &mut RgbaImage, a: (f64, f64), b: (f64, f64), width: f64, color: Rgba<u8>) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = dx.hypot(dy);
    let half = (width / 2.0).max(0.5);
    if len < 1e-9 {
        draw_dot(image, a, width, color);
        return;
    }
    let (nx, ny) = (-dy / len * half, dx / len * half);
    let quad = [
        (a.0 + nx, a.1 + ny),
        (b.0 + nx, b.1 + ny),
        (b.0 - nx, b.1 - ny),
        (a.0 - nx, a.1 - ny),
    ];
    if !fill_polygon(image, &quad, color) {
        draw_dot(image, a, width, color);
    }
}

/// Polyline with round caps.
pub fn draw_polyline(image: &mut RgbaImage, points: &[(f64, f64)], width: f64, color: Rgba<u8>) {
    for w in points.windows(2) {
        draw_thick_line(image, w[0], w[1], width, color);
    }
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        draw_dot(image, first, width, color);
        draw_dot(image, last, width, color);
    }
}

/// Text centered on `center` at `size` pixels. Vertical labels read bottom to top.
pub fn draw_label(
    image: &mut RgbaImage,
    font: &FontRef,
    text: &str,
    center: (f64, f64),
    size: f64,
    color: Rgba<u8>,
    vertical: bool,
) {
    if size < 1.0 || text.is_empty() {
        return;
    }
    let scale = PxScale::from(size as f32);
    let scaled = font.as_scaled(scale);
    let line_height = (scaled.ascent() - scaled.descent()).ceil().max(1.0) as u32;
    let (text_width, _) = text_size(scale, font, text);

    if !vertical {
        let x = (center.0 - text_width as f64 / 2.0).round() as i32;
        let y = (center.1 - line_height as f64 / 2.0).round() as i32;
        draw_text_mut(image, color, x, y, scale, font, text);
        return;
    }

    // Coverage goes into the alpha channel of an upright patch, which is then
    // turned counterclockwise and composited
    let transparent = Rgba([color[0], color[1], color[2], 0]);
    let mut patch = RgbaImage::from_pixel(text_width.max(1) + 1, line_height, transparent);
    draw_text_mut(&mut patch, color, 0, 0, scale, font, text);
    let turned = imageops::rotate270(&patch);
    let x = (center.0 - turned.width() as f64 / 2.0).round() as i64;
    let y = (center.1 - turned.height() as f64 / 2.0).round() as i64;
    imageops::overlay(image, &turned, x, y);
}

/// Line from `from` to `to` ending in a filled triangular arrowhead.
pub fn draw_arrow(image: &mut RgbaImage, from: (f64, f64), to: (f64, f64), width: f64, size: f64, color: Rgba<u8>) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len = dx.hypot(dy);
    if len <= size {
        warn!("Arrow shorter than its head ({:.1} px), drawing a plain line.", len);
        draw_thick_line(image, from, to, width, color);
        return;
    }
    let (ux, uy) = (dx / len, dy / len);
    let base = (to.0 - ux * size, to.1 - uy * size);
    draw_thick_line(image, from, base, width, color);

    let half = size / 2.0;
    let head = [
        to,
        (base.0 - uy * half, base.1 + ux * half),
        (base.0 + uy * half, base.1 - ux * half),
    ];
    fill_polygon(image, &head, color);
}
