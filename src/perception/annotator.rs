/// Render a validation overlay onto a graph screenshot.
///
/// Green disc: detected pill centroid. Red disc: where the expected time sits
/// on the same row. A faint red guide marks the expected column and the
/// detected time is printed next to the green marker.
use std::path::Path;

use crate::errors::{PillCheckError, PillCheckResult};
use crate::timeline::{Position, TimeOfDay};

const DETECTED_COLOUR: [u8; 4] = [0, 200, 0, 255];
const EXPECTED_COLOUR: [u8; 4] = [230, 30, 30, 255];
const GUIDE_COLOUR: [u8; 4] = [230, 30, 30, 90];
const LABEL_COLOUR: [u8; 4] = [255, 255, 255, 255];

pub struct Overlay {
    pub detected: Option<Position>,
    pub expected_x: f64,
    pub detected_time: Option<TimeOfDay>,
}

/// Draw `overlay` on a copy of `src` and return the annotated image.
pub fn annotate(src: &image::RgbImage, overlay: &Overlay) -> image::RgbaImage {
    let mut canvas = image::DynamicImage::ImageRgb8(src.clone()).to_rgba8();
    let (w, h) = canvas.dimensions();

    // Scale markers with the image so they stay visible on large screenshots.
    let radius = ((w.max(h) as f64) / 150.0).clamp(4.0, 16.0) as i32;
    let label_scale: u32 = if w > 1600 { 2 } else { 1 };

    let ex = overlay.expected_x.round() as i32;
    draw_vline(&mut canvas, ex, GUIDE_COLOUR);

    if let Some(pos) = overlay.detected {
        let (dx, dy) = (pos.x.round() as i32, pos.y.round() as i32);
        draw_disc(&mut canvas, ex, dy, radius, EXPECTED_COLOUR);
        draw_disc(&mut canvas, dx, dy, radius, DETECTED_COLOUR);

        if let Some(t) = overlay.detected_time {
            let lx = dx + radius + 2;
            let ly = dy - radius;
            draw_text(&mut canvas, lx.max(0) as u32, ly.max(0) as u32, &t.to_string(), label_scale);
        }
    }

    canvas
}

pub fn save_png(canvas: &image::RgbaImage, path: &Path) -> PillCheckResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    canvas
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| PillCheckError::Image(format!("PNG encode {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "annotated image written");
    Ok(())
}

// ── Drawing primitives ──────────────────────────────────────────────────────

fn draw_disc(canvas: &mut image::RgbaImage, cx: i32, cy: i32, r: i32, col: [u8; 4]) {
    let (iw, ih) = (canvas.width() as i32, canvas.height() as i32);
    for y in (cy - r)..=(cy + r) {
        for x in (cx - r)..=(cx + r) {
            let (ddx, ddy) = (x - cx, y - cy);
            if ddx * ddx + ddy * ddy > r * r {
                continue;
            }
            if x >= 0 && x < iw && y >= 0 && y < ih {
                blend(canvas, x as u32, y as u32, col);
            }
        }
    }
}

fn draw_vline(canvas: &mut image::RgbaImage, x: i32, col: [u8; 4]) {
    let (w, h) = canvas.dimensions();
    if x < 0 || x >= w as i32 {
        return;
    }
    for y in 0..h {
        blend(canvas, x as u32, y, col);
    }
}

/// Digits and ':' only; enough for an `HH:MM` label on a dark plate.
fn draw_text(canvas: &mut image::RgbaImage, x: u32, y: u32, text: &str, scale: u32) {
    let (w, h) = canvas.dimensions();
    let step = 5 * scale + 1;
    let pad = scale;
    let plate_w = text.len() as u32 * step + pad * 2;
    let plate_h = 5 * scale + pad * 2;

    for py in y..(y + plate_h).min(h) {
        for px in x..(x + plate_w).min(w) {
            blend(canvas, px, py, [0, 0, 0, 180]);
        }
    }

    for (i, c) in text.chars().enumerate() {
        let Some(glyph) = glyph(c) else { continue };
        let gx = x + pad + i as u32 * step;
        let gy = y + pad;
        for (row, bits) in glyph.iter().enumerate() {
            for bit in 0..5u32 {
                if (bits >> (4 - bit)) & 1 == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let px = gx + bit * scale + sx;
                        let py = gy + row as u32 * scale + sy;
                        if px < w && py < h {
                            blend(canvas, px, py, LABEL_COLOUR);
                        }
                    }
                }
            }
        }
    }
}

fn glyph(c: char) -> Option<[u8; 5]> {
    Some(match c {
        '0' => [0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00110, 0b01000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00110, 0b00001, 0b11110],
        '4' => [0b00110, 0b01010, 0b10010, 0b11111, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b11110],
        '6' => [0b01110, 0b10000, 0b11110, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b00100],
        '8' => [0b01110, 0b10001, 0b01110, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b01111, 0b00001, 0b01110],
        ':' => [0b00000, 0b00100, 0b00000, 0b00100, 0b00000],
        _ => return None,
    })
}

fn blend(canvas: &mut image::RgbaImage, x: u32, y: u32, col: [u8; 4]) {
    let p = canvas.get_pixel_mut(x, y);
    let a = col[3] as f32 / 255.0;
    for c in 0..3 {
        p[c] = (p[c] as f32 * (1.0 - a) + col[c] as f32 * a).round() as u8;
    }
    p[3] = 255;
}
