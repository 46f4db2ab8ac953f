// ── Application icon ──────────────────────────────────────────────────────────
//
// Draws the notepad icon into a 1024×1024 pixmap and serialises it as PNG.
// Every shape is a fixed function of the constants below, so output is
// byte-identical from run to run.
//
// Coordinates are y-down raster pixels, origin top-left.

use std::{
    fs,
    path::{Path, PathBuf},
};

use resvg::tiny_skia::{
    Color, FillRule, Paint, Path as SkPath, PathBuilder, Pixmap, Rect, Stroke, Transform,
};
use tracing::debug;

use crate::error::{InkpadError, IoOp, Result};

/// Name of the file written into the output directory.
pub const OUTPUT_FILE: &str = "icon.png";

/// Edge length of the square canvas.
pub const SIZE: u32 = 1024;

const SIZE_F: f32 = SIZE as f32;

// ── Geometry ──────────────────────────────────────────────────────────────────

const CORNER_RADIUS: f32 = 64.0;
const FOLD_SIZE: f32 = 220.0;
const BORDER_WIDTH: f32 = 2.0;

const RULING_MARGIN: f32 = 80.0;
const RULING_FIRST_Y: f32 = 200.0;
const RULING_COUNT: usize = 10;
const RULING_SPACING: f32 = 68.0;
const RULING_WIDTH: f32 = 8.0;

const HEADER_HEIGHT: f32 = 160.0;

const ACCENT_ORIGIN: f32 = 92.0;
const ACCENT_DIAMETER: f32 = 48.0;

const SHADOW_WIDTH: f32 = 12.0;

/// Cubic Bézier handle length for a quarter circle, as a fraction of radius.
const KAPPA: f32 = 0.552_284_8;

// ── Palette (straight RGBA, 0.0–1.0) ──────────────────────────────────────────

const PAPER: [f32; 4] = [1.0, 0.98, 0.85, 1.0];
const FOLD: [f32; 4] = [1.0, 1.0, 1.0, 0.95];
const BORDER: [f32; 4] = [0.0, 0.0, 0.0, 0.08];
const RULING: [f32; 4] = [0.2, 0.2, 0.2, 0.12];
const HEADER: [f32; 4] = [1.0, 0.95, 0.6, 0.6];
const ACCENT: [f32; 4] = [0.85, 0.15, 0.15, 1.0];
const SHADOW: [f32; 4] = [0.0, 0.0, 0.0, 0.06];

// ── Public API ────────────────────────────────────────────────────────────────

/// Draw the icon.
pub fn render() -> Result<Pixmap> {
    let mut pixmap = Pixmap::new(SIZE, SIZE).ok_or_else(|| geometry("canvas"))?;
    let t = Transform::identity();

    // Background sheet.
    let sheet = rounded_rect(0.0, 0.0, SIZE_F, SIZE_F, CORNER_RADIUS)
        .ok_or_else(|| geometry("sheet"))?;
    pixmap.fill_path(&sheet, &paint(PAPER)?, FillRule::Winding, t, None);

    // Folded corner, top right.
    let fold = {
        let mut pb = PathBuilder::new();
        pb.move_to(SIZE_F - FOLD_SIZE, 0.0);
        pb.line_to(SIZE_F, FOLD_SIZE);
        pb.line_to(SIZE_F, 0.0);
        pb.close();
        pb.finish().ok_or_else(|| geometry("fold"))?
    };
    pixmap.fill_path(&fold, &paint(FOLD)?, FillRule::Winding, t, None);

    // Border around the sheet.
    pixmap.stroke_path(&sheet, &paint(BORDER)?, &stroke(BORDER_WIDTH), t, None);

    // Rulings.
    let ruling_paint = paint(RULING)?;
    let ruling_stroke = stroke(RULING_WIDTH);
    for i in 0..RULING_COUNT {
        let y = RULING_FIRST_Y + i as f32 * RULING_SPACING;
        let line = segment((RULING_MARGIN, y), (SIZE_F - RULING_MARGIN, y))
            .ok_or_else(|| geometry("ruling"))?;
        pixmap.stroke_path(&line, &ruling_paint, &ruling_stroke, t, None);
    }

    // Header band, drawn over the top of the sheet.
    let header =
        Rect::from_xywh(0.0, 0.0, SIZE_F, HEADER_HEIGHT).ok_or_else(|| geometry("header"))?;
    pixmap.fill_rect(header, &paint(HEADER)?, t, None);

    // Accent mark in the header.
    let r = ACCENT_DIAMETER / 2.0;
    let accent = PathBuilder::from_circle(ACCENT_ORIGIN + r, ACCENT_ORIGIN + r, r)
        .ok_or_else(|| geometry("accent"))?;
    pixmap.fill_path(&accent, &paint(ACCENT)?, FillRule::Winding, t, None);

    // Shadow along the fold's edge.
    let shadow = segment((SIZE_F - FOLD_SIZE, 0.0), (SIZE_F, FOLD_SIZE))
        .ok_or_else(|| geometry("shadow"))?;
    pixmap.stroke_path(&shadow, &paint(SHADOW)?, &stroke(SHADOW_WIDTH), t, None);

    debug!(size = SIZE, "icon rendered");
    Ok(pixmap)
}

/// Serialise a rendered icon as PNG.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>> {
    pixmap
        .encode_png()
        .map_err(|e| InkpadError::Encode(e.to_string()))
}

/// Write PNG bytes to `dir/icon.png`, returning the full path.
pub fn write_png(dir: &Path, png: &[u8]) -> Result<PathBuf> {
    let path = dir.join(OUTPUT_FILE);
    fs::write(&path, png).map_err(|e| InkpadError::io(IoOp::Write, &path, e))?;
    Ok(path)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn geometry(shape: &str) -> InkpadError {
    InkpadError::Encode(format!("could not build {shape} geometry"))
}

fn paint([r, g, b, a]: [f32; 4]) -> Result<Paint<'static>> {
    let color = Color::from_rgba(r, g, b, a).ok_or_else(|| geometry("colour"))?;
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    Ok(paint)
}

fn stroke(width: f32) -> Stroke {
    Stroke {
        width,
        ..Stroke::default()
    }
}

fn segment(from: (f32, f32), to: (f32, f32)) -> Option<SkPath> {
    let mut pb = PathBuilder::new();
    pb.move_to(from.0, from.1);
    pb.line_to(to.0, to.1);
    pb.finish()
}

/// Rectangle with four circular corners of radius `r`.
fn rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32) -> Option<SkPath> {
    let r = r.min(w / 2.0).min(h / 2.0);
    let k = r * KAPPA;
    let (right, bottom) = (x + w, y + h);

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.cubic_to(right - r + k, y, right, y + r - k, right, y + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.cubic_to(x + r - k, bottom, x, bottom - r + k, x, bottom - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    pb.close();
    pb.finish()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(pixmap: &Pixmap, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let p = pixmap.pixel(x, y).expect("in bounds");
        (p.red(), p.green(), p.blue(), p.alpha())
    }

    #[test]
    fn canvas_is_1024_square() {
        let pixmap = render().unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (SIZE, SIZE));
    }

    #[test]
    fn output_is_byte_stable() {
        let a = encode_png(&render().unwrap()).unwrap();
        let b = encode_png(&render().unwrap()).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn rounded_corner_outside_sheet_is_transparent() {
        let pixmap = render().unwrap();
        // Bottom corners are not covered by the header band.
        assert_eq!(rgba(&pixmap, 1, SIZE - 2).3, 0);
        assert_eq!(rgba(&pixmap, SIZE - 2, SIZE - 2).3, 0);
    }

    #[test]
    fn plain_paper_between_rulings() {
        let pixmap = render().unwrap();
        // y = 500 sits between the rulings at 472 and 540.
        let (r, g, b, a) = rgba(&pixmap, 512, 500);
        assert_eq!(a, 255);
        assert_eq!(r, 255);
        assert!((249..=250).contains(&g), "g = {g}");
        assert!((216..=217).contains(&b), "b = {b}");
    }

    #[test]
    fn rulings_darken_the_paper() {
        let pixmap = render().unwrap();
        for i in 0..RULING_COUNT as u32 {
            let y = 200 + i * 68;
            let (r, _, _, _) = rgba(&pixmap, 512, y);
            assert!(r < 255, "ruling {i} at y={y} not drawn");
        }
        // Outside the side margins the paper is untouched.
        assert_eq!(rgba(&pixmap, 40, 200).0, 255);
    }

    #[test]
    fn accent_mark_is_red() {
        let pixmap = render().unwrap();
        let (r, g, b, a) = rgba(&pixmap, 116, 116);
        assert_eq!(a, 255);
        assert!(r > 200 && g < 60 && b < 60, "({r}, {g}, {b})");
    }

    #[test]
    fn write_png_lands_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let png = encode_png(&render().unwrap()).unwrap();
        let path = write_png(dir.path(), &png).unwrap();
        assert_eq!(path, dir.path().join("icon.png"));
        assert_eq!(fs::read(&path).unwrap(), png);
    }

    #[test]
    fn write_png_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_png(&dir.path().join("absent"), b"x").unwrap_err();
        assert!(matches!(err, InkpadError::Io { op: IoOp::Write, .. }), "{err:?}");
    }
}
