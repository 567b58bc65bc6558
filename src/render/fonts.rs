//! Font loading with a silent fallback to a built-in bitmap face.

use std::fmt;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use tracing::debug;

use super::{pixel_rect, RenderConfig};

/// Directories searched when a font is configured by bare file name.
const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// How deep below a font directory the search descends.
const MAX_SEARCH_DEPTH: usize = 4;

/// Side length of a built-in glyph cell, in font pixels.
const BITMAP_CELL: u32 = 8;

/// Scale applied to built-in glyphs.
const BITMAP_SCALE: u32 = 2;

/// Which faces a render ended up drawing with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSource {
    /// Both configured font files loaded.
    Loaded,
    /// At least one configured font failed; the built-in face was used for both.
    Fallback,
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded => f.write_str("loaded"),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

/// A face able to draw a single line of text.
pub(crate) enum Face {
    Outline { font: FontVec, scale: PxScale },
    Bitmap { scale: u32 },
}

impl Face {
    /// Draw `text` with its top-left corner at `(x, y)`. Pixels outside the
    /// canvas are clipped.
    pub(crate) fn draw(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, text: &str) {
        match self {
            Self::Outline { font, scale } => draw_text_mut(canvas, color, x, y, *scale, font, text),
            Self::Bitmap { scale } => draw_bitmap_text(canvas, color, x, y, *scale, text),
        }
    }
}

/// Header and body faces for one render.
pub(crate) struct FontSet {
    pub(crate) header: Face,
    pub(crate) body: Face,
    pub(crate) source: FontSource,
}

impl FontSet {
    /// Load the configured faces, falling back to the built-in face for
    /// both when either one fails.
    pub(crate) fn load(config: &RenderConfig) -> Self {
        match (load_font(&config.header_font), load_font(&config.body_font)) {
            (Ok(header), Ok(body)) => Self {
                header: Face::Outline {
                    font: header,
                    scale: PxScale::from(config.header_size),
                },
                body: Face::Outline {
                    font: body,
                    scale: PxScale::from(config.body_size),
                },
                source: FontSource::Loaded,
            },
            (header, body) => {
                for err in [header.err(), body.err()].into_iter().flatten() {
                    debug!(reason = %err, "using built-in font");
                }
                Self::builtin()
            }
        }
    }

    /// The built-in bitmap face for both roles.
    pub(crate) fn builtin() -> Self {
        Self {
            header: Face::Bitmap {
                scale: BITMAP_SCALE,
            },
            body: Face::Bitmap {
                scale: BITMAP_SCALE,
            },
            source: FontSource::Fallback,
        }
    }
}

fn load_font(configured: &Path) -> Result<FontVec, String> {
    let path = resolve_font_path(configured)
        .ok_or_else(|| format!("font {} not found", configured.display()))?;
    let bytes = std::fs::read(&path)
        .map_err(|e| format!("failed to read font {}: {e}", path.display()))?;
    FontVec::try_from_vec(bytes).map_err(|e| format!("invalid font {}: {e}", path.display()))
}

/// Resolve a configured font to an existing file.
///
/// Paths that exist are used as-is. A bare file name is also looked up in
/// the usual system font directories.
fn resolve_font_path(configured: &Path) -> Option<PathBuf> {
    if configured.is_file() {
        return Some(configured.to_path_buf());
    }
    let is_bare_name = configured.parent().map_or(true, |p| p.as_os_str().is_empty());
    if !is_bare_name {
        return None;
    }
    let name = configured.file_name()?;
    FONT_DIRS
        .iter()
        .find_map(|dir| find_file(Path::new(dir), name, MAX_SEARCH_DEPTH))
}

fn find_file(dir: &Path, name: &std::ffi::OsStr, depth: usize) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path
            .file_name()
            .is_some_and(|file| file.eq_ignore_ascii_case(name))
        {
            return Some(path);
        }
    }
    if depth == 0 {
        return None;
    }
    subdirs
        .iter()
        .find_map(|sub| find_file(sub, name, depth.saturating_sub(1)))
}

fn draw_bitmap_text(canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, scale: u32, text: &str) {
    let scale = scale.max(1);
    let step = i32::try_from(scale).unwrap_or(1);
    let advance = i32::try_from(BITMAP_CELL.saturating_mul(scale)).unwrap_or(i32::MAX);

    let mut pen_x = x;
    for ch in text.chars() {
        if let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| LATIN_FONTS.get(ch)) {
            for (row, bits) in (0_i32..).zip(glyph) {
                for (col, shift) in (0_i32..).zip(0..BITMAP_CELL) {
                    if !bits.checked_shr(shift).is_some_and(|b| b & 1 != 0) {
                        continue;
                    }
                    if let Some(rect) = pixel_rect(
                        pen_x.saturating_add(step.saturating_mul(col)),
                        y.saturating_add(step.saturating_mul(row)),
                        scale,
                        scale,
                    ) {
                        draw_filled_rect_mut(canvas, rect, color);
                    }
                }
            }
        }
        pen_x = pen_x.saturating_add(advance);
    }
}
