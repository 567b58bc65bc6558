//! Persona text to PNG rendering.
//!
//! A persona document is a run of `**Title**` lines each followed by free
//! text. Every section becomes a light, bordered box holding an orange title
//! and the wrapped body. Boxes are stacked top to bottom on a fixed-width
//! canvas which is cropped to the content before it is written out.
//!
//! [`render`] is the boolean entry point used by the CLI and the pipeline.
//! [`try_render`] returns the [`RenderOutcome`] or [`RenderError`] instead.

use std::path::{Path, PathBuf};

use image::{imageops, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use serde::Deserialize;
use tracing::{error, info};

pub mod fonts;
pub mod layout;
pub mod sections;

pub use fonts::FontSource;
pub use layout::{layout_sections, wrap_body, Layout, RenderedBox};
pub use sections::{is_title, split_sections, title_text, Section};

use fonts::FontSet;

/// Canvas background.
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
/// Section box fill.
pub const BOX_FILL: Rgb<u8> = Rgb([245, 245, 245]);
/// Section box border.
pub const BORDER_COLOR: Rgb<u8> = Rgb([200, 200, 200]);
/// Section title color (orange).
pub const HEADER_COLOR: Rgb<u8> = Rgb([255, 102, 0]);
/// Body text color.
pub const BODY_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Border thickness in pixels.
const BORDER_WIDTH: u32 = 2;
/// Horizontal inset of text from the box edge.
const TEXT_INSET: i32 = 20;
/// How far the title sits above the padding line.
const TITLE_RAISE: i32 = 10;
/// Offset of the first body line below the padding line.
const BODY_DROP: i32 = 25;
/// Largest canvas height that will be allocated.
pub const MAX_CANVAS_HEIGHT: u32 = 60_000;
/// Largest canvas width that will be allocated.
pub const MAX_CANVAS_WIDTH: u32 = 20_000;

/// Layout constants and font choices for the renderer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Height allocated up front, before cropping.
    pub initial_height: u32,
    /// Outer margin: left/right of every box and above the first one.
    pub margin: u32,
    /// Vertical gap between consecutive boxes.
    pub spacing: u32,
    /// Padding inside a box above the title and below the last line.
    pub section_padding: u32,
    /// Vertical distance between body lines.
    pub line_pitch: u32,
    /// Wrap column for body text, in characters.
    pub wrap_width: usize,
    /// Space kept below the cursor when cropping.
    pub bottom_margin: u32,
    /// Preferred bold font for titles (path or bare file name).
    pub header_font: PathBuf,
    /// Preferred regular font for body text (path or bare file name).
    pub body_font: PathBuf,
    /// Title font size in pixels.
    pub header_size: f32,
    /// Body font size in pixels.
    pub body_size: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1400,
            initial_height: 3000,
            margin: 60,
            spacing: 40,
            section_padding: 30,
            line_pitch: 32,
            wrap_width: 95,
            bottom_margin: 40,
            header_font: PathBuf::from("arialbd.ttf"),
            body_font: PathBuf::from("arial.ttf"),
            header_size: 26.0,
            body_size: 22.0,
        }
    }
}

/// What a successful render produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Number of section boxes drawn.
    pub sections: usize,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels, after cropping.
    pub height: u32,
    /// Whether the configured fonts or the built-in face were used.
    pub fonts: FontSource,
}

/// Errors that stop a render.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Layout constants leave no room for a box.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
    /// The content needs a taller canvas than allowed.
    #[error("canvas height {height} exceeds the {max} pixel limit")]
    CanvasTooLarge {
        /// Height the content needs.
        height: u32,
        /// Maximum allowed height.
        max: u32,
    },
    /// Encoding or writing the image failed.
    #[error("failed to write image to {path}: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying encoder or I/O error.
        #[source]
        source: image::ImageError,
    },
}

/// Render `text` to a PNG at `output_path` with the default layout.
///
/// Returns `false` when the image could not be produced; the cause is logged.
pub fn render(text: &str, output_path: impl AsRef<Path>) -> bool {
    render_with_config(text, output_path, &RenderConfig::default())
}

/// Render `text` to a PNG at `output_path` with the given layout.
///
/// Returns `false` when the image could not be produced; the cause is logged.
pub fn render_with_config(text: &str, output_path: impl AsRef<Path>, config: &RenderConfig) -> bool {
    let output_path = output_path.as_ref();
    match try_render(text, output_path, config) {
        Ok(_) => true,
        Err(err) => {
            error!(path = %output_path.display(), error = %err, "persona image render failed");
            false
        }
    }
}

/// Render `text` to a PNG at `output_path`.
///
/// A document without any renderable section still produces a small blank
/// image. Font loading problems are not errors; they show up as
/// [`FontSource::Fallback`] in the outcome.
///
/// # Errors
///
/// Returns [`RenderError`] for unusable layout constants (including a width
/// above [`MAX_CANVAS_WIDTH`]), oversized content,
/// or when the image cannot be encoded or written.
pub fn try_render(
    text: &str,
    output_path: &Path,
    config: &RenderConfig,
) -> Result<RenderOutcome, RenderError> {
    validate(config)?;

    let sections = split_sections(text);
    let layout = layout_sections(&sections, config);
    let height = layout.crop_height(config);
    if height > MAX_CANVAS_HEIGHT {
        return Err(RenderError::CanvasTooLarge {
            height,
            max: MAX_CANVAS_HEIGHT,
        });
    }

    let fonts = FontSet::load(config);
    let alloc_height = config.initial_height.clamp(height, MAX_CANVAS_HEIGHT);
    let mut canvas = RgbImage::from_pixel(config.width, alloc_height, BACKGROUND);
    for rendered in &layout.boxes {
        draw_box(&mut canvas, rendered, &fonts, config);
    }

    let cropped = imageops::crop_imm(&canvas, 0, 0, config.width, height).to_image();
    cropped
        .save_with_format(output_path, ImageFormat::Png)
        .map_err(|source| RenderError::Write {
            path: output_path.to_path_buf(),
            source,
        })?;

    info!(
        path = %output_path.display(),
        sections = layout.boxes.len(),
        height,
        fonts = %fonts.source,
        "persona image written"
    );

    Ok(RenderOutcome {
        sections: layout.boxes.len(),
        width: config.width,
        height,
        fonts: fonts.source,
    })
}

fn validate(config: &RenderConfig) -> Result<(), RenderError> {
    if config.width > MAX_CANVAS_WIDTH {
        return Err(RenderError::InvalidLayout(format!(
            "width {} exceeds the {MAX_CANVAS_WIDTH} pixel limit",
            config.width
        )));
    }
    let min_width = config
        .margin
        .saturating_mul(2)
        .saturating_add(BORDER_WIDTH.saturating_mul(2));
    if config.width <= min_width {
        return Err(RenderError::InvalidLayout(format!(
            "width {} leaves no room inside margins of {}",
            config.width, config.margin
        )));
    }
    if config.wrap_width == 0 {
        return Err(RenderError::InvalidLayout("wrap width must be positive".to_owned()));
    }
    Ok(())
}

fn draw_box(canvas: &mut RgbImage, rendered: &RenderedBox, fonts: &FontSet, config: &RenderConfig) {
    let left = to_px(config.margin);
    let top = to_px(rendered.top);
    let box_width = config.width.saturating_sub(config.margin.saturating_mul(2));

    if let Some(rect) = pixel_rect(left, top, box_width, rendered.height) {
        draw_filled_rect_mut(canvas, rect, BOX_FILL);
    }
    for inset in 0..BORDER_WIDTH {
        let offset = to_px(inset);
        let Some(rect) = pixel_rect(
            left.saturating_add(offset),
            top.saturating_add(offset),
            box_width.saturating_sub(inset.saturating_mul(2)),
            rendered.height.saturating_sub(inset.saturating_mul(2)),
        ) else {
            break;
        };
        draw_hollow_rect_mut(canvas, rect, BORDER_COLOR);
    }

    let padding = to_px(config.section_padding);
    let text_x = left.saturating_add(TEXT_INSET);
    fonts.header.draw(
        canvas,
        HEADER_COLOR,
        text_x,
        top.saturating_add(padding).saturating_sub(TITLE_RAISE),
        &rendered.title,
    );

    let pitch = to_px(config.line_pitch);
    let mut text_y = top.saturating_add(padding).saturating_add(BODY_DROP);
    for line in &rendered.lines {
        fonts.body.draw(canvas, BODY_COLOR, text_x, text_y, line);
        text_y = text_y.saturating_add(pitch);
    }
}

fn to_px(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// A non-empty rectangle whose far edges are representable as `i32`.
pub(crate) fn pixel_rect(x: i32, y: i32, width: u32, height: u32) -> Option<Rect> {
    if width == 0 || height == 0 {
        return None;
    }
    x.checked_add(i32::try_from(width).ok()?)?;
    y.checked_add(i32::try_from(height).ok()?)?;
    Some(Rect::at(x, y).of_size(width, height))
}
