//! Body wrapping, box sizing and the vertical flow of section boxes.

use std::borrow::Cow;

use textwrap::{Options, WordSeparator, WrapAlgorithm};

use super::sections::Section;
use super::RenderConfig;

/// Extra height reserved inside every box for the title row.
pub const TITLE_ALLOWANCE: u32 = 30;

/// One section laid out on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBox {
    /// Section title.
    pub title: String,
    /// Wrapped display lines in reading order.
    pub lines: Vec<String>,
    /// Top edge of the box in canvas pixels.
    pub top: u32,
    /// Box height in pixels.
    pub height: u32,
}

impl RenderedBox {
    /// Bottom edge of the box in canvas pixels.
    pub fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height)
    }
}

/// All boxes of a document plus the cursor left after the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Boxes top to bottom.
    pub boxes: Vec<RenderedBox>,
    /// Vertical cursor after the last box and its trailing spacing.
    pub cursor: u32,
}

impl Layout {
    /// Height the finished canvas is cropped to.
    pub fn crop_height(&self, config: &RenderConfig) -> u32 {
        self.cursor.saturating_add(config.bottom_margin)
    }
}

/// Greedily wrap every non-blank body line at `width` characters and
/// flatten the result.
///
/// Tabs, carriage returns and other ASCII whitespace count as spaces, so
/// they are break points and never show up in a display line.
pub fn wrap_body(body: &[&str], width: usize) -> Vec<String> {
    let options = Options::new(width.max(1))
        .wrap_algorithm(WrapAlgorithm::FirstFit)
        .word_separator(WordSeparator::AsciiSpace);

    body.iter()
        .filter(|line| !line.trim().is_empty())
        .flat_map(|line| {
            let line = spaces_only(line);
            textwrap::wrap(&line, options.clone())
                .into_iter()
                .map(Cow::into_owned)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Replace every ASCII whitespace character (vertical tab included) with a
/// plain space and drop trailing whitespace.
fn spaces_only(line: &str) -> String {
    line.trim_end()
        .chars()
        .map(|c| if c.is_ascii_whitespace() || c == '\u{b}' { ' ' } else { c })
        .collect()
}

/// Pixel height of a box holding `line_count` wrapped lines.
pub fn box_height(line_count: usize, config: &RenderConfig) -> u32 {
    let lines = u32::try_from(line_count).unwrap_or(u32::MAX);
    lines
        .saturating_mul(config.line_pitch)
        .saturating_add(config.section_padding.saturating_mul(2))
        .saturating_add(TITLE_ALLOWANCE)
}

/// Place sections top to bottom starting at the outer margin.
///
/// The cursor is threaded through the fold: each step places one box at the
/// incoming cursor and hands on `top + height + spacing`.
pub fn layout_sections(sections: &[Section<'_>], config: &RenderConfig) -> Layout {
    let (boxes, cursor) = sections.iter().fold(
        (Vec::with_capacity(sections.len()), config.margin),
        |(mut boxes, top), section| {
            let lines = wrap_body(&section.body, config.wrap_width);
            let height = box_height(lines.len(), config);
            let next = top.saturating_add(height).saturating_add(config.spacing);
            boxes.push(RenderedBox {
                title: section.title.to_owned(),
                lines,
                top,
                height,
            });
            (boxes, next)
        },
    );

    Layout { boxes, cursor }
}
