//! Title detection and section accumulation over a persona document.

/// Bold-markup delimiter wrapping a section title line.
const DELIMITER: &str = "**";

/// One title line and the raw body lines that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// Title with the bold markup stripped.
    pub title: &'a str,
    /// Body lines verbatim, blank lines included.
    pub body: Vec<&'a str>,
}

/// Returns the title carried by `line`, if the whole trimmed line is a
/// `**title**` span.
///
/// Lines that only contain bold markup somewhere inside them are body text.
pub fn title_text(line: &str) -> Option<&str> {
    let inner = line
        .trim()
        .strip_prefix(DELIMITER)?
        .strip_suffix(DELIMITER)?;
    if inner.is_empty() || inner.contains(DELIMITER) {
        return None;
    }
    Some(inner)
}

/// Whether `line` is a section title line.
pub fn is_title(line: &str) -> bool {
    title_text(line).is_some()
}

/// Split a persona document into sections in reading order.
///
/// Lines before the first title belong to no section and are dropped. A
/// section is emitted when the next title starts, whatever its body holds.
/// The trailing section is emitted only when at least one line (blank or
/// not) followed its title.
pub fn split_sections(text: &str) -> Vec<Section<'_>> {
    let mut sections = Vec::new();
    let mut current: Option<Section<'_>> = None;

    for line in text.split('\n') {
        match title_text(line) {
            Some(title) => {
                if let Some(done) = current.take() {
                    sections.push(done);
                }
                current = Some(Section {
                    title,
                    body: Vec::new(),
                });
            }
            None => {
                if let Some(section) = current.as_mut() {
                    section.body.push(line);
                }
            }
        }
    }

    if let Some(last) = current.filter(|section| !section.body.is_empty()) {
        sections.push(last);
    }

    sections
}
