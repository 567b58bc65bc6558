//! Wrapping, sizing and vertical flow.

use persona_card::render::layout::box_height;
use persona_card::render::{layout_sections, split_sections, wrap_body, RenderConfig};

#[test]
fn short_line_wraps_to_itself() {
    let line = "Software Developer / Entrepreneur who posts mostly in r/rust and r/startups";
    assert!(line.chars().count() <= 95);
    assert_eq!(wrap_body(&[line], 95), vec![line.to_owned()]);
}

#[test]
fn wrapped_lines_respect_width_and_keep_words() {
    let line = "Frequently shares detailed breakdowns of side projects, asks for feedback on landing pages, \
                and answers beginner questions about async Rust with long, patient explanations.";
    let lines = wrap_body(&[line], 95);
    assert!(lines.len() > 1);
    assert!(lines.iter().all(|l| l.chars().count() <= 95));
    let rejoined = lines.join(" ");
    assert_eq!(
        rejoined.split_whitespace().collect::<Vec<_>>(),
        line.split_whitespace().collect::<Vec<_>>()
    );
}

#[test]
fn lines_from_several_body_lines_are_flattened_in_order() {
    let lines = wrap_body(&["first", "", "second", "  ", "third"], 95);
    assert_eq!(lines, vec!["first", "second", "third"]);
}

#[test]
fn boxes_never_overlap_or_leave_gaps() {
    let config = RenderConfig::default();
    let text = "**A**\none\n**B**\n\n**C**\nthree\nfour\nfive";
    let sections = split_sections(text);
    let layout = layout_sections(&sections, &config);

    assert_eq!(layout.boxes.len(), 3);
    assert_eq!(layout.boxes[0].top, config.margin);
    for pair in layout.boxes.windows(2) {
        assert_eq!(pair[1].top, pair[0].bottom().saturating_add(config.spacing));
    }
    assert_eq!(layout.boxes[1].height, box_height(0, &config));
    assert_eq!(layout.boxes[2].height, box_height(3, &config));
}

#[test]
fn crop_height_follows_cursor() {
    let config = RenderConfig::default();
    let sections = split_sections("**A**\none\n**B**\ntwo");
    let layout = layout_sections(&sections, &config);
    let last = &layout.boxes[1];
    assert_eq!(layout.cursor, last.bottom().saturating_add(config.spacing));
    assert_eq!(layout.crop_height(&config), 424);
}

#[test]
fn empty_layout_keeps_margins() {
    let config = RenderConfig::default();
    let layout = layout_sections(&[], &config);
    assert!(layout.boxes.is_empty());
    assert_eq!(layout.crop_height(&config), 100);
}

#[test]
fn carriage_returns_do_not_reach_display_lines() {
    let sections = split_sections("**Name:**\r\nKoji Ed\r\n\r\n**Age:**\r\nLate 20s\r\n");
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].title, "Name:");
    assert_eq!(wrap_body(&sections[0].body, 95), vec!["Koji Ed"]);
    assert_eq!(wrap_body(&sections[1].body, 95), vec!["Late 20s"]);
}

#[test]
fn tabs_are_break_points() {
    assert_eq!(wrap_body(&["Koji\tEd"], 95), vec!["Koji Ed"]);

    let line = format!("{}\t{}", "a".repeat(60), "b".repeat(60));
    assert_eq!(
        wrap_body(&[line.as_str()], 95),
        vec!["a".repeat(60), "b".repeat(60)]
    );
}

#[test]
fn other_ascii_whitespace_becomes_spaces() {
    assert_eq!(wrap_body(&["one\u{b}two\u{c}three"], 95), vec!["one two three"]);
}
