//! Persona prompt construction.
//!
//! The instructions insist on `**Title:**` lines with the content starting on
//! the following line, which is the shape [`crate::render`] splits on.

/// Sections the model is asked to cover, in order.
pub const PERSONA_SECTIONS: &[&str] = &[
    "Name",
    "Estimated Age",
    "Occupation",
    "Location",
    "Personality Traits (MBTI)",
    "Archetype (Explorer, Creator, etc.)",
    "Digital Behavior (posting habits, subreddits)",
    "Motivations",
    "Frustrations",
    "Quotes or phrases that support each insight",
];

const INSTRUCTIONS: &str = "\
You are a behavioral analyst. Analyze the following Reddit user activity and generate a detailed user persona.

Please follow this **strict formatting rule**:
- Each section title (e.g., Name, Age) must be on a separate line.
- The explanation or content should start **from the next line**, not on the same line.
- Use markdown formatting: headings like `**Name:**` followed by the answer on the next line.
- Do not combine title and content in one line.

Example Format:
**Name:**
Koji Ed (derived from the username \"kojied\")

**Estimated Age:**
Late 20s to early 30s

**Occupation:**
Software Developer / Entrepreneur

**Location:**
New York City, USA

...and so on for all sections.
";

/// Join posts and comments into the activity block, posts first.
pub fn activity_text(posts: &[String], comments: &[String]) -> String {
    posts
        .iter()
        .map(|post| format!("POST: {post}"))
        .chain(comments.iter().map(|comment| format!("COMMENT: {comment}")))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the full persona prompt for `username`.
pub fn build_prompt(posts: &[String], comments: &[String], username: &str) -> String {
    let sections = PERSONA_SECTIONS
        .iter()
        .map(|section| format!("- {section}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{INSTRUCTIONS}\nSections to include:\n{sections}\n\nReddit user: u/{username}\n\nReddit Activity:\n{}\n",
        activity_text(posts, comments)
    )
}
