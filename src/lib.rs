//! persona-card: turns a Reddit user's public activity into a persona.
//!
//! The activity is fetched through the Reddit API, summarised by a hosted
//! language model, and the resulting `**Title:**`-sectioned text is drawn
//! into a PNG card by [`render`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;

pub mod prompt;
pub mod providers;
pub mod reddit;

pub mod pipeline;
pub mod render;
