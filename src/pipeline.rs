//! End-to-end persona generation.
//!
//! username → activity → prompt → streamed persona text → text file + image.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::prompt::build_prompt;
use crate::providers::{collect_stream, CompletionRequest, LlmProvider, ProviderError};
use crate::reddit::{extract_username, ActivitySource, FetchError};
use crate::render::{try_render, RenderConfig};

/// Errors that abort a pipeline run. Display strings are shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Nothing usable was entered.
    #[error("enter a Reddit username or profile URL")]
    EmptyInput,
    /// The extracted username has characters Reddit does not allow.
    #[error("'{0}' is not a valid Reddit username")]
    InvalidUsername(String),
    /// Activity could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The user has no usable posts or comments.
    #[error("no activity found for u/{username}")]
    NoActivity {
        /// Resolved username.
        username: String,
    },
    /// The language model call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Writing an output file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Files and text produced by a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaOutcome {
    /// Resolved Reddit username.
    pub username: String,
    /// Final generated persona text.
    pub persona: String,
    /// Where the persona text was written.
    pub text_path: PathBuf,
    /// Where the persona image was written; `None` when rendering failed.
    pub image_path: Option<PathBuf>,
}

/// Wires an activity source and a model provider into one run.
pub struct PersonaPipeline<'a> {
    source: &'a dyn ActivitySource,
    provider: &'a dyn LlmProvider,
    max_tokens: u32,
    render: RenderConfig,
}

impl<'a> PersonaPipeline<'a> {
    /// Create a pipeline.
    pub fn new(
        source: &'a dyn ActivitySource,
        provider: &'a dyn LlmProvider,
        max_tokens: u32,
        render: RenderConfig,
    ) -> Self {
        Self {
            source,
            provider,
            max_tokens,
            render,
        }
    }

    /// Run the whole flow for `input` (a username or profile URL), writing
    /// `persona_<username>.txt` and `persona_<username>.png` into `out_dir`.
    ///
    /// Every generated text delta is passed to `on_delta` as it arrives. A
    /// failed image render is logged and reported as `image_path: None`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when the input is unusable, the fetch or
    /// generation fails, the user has no activity, or the text file cannot
    /// be written.
    pub async fn run<F>(
        &self,
        input: &str,
        out_dir: &Path,
        on_delta: F,
    ) -> Result<PersonaOutcome, PipelineError>
    where
        F: FnMut(&str),
    {
        if input.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        let username = extract_username(input);
        if !is_valid_username(&username) {
            return Err(PipelineError::InvalidUsername(username));
        }

        let activity = self.source.fetch(&username).await?;
        if activity.is_empty() {
            return Err(PipelineError::NoActivity { username });
        }

        let prompt = build_prompt(&activity.posts, &activity.comments, &username);
        let request = CompletionRequest {
            prompt,
            max_tokens: Some(self.max_tokens),
        };

        info!(
            %username,
            model = %self.provider.model_id(),
            posts = activity.posts.len(),
            comments = activity.comments.len(),
            "generating persona"
        );
        let stream = self.provider.stream(request).await?;
        let persona = collect_stream(stream, on_delta).await?;

        tokio::fs::create_dir_all(out_dir)
            .await
            .map_err(|source| PipelineError::Write {
                path: out_dir.to_path_buf(),
                source,
            })?;

        let text_path = out_dir.join(format!("persona_{username}.txt"));
        tokio::fs::write(&text_path, &persona)
            .await
            .map_err(|source| PipelineError::Write {
                path: text_path.clone(),
                source,
            })?;

        let image_path = out_dir.join(format!("persona_{username}.png"));
        let image_path = match try_render(&persona, &image_path, &self.render) {
            Ok(outcome) => {
                info!(
                    path = %image_path.display(),
                    sections = outcome.sections,
                    fonts = %outcome.fonts,
                    "persona image ready"
                );
                Some(image_path)
            }
            Err(err) => {
                warn!(error = %err, "persona image not produced");
                None
            }
        };

        Ok(PersonaOutcome {
            username,
            persona,
            text_path,
            image_path,
        })
    }
}

/// Reddit usernames are made of `[A-Za-z0-9_-]`.
fn is_valid_username(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
