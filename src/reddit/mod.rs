//! Reddit activity fetching.
//!
//! [`ActivitySource`] is the seam the pipeline talks to; [`client::RedditClient`]
//! implements it against the Reddit OAuth API with app-only credentials.

use async_trait::async_trait;
use regex::Regex;

pub mod client;

pub use client::RedditClient;

/// Comments at or below this many characters are ignored.
pub const MIN_COMMENT_CHARS: usize = 10;

/// A user's recent public activity, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activity {
    /// Self posts as `"<title>\n<body>"`.
    pub posts: Vec<String>,
    /// Comment bodies longer than [`MIN_COMMENT_CHARS`].
    pub comments: Vec<String>,
}

impl Activity {
    /// True when neither posts nor comments were found.
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty() && self.comments.is_empty()
    }
}

/// Errors fetching a user's activity. Display strings are shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Client id or secret not configured.
    #[error("missing Reddit API credentials: {key} is not set")]
    MissingCredentials {
        /// Name of the missing variable.
        key: String,
    },
    /// The OAuth token request was rejected.
    #[error("Reddit authentication failed: {0}")]
    Auth(String),
    /// The user does not exist.
    #[error("Reddit user u/{username} was not found")]
    UserNotFound {
        /// Requested username.
        username: String,
    },
    /// The account is suspended and its activity is hidden.
    #[error("Reddit user u/{username} is suspended")]
    Suspended {
        /// Requested username.
        username: String,
    },
    /// Transport failure.
    #[error("Reddit request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Reddit answered with a non-success status.
    #[error("Reddit returned status {status} for {endpoint}: {body}")]
    HttpStatus {
        /// Endpoint path that failed.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
    /// A response did not have the expected shape.
    #[error("unexpected Reddit response: {0}")]
    Parse(String),
}

/// Anything that can list a user's recent posts and comments.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Fetch recent activity for `username` (no `u/` prefix).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the user cannot be resolved or the
    /// listings cannot be read.
    async fn fetch(&self, username: &str) -> Result<Activity, FetchError>;
}

/// Pull a username out of a profile URL, a `u/name` reference or a bare name.
pub fn extract_username(input: &str) -> String {
    for pattern in [
        r"(?i)reddit\.com/user/([^/]+)",
        r"(?i)reddit\.com/u/([^/]+)",
        r"(?i)u/([^/]+)",
    ] {
        let Ok(regex) = Regex::new(pattern) else {
            continue;
        };
        if let Some(name) = regex.captures(input).and_then(|caps| caps.get(1)) {
            return name.as_str().to_owned();
        }
    }
    input.trim().replace('/', "")
}
