//! Reddit OAuth client using the app-only (client credentials) grant.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::RedditConfig;
use crate::credentials::Credentials;
use crate::providers::sanitize_http_error_body;

use super::{Activity, ActivitySource, FetchError, MIN_COMMENT_CHARS};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

/// Reddit caps listing pages at this many items.
const MAX_LISTING_LIMIT: u32 = 100;

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// OAuth token endpoint response.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for `oauth.reddit.com`.
    pub access_token: String,
}

/// `/user/<name>/about` response.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct AboutResponse {
    /// Account payload.
    pub data: AboutData,
}

/// Account fields used for the existence check.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct AboutData {
    /// Canonical username.
    #[serde(default)]
    pub name: String,
    /// Whether the account is suspended.
    #[serde(default)]
    pub is_suspended: bool,
}

/// A Reddit listing envelope.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    /// Listing payload.
    pub data: ListingData<T>,
}

/// Listing payload holding the child things.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    /// Items in listing order.
    #[serde(default = "Vec::new")]
    pub children: Vec<Thing<T>>,
}

/// A single listing item.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct Thing<T> {
    /// Item payload.
    pub data: T,
}

/// Submission fields used for persona input.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct SubmissionData {
    /// Post title.
    #[serde(default)]
    pub title: String,
    /// Self-post body; empty for link posts.
    #[serde(default)]
    pub selftext: String,
}

/// Comment fields used for persona input.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct CommentData {
    /// Comment markdown body.
    #[serde(default)]
    pub body: String,
}

/// Parse a submissions listing, keeping self posts as `"<title>\n<body>"`.
///
/// # Errors
///
/// Returns [`FetchError::Parse`] when the body is not a listing.
#[doc(hidden)]
pub fn parse_posts(body: &str) -> Result<Vec<String>, FetchError> {
    let listing: Listing<SubmissionData> =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(format!("submissions: {e}")))?;
    Ok(listing
        .data
        .children
        .into_iter()
        .map(|thing| thing.data)
        .filter(|post| !post.selftext.is_empty())
        .map(|post| format!("{}\n{}", post.title, post.selftext))
        .collect())
}

/// Parse a comments listing, keeping bodies longer than [`MIN_COMMENT_CHARS`].
///
/// # Errors
///
/// Returns [`FetchError::Parse`] when the body is not a listing.
#[doc(hidden)]
pub fn parse_comments(body: &str) -> Result<Vec<String>, FetchError> {
    let listing: Listing<CommentData> =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(format!("comments: {e}")))?;
    Ok(listing
        .data
        .children
        .into_iter()
        .map(|thing| thing.data.body)
        .filter(|body| body.chars().count() > MIN_COMMENT_CHARS)
        .collect())
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Reddit API client authenticated as an application.
#[derive(Clone)]
pub struct RedditClient {
    client_id: String,
    client_secret: String,
    user_agent: String,
    post_limit: u32,
    comment_limit: u32,
    token_url: String,
    api_base: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for RedditClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditClient")
            .field("client_id", &"[REDACTED]")
            .field("client_secret", &"[REDACTED]")
            .field("user_agent", &self.user_agent)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl RedditClient {
    /// Create a client from explicit app credentials.
    pub fn new(client_id: String, client_secret: String, config: &RedditConfig) -> Self {
        Self {
            client_id,
            client_secret,
            user_agent: config.user_agent.clone(),
            post_limit: config.post_limit.clamp(1, MAX_LISTING_LIMIT),
            comment_limit: config.comment_limit.clamp(1, MAX_LISTING_LIMIT),
            token_url: TOKEN_URL.to_owned(),
            api_base: API_BASE.to_owned(),
            http: reqwest::Client::new(),
        }
    }

    /// Create a client from loaded credentials, using the variable names in
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingCredentials`] when either value is absent
    /// or blank.
    pub fn from_credentials(
        credentials: &Credentials,
        config: &RedditConfig,
    ) -> Result<Self, FetchError> {
        let lookup = |key: &str| {
            credentials
                .get(key)
                .filter(|value| !value.trim().is_empty())
                .map(str::to_owned)
                .ok_or_else(|| FetchError::MissingCredentials { key: key.to_owned() })
        };
        let client_id = lookup(&config.client_id_env)?;
        let client_secret = lookup(&config.client_secret_env)?;
        Ok(Self::new(client_id, client_secret, config))
    }

    /// Point the client at different token and API endpoints.
    pub fn with_endpoints(mut self, token_url: impl Into<String>, api_base: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }

    async fn access_token(&self) -> Result<String, FetchError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Auth(format!(
                "status {}: {}",
                status.as_u16(),
                sanitize_http_error_body(&body)
            )));
        }
        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::Auth(format!("malformed token response: {e}")))?;
        Ok(token.access_token)
    }

    async fn get(&self, token: &str, endpoint: &str) -> Result<(u16, String), FetchError> {
        let url = format!("{}{endpoint}", self.api_base);
        debug!(%url, "reddit request");
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }

    async fn get_ok(&self, token: &str, endpoint: &str) -> Result<String, FetchError> {
        let (status, body) = self.get(token, endpoint).await?;
        if !(200..300).contains(&status) {
            return Err(FetchError::HttpStatus {
                endpoint: endpoint.to_owned(),
                status,
                body: sanitize_http_error_body(&body),
            });
        }
        Ok(body)
    }

    async fn check_user(&self, token: &str, username: &str) -> Result<(), FetchError> {
        let endpoint = format!("/user/{username}/about");
        let (status, body) = self.get(token, &endpoint).await?;
        if status == 404 {
            return Err(FetchError::UserNotFound {
                username: username.to_owned(),
            });
        }
        if !(200..300).contains(&status) {
            return Err(FetchError::HttpStatus {
                endpoint,
                status,
                body: sanitize_http_error_body(&body),
            });
        }
        let about: AboutResponse = parse_json(&body, "about")?;
        if about.data.is_suspended {
            return Err(FetchError::Suspended {
                username: username.to_owned(),
            });
        }
        debug!(name = %about.data.name, "reddit user resolved");
        Ok(())
    }
}

fn parse_json<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Parse(format!("{what}: {e}")))
}

#[async_trait]
impl ActivitySource for RedditClient {
    async fn fetch(&self, username: &str) -> Result<Activity, FetchError> {
        let token = self.access_token().await?;
        self.check_user(&token, username).await?;

        let submitted = self
            .get_ok(
                &token,
                &format!("/user/{username}/submitted?sort=new&limit={}", self.post_limit),
            )
            .await?;
        let posts = parse_posts(&submitted)?;

        let commented = self
            .get_ok(
                &token,
                &format!("/user/{username}/comments?sort=new&limit={}", self.comment_limit),
            )
            .await?;
        let comments = parse_comments(&commented)?;

        info!(
            username,
            posts = posts.len(),
            comments = comments.len(),
            "reddit activity fetched"
        );
        Ok(Activity { posts, comments })
    }
}
