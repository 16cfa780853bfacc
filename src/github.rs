use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://api.github.com/users";
const REPOS_PER_PAGE: &str = "5";
const REPOS_SORT: &str = "created: asc";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A user profile from the `/users/{username}` resource.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
    pub public_repos: u32,
    pub public_gists: u32,
    pub followers: u32,
    pub following: u32,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One entry of the `/users/{username}/repos` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    pub name: String,
    pub html_url: String,
    pub stargazers_count: u32,
    pub watchers_count: u32,
    pub forks_count: u32,
}

/// Combined result of one search. A transport failure is reported separately
/// through the `Result` wrapping this.
#[derive(Debug, Clone)]
pub enum Lookup {
    Found { profile: Profile, repos: Vec<Repo> },
    NotFound,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn lookup(&self, username: &str) -> Result<Lookup>;
}

#[derive(Clone)]
pub struct GithubClient {
    http: Arc<Client>,
    base: String,
}

impl GithubClient {
    pub fn new() -> Result<Self> {
        Self::with_base(BASE_URL)
    }

    pub fn with_base(base: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent("gitfind")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http: Arc::new(http),
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// GET a resource and parse the body as JSON, even for non-2xx statuses:
    /// "user absent" arrives as a 404 whose payload carries the marker we
    /// inspect later, not as a distinct error channel.
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        debug!(url, "GET");

        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Network error sending request to GitHub: {e}"))?;

        let json: Value = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse JSON from GitHub: {e}"))?;

        Ok(json)
    }

    async fn fetch_profile(&self, username: &str) -> Result<Value> {
        let url = format!("{}/{}", self.base, username);
        self.get_json(&url, &[]).await
    }

    async fn fetch_repos(&self, username: &str) -> Result<Value> {
        let url = format!("{}/{}/repos", self.base, username);
        self.get_json(&url, &[("per_page", REPOS_PER_PAGE), ("sort", REPOS_SORT)])
            .await
    }
}

/// Interpret the profile payload: the API signals an unknown user with a
/// `message` field in an otherwise well-formed body.
fn profile_from(body: Value) -> Result<Option<Profile>> {
    if body.get("message").is_some() {
        return Ok(None);
    }

    let profile =
        serde_json::from_value(body).context("Failed to deserialize user profile response")?;

    Ok(Some(profile))
}

/// Interpret the repository collection payload. Unknown users get an error
/// object here instead of an array; that must not fail the lookup, since the
/// profile payload alone decides between found and not-found.
fn repos_from(body: Value) -> Result<Vec<Repo>> {
    if !body.is_array() {
        return Ok(Vec::new());
    }

    serde_json::from_value(body).context("Failed to deserialize repository list response")
}

#[async_trait]
impl UserLookup for GithubClient {
    async fn lookup(&self, username: &str) -> Result<Lookup> {
        let (profile_body, repos_body) =
            tokio::try_join!(self.fetch_profile(username), self.fetch_repos(username))?;

        match profile_from(profile_body)? {
            Some(profile) => {
                let repos = repos_from(repos_body)?;
                debug!(user = %profile.login, repos = repos.len(), "lookup succeeded");
                Ok(Lookup::Found { profile, repos })
            }
            None => {
                debug!(username, "user not found");
                Ok(Lookup::NotFound)
            }
        }
    }
}
