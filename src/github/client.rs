use crate::cache::ResponseCache;
use crate::github::models::ApiError;
use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};

const API_VERSION: &str = "2022-11-28";
const DEFAULT_USER_AGENT: &str = concat!("gh-harvest/", env!("CARGO_PKG_VERSION"));

/// GitHub transport abstraction: `GET url -> body text, or failure`
pub enum GitHubClient {
    Real(RealGitHub),
    #[cfg(test)]
    Mock(MockGitHub),
}

impl GitHubClient {
    /// Create a new real GitHub client authenticated with `token`
    pub fn new(token: &str, timeout: Duration, cache: Option<ResponseCache>) -> Result<Self> {
        Ok(GitHubClient::Real(RealGitHub::new(token, timeout, cache)?))
    }

    /// Create a mock client for testing
    #[cfg(test)]
    pub fn mock() -> Self {
        GitHubClient::Mock(MockGitHub::new())
    }

    /// Fetch the raw body at `url`
    pub fn get(&self, url: &str) -> Result<String> {
        match self {
            GitHubClient::Real(client) => client.get(url),
            #[cfg(test)]
            GitHubClient::Mock(client) => client.get(url),
        }
    }
}

/// Real GitHub client over HTTPS
pub struct RealGitHub {
    client: HttpClient,
    cache: Option<ResponseCache>,
}

impl RealGitHub {
    pub fn new(token: &str, timeout: Duration, cache: Option<ResponseCache>) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(anyhow!("GitHub token is empty"));
        }

        let client = HttpClient::builder()
            .default_headers(build_headers(token)?)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        if let Some(cache) = &cache {
            cache.initialize()?;
        }

        Ok(RealGitHub { client, cache })
    }

    /// Fetch the body at `url`, consulting the response cache first
    pub fn get(&self, url: &str) -> Result<String> {
        if let Some(cache) = &self.cache {
            match cache.get(url) {
                Ok(Some(body)) => {
                    debug!("Cache hit for {}", url);
                    return Ok(body);
                }
                Ok(None) => {}
                Err(e) => warn!("Ignoring unreadable cache entry for {}: {:#}", url, e),
            }
        }

        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to send request to GitHub API: {}", url))?;

        let body = handle_response(response)?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(url, &body) {
                warn!("Failed to cache response for {}: {:#}", url, e);
            }
        }

        Ok(body)
    }
}

/// Build the default request headers, marking the token as sensitive
fn build_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
        .context("Invalid GitHub token format")?;
    auth.set_sensitive(true);

    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

    Ok(headers)
}

/// Turn a non-success response into an error carrying the API message
fn handle_response(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().context("Failed to read response body")?;

    if status.is_success() {
        return Ok(body);
    }

    match serde_json::from_str::<ApiError>(&body) {
        Ok(error) => Err(anyhow!("GitHub API error ({}): {}", status, error.message)),
        Err(_) => Err(anyhow!("GitHub API error ({}): {}", status, body)),
    }
}

/// Mock GitHub client for testing
#[cfg(test)]
pub struct MockGitHub {
    /// (URL substring, body) pairs; the first match wins
    pub responses: Vec<(String, String)>,
    /// URL suffixes that fail at the transport level
    pub failures: Vec<String>,
    pub requests: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl MockGitHub {
    pub fn new() -> Self {
        MockGitHub {
            responses: vec![],
            failures: vec![],
            requests: std::cell::RefCell::new(vec![]),
        }
    }

    pub fn with_response(mut self, url_part: &str, body: &str) -> Self {
        self.responses.push((url_part.to_string(), body.to_string()));
        self
    }

    pub fn with_failure(mut self, url_suffix: &str) -> Self {
        self.failures.push(url_suffix.to_string());
        self
    }

    pub fn get(&self, url: &str) -> Result<String> {
        self.requests.borrow_mut().push(url.to_string());

        if self.failures.iter().any(|suffix| url.ends_with(suffix.as_str())) {
            return Err(anyhow!("Connection refused: {}", url));
        }

        self.responses
            .iter()
            .find(|(part, _)| url.contains(part.as_str()))
            .map(|(_, body)| body.clone())
            .ok_or_else(|| anyhow!("No mock response configured for {}", url))
    }

    /// Requested URLs containing `url_part`
    pub fn requests_matching(&self, url_part: &str) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .filter(|url| url.contains(url_part))
            .cloned()
            .collect()
    }
}
