use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// One entry of a repository contents listing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentEntry {
    pub name: String,
    pub html_url: Option<String>,
}

/// The subset of single-repository metadata we consume
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepoMetadata {
    pub language: Option<String>,
    pub open_issues_count: u64,
    #[serde(default)]
    pub archived: bool,
}

/// An issue (or pull request) as returned by the issues listing endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IssueSummary {
    pub html_url: String,
    pub title: String,
    pub created_at: Timestamp,
    pub user: Option<UserRef>,
    /// Present only when the item is a pull request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl IssueSummary {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// Account reference embedded in API objects
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserRef {
    pub login: String,
    pub html_url: Option<String>,
}

/// Error body returned by the API instead of the expected shape
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub message: String,
    pub documentation_url: Option<String>,
}
