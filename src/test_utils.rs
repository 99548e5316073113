//! Test utilities for gh-harvest
#![cfg(test)]

use crate::config::Config;
use crate::github::{IssueSummary, UserRef, DEFAULT_API_BASE};
use crate::handlers::HarvestContext;

/// Issue listing with one issue and one pull request
pub const ISSUES_BODY: &str = r#"[
  {
    "html_url": "https://github.com/acme/widget/issues/1",
    "title": "Crash on start",
    "created_at": "2025-02-01T09:30:00Z",
    "user": {"login": "octocat", "html_url": "https://github.com/octocat"}
  },
  {
    "html_url": "https://github.com/acme/widget/pull/2",
    "title": "Fix crash on start",
    "created_at": "2025-02-02T09:30:00Z",
    "user": {"login": "hubot", "html_url": "https://github.com/hubot"},
    "pull_request": {"url": "https://api.github.com/repos/acme/widget/pulls/2"}
  }
]"#;

/// Context against the public API with a fixed `since`
pub fn test_context() -> HarvestContext {
    let since = "2024-06-01T12:00:00Z".parse().expect("valid timestamp");
    HarvestContext::new(DEFAULT_API_BASE, since)
}

/// Default configuration without the inter-request delay
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.harvest.request_delay_ms = 0;
    config
}

/// An issue summary opened by `octocat`
pub fn issue_summary(url: &str, title: &str) -> IssueSummary {
    IssueSummary {
        html_url: url.to_string(),
        title: title.to_string(),
        created_at: "2025-01-15T08:00:00Z".parse().expect("valid timestamp"),
        user: Some(UserRef {
            login: "octocat".to_string(),
            html_url: Some("https://github.com/octocat".to_string()),
        }),
        pull_request: None,
    }
}
