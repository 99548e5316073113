use anyhow::{anyhow, Result};

mod client;
mod models;
mod reference;

pub use client::*;
pub use models::*;
pub use reference::{parse_repo_slug, RepoSlug};

/// Public REST endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Reject bodies that carry an API error object instead of the expected shape.
///
/// The API sometimes answers with `{"message": ...}` and a success status,
/// so a successful transport call still needs this check before parsing.
pub fn check_api_error(body: &str) -> Result<()> {
    match serde_json::from_str::<ApiError>(body) {
        Ok(error) => Err(anyhow!("GitHub API error: {}", error.message)),
        Err(_) => Ok(()),
    }
}
