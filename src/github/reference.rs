use anyhow::{anyhow, Result};
use std::fmt;
use std::str::FromStr;

/// A parsed `owner/repo` reference
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RepoSlug {
    /// Repository owner (e.g., "tokio-rs")
    pub owner: String,
    /// Repository name (e.g., "tokio")
    pub repo: String,
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoSlug {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self> {
        parse_repo_slug(input)
    }
}

/// Parse a repository reference.
///
/// Accepts `owner/repo`, `https://github.com/owner/repo` (optionally with a
/// `.git` suffix or trailing path) and `git+https://github.com/owner/repo.git`.
pub fn parse_repo_slug(input: &str) -> Result<RepoSlug> {
    let input = input.trim();
    let path = strip_github_prefix(input).unwrap_or(input);

    let mut parts = path.split('/').filter(|p| !p.is_empty());
    let owner = parts
        .next()
        .ok_or_else(|| anyhow!("Missing owner in repository reference: {:?}", input))?;
    let repo = parts
        .next()
        .ok_or_else(|| anyhow!("Missing repository name in reference: {:?}", input))?;

    // Shorthand references carry exactly two segments
    if path.len() == input.len() && parts.next().is_some() {
        return Err(anyhow!("Invalid repository reference: {:?}", input));
    }

    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    if !is_valid_name(owner) || !is_valid_name(repo) {
        return Err(anyhow!("Invalid characters in repository reference: {:?}", input));
    }

    Ok(RepoSlug {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

fn strip_github_prefix(input: &str) -> Option<&str> {
    const PREFIXES: [&str; 4] = [
        "git+https://github.com/",
        "https://github.com/",
        "http://github.com/",
        "github.com/",
    ];

    PREFIXES.iter().find_map(|prefix| input.strip_prefix(prefix))
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}
