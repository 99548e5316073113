use anyhow::{Context, Result};
use tracing::debug;

use super::{FetchHandler, HarvestContext};
use crate::github::ContentEntry;
use crate::store::AggregationStore;

/// Probes the repository's `.github` directory and creates the repository
/// record with its canonical URL and dependent-count snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct RepoFunding {
    pub owner: String,
    pub repo: String,
}

impl RepoFunding {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoFunding {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    fn canonical_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

impl FetchHandler for RepoFunding {
    type Output = ();

    fn name(&self) -> &'static str {
        "repo-funding"
    }

    fn request_url(&self, ctx: &HarvestContext) -> String {
        ctx.repos_url(&format!("{}/{}/contents/.github", self.owner, self.repo))
    }

    fn interpret(&self, body: &str) -> Result<Self::Output> {
        let entries: Vec<ContentEntry> =
            serde_json::from_str(body).context("Failed to parse contents listing")?;
        debug!(
            "{}/{} has {} entries under .github",
            self.owner,
            self.repo,
            entries.len()
        );
        Ok(())
    }

    fn merge(&self, _output: &Self::Output, _ctx: &HarvestContext, store: &mut AggregationStore) {
        let dependent_count = store.dependent_count(&self.owner);
        let url = self.canonical_url();

        store.update_repository(&self.owner, &self.repo, |mut repository| {
            repository.url = Some(url);
            repository.dependent_count.get_or_insert(dependent_count);
            repository
        });
    }
}
