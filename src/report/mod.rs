use anyhow::{Context, Result};
use jiff::Timestamp;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::store::{AggregationStore, Repository};

/// Export view of the aggregation store, grouped by owner
#[derive(Debug, Serialize)]
pub struct HarvestReport<'a> {
    pub generated_at: Timestamp,
    /// Lower bound used for issue searches
    pub since: Timestamp,
    pub owners: BTreeMap<&'a str, OwnerReport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct OwnerReport<'a> {
    pub funding_url: Option<&'a str>,
    pub repositories: BTreeMap<&'a str, &'a Repository>,
}

impl<'a> HarvestReport<'a> {
    pub fn new(store: &'a AggregationStore, since: Timestamp, generated_at: Timestamp) -> Self {
        let owners = store
            .owners()
            .map(|(name, owner)| {
                let report = OwnerReport {
                    funding_url: owner.funding_url.as_deref(),
                    repositories: store.repositories_of(name).collect(),
                };
                (name, report)
            })
            .collect();

        HarvestReport {
            generated_at,
            since,
            owners,
        }
    }

    /// Pretty-printed JSON document
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report")
    }

    /// Write the JSON document to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create report directory: {:?}", parent))?;
        }

        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write report to {:?}", path))?;

        Ok(())
    }

    /// Short plain-text overview of the harvested data
    pub fn summary(&self) -> String {
        let funded = self
            .owners
            .values()
            .filter(|owner| owner.funding_url.is_some())
            .count();
        let repositories: Vec<&Repository> = self
            .owners
            .values()
            .flat_map(|owner| owner.repositories.values().copied())
            .collect();
        let archived = repositories.iter().filter(|r| r.archived).count();
        let issues: usize = repositories.iter().map(|r| r.issues.len()).sum();

        format!(
            "owners: {} ({} with funding)\nrepositories: {} ({} archived)\nissues: {}",
            self.owners.len(),
            funded,
            repositories.len(),
            archived,
            issues
        )
    }
}
