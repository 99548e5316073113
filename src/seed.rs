use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{info, warn};

use crate::github::RepoSlug;

/// On-disk seed format
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SeedFile {
    /// Repository references (`owner/repo` or GitHub URLs)
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Owners to harvest, each with the repositories that depend on them,
/// both in sorted order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Seed {
    owners: BTreeMap<String, BTreeSet<String>>,
}

impl Seed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a seed from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {:?}", path))?;

        let file: SeedFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse seed file {:?}", path))?;

        let seed = Self::from_references(file.dependencies.iter().map(String::as_str));
        info!(
            "Loaded seed with {} owners and {} repositories",
            seed.owner_count(),
            seed.repository_count()
        );
        Ok(seed)
    }

    /// Build a seed from repository references, skipping the ones that do
    /// not parse
    pub fn from_references<'a>(references: impl IntoIterator<Item = &'a str>) -> Self {
        let mut seed = Seed::new();
        for reference in references {
            match reference.parse::<RepoSlug>() {
                Ok(slug) => seed.insert(slug),
                Err(e) => warn!("Skipping seed entry {:?}: {}", reference, e),
            }
        }
        seed
    }

    pub fn insert(&mut self, slug: RepoSlug) {
        self.owners.entry(slug.owner).or_default().insert(slug.repo);
    }

    /// Keep only the first `limit` owners
    pub fn abbreviate(&self, limit: usize) -> Self {
        Seed {
            owners: self
                .owners
                .iter()
                .take(limit)
                .map(|(owner, repos)| (owner.clone(), repos.clone()))
                .collect(),
        }
    }

    /// Owners and their repositories, sorted by name
    pub fn owners(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.owners.iter().map(|(owner, repos)| (owner.as_str(), repos))
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn repository_count(&self) -> usize {
        self.owners.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
