use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Accumulated facts about a repository owner
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Owner {
    pub funding_url: Option<String>,
    /// Repositories of this owner that appear in the seed
    pub repositories: BTreeSet<String>,
}

/// Accumulated facts about a single repository
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Repository {
    pub url: Option<String>,
    /// Snapshot of the owner's known-repository count, taken once
    pub dependent_count: Option<usize>,
    pub language: Option<String>,
    pub open_issues_count: Option<u64>,
    pub archived: bool,
    /// Issues keyed by their canonical URL
    pub issues: BTreeMap<String, Issue>,
}

/// An issue found under one of the relevant labels
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Issue {
    pub title: String,
    pub created_at: Timestamp,
    pub creator_url: Option<String>,
    /// Human-readable label names in first-seen order, without duplicates
    pub labels: Vec<String>,
}

/// Identifies a repository by owner and name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct RepoKey {
    pub owner: String,
    pub repo: String,
}

impl RepoKey {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoKey {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

/// In-memory store every handler merges its results into.
///
/// Records are created on first write from their default value and are never
/// deleted. Owners and repositories are keyed by name and by [`RepoKey`];
/// issues live inside their repository.
#[derive(Debug, Default)]
pub struct AggregationStore {
    owners: BTreeMap<String, Owner>,
    repositories: BTreeMap<RepoKey, Repository>,
}

impl AggregationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the owner record with `mutator(existing or default)`
    pub fn update_owner<F>(&mut self, name: &str, mutator: F)
    where
        F: FnOnce(Owner) -> Owner,
    {
        let current = self.owners.remove(name).unwrap_or_default();
        self.owners.insert(name.to_string(), mutator(current));
    }

    /// Replace the repository record with `mutator(existing or default)`
    pub fn update_repository<F>(&mut self, owner: &str, repo: &str, mutator: F)
    where
        F: FnOnce(Repository) -> Repository,
    {
        let key = RepoKey::new(owner, repo);
        let current = self.repositories.remove(&key).unwrap_or_default();
        self.repositories.insert(key, mutator(current));
    }

    /// Replace the issue record with `mutator(existing)`.
    ///
    /// The mutator sees `None` for an issue URL not recorded yet and decides
    /// itself whether to create a record or extend the existing one. The
    /// enclosing repository is created on demand.
    pub fn update_issue<F>(&mut self, owner: &str, repo: &str, issue_url: &str, mutator: F)
    where
        F: FnOnce(Option<Issue>) -> Issue,
    {
        self.update_repository(owner, repo, |mut repository| {
            let existing = repository.issues.remove(issue_url);
            repository
                .issues
                .insert(issue_url.to_string(), mutator(existing));
            repository
        });
    }

    /// Record that `repo` belongs to `owner`
    pub fn register_repository(&mut self, owner: &str, repo: &str) {
        self.update_owner(owner, |mut record| {
            record.repositories.insert(repo.to_string());
            record
        });
    }

    /// Number of repositories currently known for `owner`
    pub fn dependent_count(&self, owner: &str) -> usize {
        self.owners
            .get(owner)
            .map(|record| record.repositories.len())
            .unwrap_or(0)
    }

    pub fn owner(&self, name: &str) -> Option<&Owner> {
        self.owners.get(name)
    }

    pub fn repository(&self, owner: &str, repo: &str) -> Option<&Repository> {
        self.repositories.get(&RepoKey::new(owner, repo))
    }

    /// Owners sorted by name
    pub fn owners(&self) -> impl Iterator<Item = (&str, &Owner)> {
        self.owners.iter().map(|(name, owner)| (name.as_str(), owner))
    }

    /// Repositories of one owner, sorted by name
    pub fn repositories_of<'a>(
        &'a self,
        owner: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Repository)> + 'a {
        self.repositories
            .iter()
            .filter(move |(key, _)| key.owner == owner)
            .map(|(key, repository)| (key.repo.as_str(), repository))
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn repository_count(&self) -> usize {
        self.repositories.len()
    }

    pub fn issue_count(&self) -> usize {
        self.repositories.values().map(|r| r.issues.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(title: &str, label: &str) -> Issue {
        Issue {
            title: title.to_string(),
            created_at: "2024-03-01T10:00:00Z".parse().unwrap(),
            creator_url: None,
            labels: vec![label.to_string()],
        }
    }

    #[test]
    fn test_update_owner_creates_default() {
        let mut store = AggregationStore::new();
        store.update_owner("acme", |mut owner| {
            owner.funding_url = Some("https://x/FUNDING.yml".to_string());
            owner
        });

        let owner = store.owner("acme").unwrap();
        assert_eq!(owner.funding_url.as_deref(), Some("https://x/FUNDING.yml"));
        assert!(owner.repositories.is_empty());
    }

    #[test]
    fn test_update_repository_is_idempotent() {
        let mut store = AggregationStore::new();
        let set_language = |mut repo: Repository| {
            repo.language = Some("Rust".to_string());
            repo.open_issues_count = Some(4);
            repo
        };

        store.update_repository("acme", "widget", set_language);
        let first = store.repository("acme", "widget").cloned();
        store.update_repository("acme", "widget", set_language);

        assert_eq!(store.repository("acme", "widget").cloned(), first);
        assert_eq!(store.repository_count(), 1);
    }

    #[test]
    fn test_update_issue_sees_existing_record() {
        let mut store = AggregationStore::new();
        let url = "https://github.com/acme/widget/issues/1";

        store.update_issue("acme", "widget", url, |existing| {
            assert!(existing.is_none());
            issue("Broken build", "help wanted")
        });
        store.update_issue("acme", "widget", url, |existing| {
            let mut record = existing.expect("issue should exist");
            record.labels.push("documentation".to_string());
            record
        });

        let repo = store.repository("acme", "widget").unwrap();
        assert_eq!(repo.issues.len(), 1);
        assert_eq!(repo.issues[url].labels, vec!["help wanted", "documentation"]);
        assert_eq!(store.issue_count(), 1);
    }

    #[test]
    fn test_dependent_count_tracks_registered_repositories() {
        let mut store = AggregationStore::new();
        assert_eq!(store.dependent_count("acme"), 0);

        store.register_repository("acme", "widget");
        store.register_repository("acme", "gadget");
        store.register_repository("acme", "widget");

        assert_eq!(store.dependent_count("acme"), 2);
        assert_eq!(store.dependent_count("other"), 0);
    }

    #[test]
    fn test_owners_iterate_sorted() {
        let mut store = AggregationStore::new();
        store.register_repository("zeta", "a");
        store.register_repository("alpha", "b");
        store.register_repository("mid", "c");

        let names: Vec<_> = store.owners().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_repositories_of_filters_by_owner() {
        let mut store = AggregationStore::new();
        store.update_repository("acme", "widget", |r| r);
        store.update_repository("acme", "gadget", |r| r);
        store.update_repository("other", "thing", |r| r);

        let repos: Vec<_> = store.repositories_of("acme").map(|(name, _)| name).collect();
        assert_eq!(repos, vec!["gadget", "widget"]);
    }
}
