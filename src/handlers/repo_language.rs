use anyhow::{Context, Result};
use tracing::info;

use super::{FetchHandler, FetchRequest, HarvestContext};
use crate::github::RepoMetadata;
use crate::queue::WorkQueue;
use crate::store::AggregationStore;

/// Fetches repository metadata and cancels label searches that cannot find
/// anything (no open issues, or the repository is archived)
#[derive(Debug, Clone, PartialEq)]
pub struct RepoLanguageAndIssues {
    pub owner: String,
    pub repo: String,
}

impl RepoLanguageAndIssues {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoLanguageAndIssues {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl FetchHandler for RepoLanguageAndIssues {
    type Output = RepoMetadata;

    fn name(&self) -> &'static str {
        "repo-language"
    }

    fn request_url(&self, ctx: &HarvestContext) -> String {
        ctx.repos_url(&format!("{}/{}", self.owner, self.repo))
    }

    fn interpret(&self, body: &str) -> Result<Self::Output> {
        serde_json::from_str(body).context("Failed to parse repository metadata")
    }

    fn merge(&self, output: &Self::Output, _ctx: &HarvestContext, store: &mut AggregationStore) {
        store.update_repository(&self.owner, &self.repo, |mut repository| {
            repository.language = output.language.clone();
            repository.open_issues_count = Some(output.open_issues_count);
            repository.archived = output.archived;
            repository
        });
    }

    fn replan(&self, output: &Self::Output, queue: &mut WorkQueue<FetchRequest>) -> usize {
        if output.open_issues_count > 0 && !output.archived {
            return 0;
        }

        let removed =
            queue.remove_matching(|request| request.is_label_request_for(&self.owner, &self.repo));

        if removed > 0 {
            info!(
                "Skipping {} label searches for {}/{} (open issues: {}, archived: {})",
                removed, self.owner, self.repo, output.open_issues_count, output.archived
            );
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::RepoLabeledIssues;
    use crate::test_utils::test_context;

    fn queue_with_labels() -> WorkQueue<FetchRequest> {
        let mut queue = WorkQueue::new();
        for (owner, repo) in [("acme", "widget"), ("acme", "gadget")] {
            for label in ["good+first+issue", "help+wanted"] {
                queue.enqueue(FetchRequest::RepoLabeledIssues(RepoLabeledIssues::new(
                    owner, repo, label,
                )));
            }
        }
        queue.enqueue(FetchRequest::RepoLanguageAndIssues(
            RepoLanguageAndIssues::new("acme", "gadget"),
        ));
        queue
    }

    fn metadata(open_issues_count: u64, archived: bool) -> RepoMetadata {
        RepoMetadata {
            language: Some("Go".to_string()),
            open_issues_count,
            archived,
        }
    }

    #[test]
    fn test_request_url() {
        let handler = RepoLanguageAndIssues::new("acme", "widget");
        assert_eq!(
            handler.request_url(&test_context()),
            "https://api.github.com/repos/acme/widget"
        );
    }

    #[test]
    fn test_interpret() {
        let handler = RepoLanguageAndIssues::new("acme", "widget");
        let meta = handler
            .interpret(r#"{"language":"Go","open_issues_count":0,"archived":false,"stargazers_count":10}"#)
            .unwrap();
        assert_eq!(meta.language.as_deref(), Some("Go"));
        assert_eq!(meta.open_issues_count, 0);
        assert!(!meta.archived);

        let meta = handler.interpret(r#"{"language":null,"open_issues_count":3}"#).unwrap();
        assert_eq!(meta.language, None);
        assert!(!meta.archived);

        assert!(handler.interpret("[]").is_err());
    }

    #[test]
    fn test_merge_sets_fields() {
        let handler = RepoLanguageAndIssues::new("acme", "widget");
        let mut store = AggregationStore::new();

        handler.merge(&metadata(7, true), &test_context(), &mut store);

        let repo = store.repository("acme", "widget").unwrap();
        assert_eq!(repo.language.as_deref(), Some("Go"));
        assert_eq!(repo.open_issues_count, Some(7));
        assert!(repo.archived);
    }

    #[test]
    fn test_no_open_issues_prunes_only_this_repository() {
        let handler = RepoLanguageAndIssues::new("acme", "widget");
        let mut queue = queue_with_labels();

        assert_eq!(handler.replan(&metadata(0, false), &mut queue), 2);

        assert_eq!(queue.len(), 3);
        assert!(queue.iter().all(|r| !r.is_label_request_for("acme", "widget")));
        assert_eq!(
            queue.iter().filter(|r| r.is_label_request_for("acme", "gadget")).count(),
            2
        );
    }

    #[test]
    fn test_archived_prunes_even_with_open_issues() {
        let handler = RepoLanguageAndIssues::new("acme", "widget");
        let mut queue = queue_with_labels();

        assert_eq!(handler.replan(&metadata(12, true), &mut queue), 2);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_active_repository_keeps_queue() {
        let handler = RepoLanguageAndIssues::new("acme", "widget");
        let mut queue = queue_with_labels();

        assert_eq!(handler.replan(&metadata(5, false), &mut queue), 0);
        assert_eq!(queue.len(), 5);
    }
}
