use anyhow::{Context, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::debug;

use super::{FetchHandler, HarvestContext};
use crate::github::IssueSummary;
use crate::store::{AggregationStore, Issue};

/// Escaped in query-form labels; `+` is kept as the encoded space
const LABEL_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'+')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Lists a repository's issues carrying one label, created since the
/// run's lookback window
#[derive(Debug, Clone, PartialEq)]
pub struct RepoLabeledIssues {
    pub owner: String,
    pub repo: String,
    /// Label in query form, e.g. `good+first+issue`
    pub label: String,
}

impl RepoLabeledIssues {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, label: impl Into<String>) -> Self {
        RepoLabeledIssues {
            owner: owner.into(),
            repo: repo.into(),
            label: label.into(),
        }
    }
}

/// Label name as shown on GitHub (`good+first+issue` -> `good first issue`)
pub fn human_readable_label(label: &str) -> String {
    label.replace(['_', '+'], " ")
}

impl FetchHandler for RepoLabeledIssues {
    type Output = Vec<IssueSummary>;

    fn name(&self) -> &'static str {
        "labeled-issues"
    }

    fn request_url(&self, ctx: &HarvestContext) -> String {
        ctx.repos_url(&format!(
            "{}/{}/issues?labels={}&since={}&per_page=100",
            self.owner,
            self.repo,
            utf8_percent_encode(&self.label, LABEL_ESCAPES),
            ctx.since
        ))
    }

    fn interpret(&self, body: &str) -> Result<Self::Output> {
        serde_json::from_str(body).context("Failed to parse issue listing")
    }

    fn merge(&self, output: &Self::Output, _ctx: &HarvestContext, store: &mut AggregationStore) {
        let label = human_readable_label(&self.label);
        let issues = output.iter().filter(|summary| !summary.is_pull_request());

        let mut merged = 0;
        for summary in issues {
            store.update_issue(&self.owner, &self.repo, &summary.html_url, |existing| {
                match existing {
                    Some(mut issue) => {
                        if !issue.labels.contains(&label) {
                            issue.labels.push(label.clone());
                        }
                        issue
                    }
                    None => Issue {
                        title: summary.title.clone(),
                        created_at: summary.created_at,
                        creator_url: summary.user.as_ref().and_then(|u| u.html_url.clone()),
                        labels: vec![label.clone()],
                    },
                }
            });
            merged += 1;
        }

        debug!(
            "Merged {} '{}' issues for {}/{}",
            merged, label, self.owner, self.repo
        );
    }
}
