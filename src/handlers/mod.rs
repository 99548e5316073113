//! Fetch handlers.
//!
//! Each handler knows how to build its request URL, interpret the response
//! body, merge the result into the [`AggregationStore`] and, optionally,
//! re-plan the pending [`WorkQueue`]. [`FetchRequest`] is the closed set of
//! handlers that can sit in the queue; [`execute`] runs one of them through
//! the shared fetch cycle.

use anyhow::Result;
use jiff::Timestamp;
use tracing::{debug, warn};

use crate::github::{check_api_error, GitHubClient};
use crate::queue::WorkQueue;
use crate::store::AggregationStore;

mod labeled_issues;
mod owner_funding;
mod repo_funding;
mod repo_language;

pub use labeled_issues::{human_readable_label, RepoLabeledIssues};
pub use owner_funding::OwnerFunding;
pub use repo_funding::RepoFunding;
pub use repo_language::RepoLanguageAndIssues;

/// Values shared by every request of a run
#[derive(Debug, Clone)]
pub struct HarvestContext {
    /// REST base URL without trailing slash
    pub api_base: String,
    /// Lower bound for labeled issue searches
    pub since: Timestamp,
}

impl HarvestContext {
    pub fn new(api_base: &str, since: Timestamp) -> Self {
        HarvestContext {
            api_base: api_base.trim_end_matches('/').to_string(),
            since,
        }
    }

    /// `{api_base}/repos/{path}`
    pub fn repos_url(&self, path: &str) -> String {
        format!("{}/repos/{}", self.api_base, path)
    }
}

/// One kind of API request and what to do with its answer
pub trait FetchHandler {
    type Output;

    /// Name used in log lines
    fn name(&self) -> &'static str;

    fn request_url(&self, ctx: &HarvestContext) -> String;

    /// Parse a response body that is known not to be an API error object
    fn interpret(&self, body: &str) -> Result<Self::Output>;

    fn merge(&self, output: &Self::Output, ctx: &HarvestContext, store: &mut AggregationStore);

    /// Adjust the pending queue in light of `output`; returns how many
    /// queued requests were removed
    fn replan(&self, _output: &Self::Output, _queue: &mut WorkQueue<FetchRequest>) -> usize {
        0
    }
}

/// A request waiting in the work queue
#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    OwnerFunding(OwnerFunding),
    RepoFunding(RepoFunding),
    RepoLanguageAndIssues(RepoLanguageAndIssues),
    RepoLabeledIssues(RepoLabeledIssues),
}

impl FetchRequest {
    pub fn owner(&self) -> &str {
        match self {
            FetchRequest::OwnerFunding(h) => &h.owner,
            FetchRequest::RepoFunding(h) => &h.owner,
            FetchRequest::RepoLanguageAndIssues(h) => &h.owner,
            FetchRequest::RepoLabeledIssues(h) => &h.owner,
        }
    }

    /// Whether this is a labeled-issue request for `owner/repo`
    pub fn is_label_request_for(&self, owner: &str, repo: &str) -> bool {
        matches!(self, FetchRequest::RepoLabeledIssues(h) if h.owner == owner && h.repo == repo)
    }

    pub fn request_url(&self, ctx: &HarvestContext) -> String {
        match self {
            FetchRequest::OwnerFunding(h) => h.request_url(ctx),
            FetchRequest::RepoFunding(h) => h.request_url(ctx),
            FetchRequest::RepoLanguageAndIssues(h) => h.request_url(ctx),
            FetchRequest::RepoLabeledIssues(h) => h.request_url(ctx),
        }
    }

    /// Run the full fetch → merge → replan cycle for this request
    pub fn execute(
        &self,
        client: &GitHubClient,
        ctx: &HarvestContext,
        store: &mut AggregationStore,
        queue: &mut WorkQueue<FetchRequest>,
    ) -> Outcome {
        match self {
            FetchRequest::OwnerFunding(h) => execute(h, client, ctx, store, queue),
            FetchRequest::RepoFunding(h) => execute(h, client, ctx, store, queue),
            FetchRequest::RepoLanguageAndIssues(h) => execute(h, client, ctx, store, queue),
            FetchRequest::RepoLabeledIssues(h) => execute(h, client, ctx, store, queue),
        }
    }
}

/// What happened to one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The result was merged; `pruned` queued requests were cancelled
    Merged { pruned: usize },
    /// The request failed and was skipped
    Failed,
}

/// Fetch, interpret, merge and replan for a single handler.
///
/// Every failure (transport, API error body, unexpected shape) is logged and
/// turns into [`Outcome::Failed`]; the store and queue are left untouched.
pub fn execute<H: FetchHandler>(
    handler: &H,
    client: &GitHubClient,
    ctx: &HarvestContext,
    store: &mut AggregationStore,
    queue: &mut WorkQueue<FetchRequest>,
) -> Outcome {
    let url = handler.request_url(ctx);
    debug!("{}: GET {}", handler.name(), url);

    let output = match fetch(handler, client, &url) {
        Ok(output) => output,
        Err(e) => {
            warn!("{} request failed for {}: {:#}", handler.name(), url, e);
            return Outcome::Failed;
        }
    };

    handler.merge(&output, ctx, store);
    let pruned = handler.replan(&output, queue);

    Outcome::Merged { pruned }
}

fn fetch<H: FetchHandler>(handler: &H, client: &GitHubClient, url: &str) -> Result<H::Output> {
    let body = client.get(url)?;
    check_api_error(&body)?;
    handler.interpret(&body)
}
