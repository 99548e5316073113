use anyhow::{Context, Result};
use jiff::{Timestamp, Unit};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::github::GitHubClient;
use crate::handlers::{
    FetchRequest, HarvestContext, OwnerFunding, Outcome, RepoFunding, RepoLabeledIssues,
    RepoLanguageAndIssues,
};
use crate::queue::WorkQueue;
use crate::seed::Seed;
use crate::store::AggregationStore;
use crate::time::Lookback;

/// Counters for one drain of the work queue
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Requests taken from the queue and issued
    pub executed: usize,
    /// Issued requests whose result was discarded
    pub failed: usize,
    /// Queued requests cancelled before being issued
    pub pruned: usize,
}

/// Drives the work queue against GitHub, one request at a time
pub struct Harvester<'a> {
    client: &'a GitHubClient,
    context: HarvestContext,
    labels: Vec<String>,
    delay: Duration,
    store: AggregationStore,
    queue: WorkQueue<FetchRequest>,
}

impl<'a> Harvester<'a> {
    pub fn new(
        client: &'a GitHubClient,
        context: HarvestContext,
        labels: Vec<String>,
        delay: Duration,
    ) -> Self {
        Harvester {
            client,
            context,
            labels,
            delay,
            store: AggregationStore::new(),
            queue: WorkQueue::new(),
        }
    }

    /// Register the seed in the store and queue every request it implies.
    ///
    /// Per owner: one funding lookup, then per repository the funding probe,
    /// the metadata request, and one issue search per label. The metadata
    /// request is queued ahead of the label searches it may cancel.
    pub fn seed(&mut self, seed: &Seed) {
        plan_requests(seed, &self.labels, &mut self.store, &mut self.queue);
        info!(
            "Queued {} requests for {} owners",
            self.queue.len(),
            self.store.owner_count()
        );
    }

    /// Requests still waiting, front to back
    pub fn pending(&self) -> impl Iterator<Item = &FetchRequest> {
        self.queue.iter()
    }

    /// Drain the queue strictly in order, pausing between requests
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();

        while let Some(request) = self.queue.pop_next() {
            summary.executed += 1;
            debug!(
                "Request {} ({} remaining) for {}",
                summary.executed,
                self.queue.len(),
                request.owner()
            );

            match request.execute(self.client, &self.context, &mut self.store, &mut self.queue) {
                Outcome::Merged { pruned } => summary.pruned += pruned,
                Outcome::Failed => summary.failed += 1,
            }

            if !self.queue.is_empty() && !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
        }

        info!(
            "Harvest finished: {} requests, {} failed, {} skipped",
            summary.executed, summary.failed, summary.pruned
        );
        summary
    }

    pub fn store(&self) -> &AggregationStore {
        &self.store
    }

    pub fn into_store(self) -> AggregationStore {
        self.store
    }
}

fn plan_requests(
    seed: &Seed,
    labels: &[String],
    store: &mut AggregationStore,
    queue: &mut WorkQueue<FetchRequest>,
) {
    for (owner, repos) in seed.owners() {
        for repo in repos {
            store.register_repository(owner, repo);
        }
    }

    for (owner, record) in store.owners() {
        queue.enqueue(FetchRequest::OwnerFunding(OwnerFunding::new(owner)));

        for repo in &record.repositories {
            queue.enqueue(FetchRequest::RepoFunding(RepoFunding::new(owner, repo)));
            queue.enqueue(FetchRequest::RepoLanguageAndIssues(
                RepoLanguageAndIssues::new(owner, repo),
            ));
            for label in labels {
                queue.enqueue(FetchRequest::RepoLabeledIssues(RepoLabeledIssues::new(
                    owner, repo, label,
                )));
            }
        }
    }
}

/// The requests a run would issue, in queue order, without touching the network
pub fn plan(config: &Config, seed: &Seed, abbreviated: bool) -> Vec<FetchRequest> {
    let seed = select_seed(config, seed, abbreviated);
    let mut store = AggregationStore::new();
    let mut queue = WorkQueue::new();
    plan_requests(&seed, &config.harvest.labels, &mut store, &mut queue);
    queue.iter().cloned().collect()
}

fn select_seed(config: &Config, seed: &Seed, abbreviated: bool) -> Seed {
    if abbreviated {
        let limit = config.harvest.abbreviated_limit;
        info!("Abbreviated run: limiting seed to {} owners", limit);
        seed.abbreviate(limit)
    } else {
        seed.clone()
    }
}

/// Result of a complete harvest
#[derive(Debug)]
pub struct HarvestOutput {
    pub store: AggregationStore,
    pub summary: RunSummary,
    pub since: Timestamp,
}

/// Build the transport, seed the queue and drain it.
///
/// `abbreviated` keeps only the first `abbreviated_limit` owners of the seed.
pub fn run(config: &Config, seed: &Seed, abbreviated: bool, token: &str) -> Result<HarvestOutput> {
    let client = GitHubClient::new(token, config.timeout(), config.response_cache()?)
        .context("Failed to create GitHub client")?;

    let context = harvest_context(config, Timestamp::now())?;
    harvest_with(&client, config, seed, abbreviated, context)
}

/// Context for a run starting at `run_start`, with `since` in whole seconds
pub fn harvest_context(config: &Config, run_start: Timestamp) -> Result<HarvestContext> {
    let run_start = run_start
        .round(Unit::Second)
        .context("Failed to round run start time")?;
    let lookback = Lookback::from_days(config.harvest.issue_lookback_days);
    let since = lookback.since(run_start)?;
    Ok(HarvestContext::new(&config.settings.api_base, since))
}

/// Seed and drain against an existing client
pub fn harvest_with(
    client: &GitHubClient,
    config: &Config,
    seed: &Seed,
    abbreviated: bool,
    context: HarvestContext,
) -> Result<HarvestOutput> {
    let seed = select_seed(config, seed, abbreviated);

    let since = context.since;
    let mut harvester = Harvester::new(
        client,
        context,
        config.harvest.labels.clone(),
        config.request_delay(),
    );
    harvester.seed(&seed);
    let summary = harvester.run();

    Ok(HarvestOutput {
        store: harvester.into_store(),
        summary,
        since,
    })
}
