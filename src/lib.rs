pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod handlers;
pub mod harvest;
pub mod queue;
pub mod report;
pub mod seed;
pub mod store;
pub mod time;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use harvest::{Harvester, RunSummary};
pub use queue::WorkQueue;
pub use report::HarvestReport;
pub use seed::Seed;
pub use store::AggregationStore;
