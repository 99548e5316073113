use clap::Parser;
use std::path::PathBuf;

use crate::time::Lookback;

#[derive(Parser, Debug)]
#[command(
    name = "gh-harvest",
    about = "Collect funding, language and open-issue data for the maintainers of your dependencies",
    version,
    author
)]
pub struct Cli {
    /// TOML file listing dependency repositories
    #[arg(short, long, value_name = "FILE")]
    pub seed: PathBuf,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to configuration file
    #[arg(short, long, env = "GH_HARVEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only process the first few owners of the seed
    #[arg(long)]
    pub abbreviated: bool,

    /// Override the report output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the pause between requests, in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Override how far back to search for issues (e.g. 90, 30d, 12w)
    #[arg(long)]
    pub lookback: Option<Lookback>,

    /// List the requests that would be made without contacting GitHub
    #[arg(long)]
    pub dry_run: bool,

    /// Bypass the response cache
    #[arg(long)]
    pub no_cache: bool,

    /// Clear all cached responses before running
    #[arg(long)]
    pub clear_cache: bool,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
