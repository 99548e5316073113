use anyhow::{Context, Result};
use clap::Parser;
use gh_harvest::{
    cache::ResponseCache, cli::Cli, error::user_friendly_error, harvest, Config, HarvestReport,
    Seed,
};
use jiff::Timestamp;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            user_friendly_error(&e).display();
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(verbosity: u8) -> Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    info!("Loading configuration");
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    apply_overrides(&mut config, cli);

    if cli.clear_cache {
        clear_cache(&config)?;
    }

    info!("Loading seed from {:?}", cli.seed);
    let seed = Seed::load(&cli.seed)?;
    println!(
        "✓ Loaded {} repositories from {} owners",
        seed.repository_count(),
        seed.owner_count()
    );

    if cli.dry_run {
        return dry_run(&config, &seed, cli.abbreviated);
    }

    let token = cli
        .token
        .as_deref()
        .context("No GitHub token provided; set GITHUB_TOKEN or pass --token")?;

    println!("📊 Harvesting GitHub data...");
    let output = harvest::run(&config, &seed, cli.abbreviated, token)?;

    let report = HarvestReport::new(&output.store, output.since, Timestamp::now());
    report
        .save(&config.settings.output)
        .context("Failed to save report")?;

    println!("✓ Report saved to: {:?}", config.settings.output);
    println!("{}", report.summary());
    if output.summary.failed > 0 {
        println!(
            "⚠️  {} of {} requests failed, rerun with -v for details",
            output.summary.failed, output.summary.executed
        );
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(output) = &cli.output {
        config.settings.output = output.clone();
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.harvest.request_delay_ms = delay_ms;
    }
    if let Some(lookback) = cli.lookback {
        config.harvest.issue_lookback_days = lookback.as_days();
    }
    if cli.no_cache {
        config.cache.enabled = false;
    }
}

fn dry_run(config: &Config, seed: &Seed, abbreviated: bool) -> Result<()> {
    let context = harvest::harvest_context(config, Timestamp::now())?;
    let requests = harvest::plan(config, seed, abbreviated);

    println!("Would issue {} requests:", requests.len());
    for request in &requests {
        println!("  GET {}", request.request_url(&context));
    }

    Ok(())
}

fn clear_cache(config: &Config) -> Result<()> {
    let dir = match &config.cache.cache_dir {
        Some(dir) => dir.clone(),
        None => ResponseCache::default_dir()?,
    };
    let cache = ResponseCache::new(dir, config.cache.ttl_hours, config.cache.compression_enabled);

    let removed = cache.clear()?;
    println!("✓ Cleared {} cached responses from {:?}", removed, cache.dir());
    Ok(())
}
