use anyhow::Result;
use gh_harvest::{harvest, AggregationStore, Config, HarvestReport, Seed, WorkQueue};
use std::path::PathBuf;
use tempfile::TempDir;

// Runs against GitHub need the mock transport, which is only available to
// unit tests; these cover the offline pieces through the public API.

fn seed_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/seeds/dependencies.toml")
}

/// Test seed loading from the fixture file
#[test]
fn test_seed_loading() -> Result<()> {
    let seed = Seed::load(&seed_fixture())?;

    assert_eq!(seed.owner_count(), 2);
    assert_eq!(seed.repository_count(), 4);

    let owners: Vec<&str> = seed.owners().map(|(owner, _)| owner).collect();
    assert_eq!(owners, vec!["serde-rs", "tokio-rs"]);

    Ok(())
}

/// Test that the dry-run plan follows the seed order
#[test]
fn test_plan_from_seed() -> Result<()> {
    let mut config = Config::default();
    config.harvest.labels = vec!["help+wanted".to_string()];
    let seed = Seed::load(&seed_fixture())?;
    let context = harvest::harvest_context(&config, "2025-06-01T12:00:00Z".parse()?)?;

    let urls: Vec<String> = harvest::plan(&config, &seed, true)
        .iter()
        .map(|request| request.request_url(&context))
        .collect();

    assert_eq!(
        urls,
        vec![
            "https://api.github.com/repos/serde-rs/.github/contents/",
            "https://api.github.com/repos/serde-rs/json/contents/.github",
            "https://api.github.com/repos/serde-rs/json",
            "https://api.github.com/repos/serde-rs/json/issues?labels=help+wanted&since=2024-06-01T12:00:00Z&per_page=100",
            "https://api.github.com/repos/serde-rs/serde/contents/.github",
            "https://api.github.com/repos/serde-rs/serde",
            "https://api.github.com/repos/serde-rs/serde/issues?labels=help+wanted&since=2024-06-01T12:00:00Z&per_page=100",
            "https://api.github.com/repos/tokio-rs/.github/contents/",
            "https://api.github.com/repos/tokio-rs/bytes/contents/.github",
            "https://api.github.com/repos/tokio-rs/bytes",
            "https://api.github.com/repos/tokio-rs/bytes/issues?labels=help+wanted&since=2024-06-01T12:00:00Z&per_page=100",
            "https://api.github.com/repos/tokio-rs/tokio/contents/.github",
            "https://api.github.com/repos/tokio-rs/tokio",
            "https://api.github.com/repos/tokio-rs/tokio/issues?labels=help+wanted&since=2024-06-01T12:00:00Z&per_page=100",
        ]
    );

    Ok(())
}

/// Test configuration loading with partial overrides
#[test]
fn test_config_file_overrides() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
[settings]
api_base = "https://ghe.example.com/api/v3"

[harvest]
labels = ["bug"]
request_delay_ms = 50
"#,
    )?;

    let config = Config::load(Some(&config_path))?;
    assert_eq!(config.settings.api_base, "https://ghe.example.com/api/v3");
    assert_eq!(config.harvest.labels, vec!["bug"]);
    assert_eq!(config.harvest.request_delay_ms, 50);
    assert_eq!(config.harvest.issue_lookback_days, 365);
    assert!(!config.cache.enabled);

    Ok(())
}

/// Test the work queue through the public API
#[test]
fn test_work_queue() {
    let mut queue = WorkQueue::new();
    for n in 1..=5 {
        queue.enqueue(n);
    }

    assert_eq!(queue.remove_matching(|n| n % 2 == 0), 2);
    assert_eq!(queue.pop_next(), Some(1));
    assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![3, 5]);
}

/// Test report export from a hand-built store
#[test]
fn test_report_export() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("out").join("report.json");

    let mut store = AggregationStore::new();
    store.register_repository("acme", "widget");
    store.update_repository("acme", "widget", |mut repo| {
        repo.language = Some("Rust".to_string());
        repo
    });

    let report = HarvestReport::new(
        &store,
        "2024-06-01T12:00:00Z".parse()?,
        "2025-06-01T12:00:00Z".parse()?,
    );
    report.save(&output)?;

    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output)?)?;
    assert_eq!(written["owners"]["acme"]["repositories"]["widget"]["language"], "Rust");
    assert_eq!(written["generated_at"], "2025-06-01T12:00:00Z");

    Ok(())
}

/// Test error handling
#[test]
fn test_error_handling() {
    use anyhow::anyhow;
    use gh_harvest::error::user_friendly_error;

    let error = anyhow!("No GitHub token provided; set GITHUB_TOKEN or pass --token");
    assert_eq!(user_friendly_error(&error).message(), "GitHub token not configured");

    let error = anyhow!("GitHub API error: API rate limit exceeded for 203.0.113.7.");
    assert_eq!(user_friendly_error(&error).message(), "API rate limit exceeded");
}
