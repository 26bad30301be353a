// Live smoke test against real services. Run with:
// LIVE_API_TESTS=1 cargo test --test live_rate_limit_smoke -- --ignored
use github_rate_pubsub::config::{CliOptions, Config};
use github_rate_pubsub::gcp::secret::fetch_secret;
use github_rate_pubsub::http::{build_client, get_rate_limit};

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn should_run_live() -> bool {
    matches!(env_var("LIVE_API_TESTS").as_deref(), Some("1"))
        && env_var("GITHUB_TOKEN_SECRET").is_some()
}

#[ignore]
#[tokio::test]
async fn live_fetch_secret_and_rate_limit() -> anyhow::Result<()> {
    if !should_run_live() {
        eprintln!("skipping live test: LIVE_API_TESTS!=1 or GITHUB_TOKEN_SECRET missing");
        return Ok(());
    }
    // Publishing is left out so the smoke test has no side effects.
    let cli = CliOptions {
        project: Some(env_var("PUBSUB_PROJECT").unwrap_or_else(|| "unused".into())),
        topic: Some(env_var("PUBSUB_TOPIC").unwrap_or_else(|| "unused".into())),
        ..Default::default()
    };
    let cfg = Config::from_env(&cli)?;
    let token = fetch_secret(&cfg, &cfg.secret_name).await?;
    let client = build_client(&cfg)?;
    let status = get_rate_limit(&client, &cfg, token.expose()).await?;
    assert!(status.rate.limit > 0);
    Ok(())
}
