use crate::config::Config;
use crate::error::{Error, Result};
use crate::gcp::{pubsub, secret};
use crate::http;
use crate::types::RateLimitStatus;
use log::info;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub status: RateLimitStatus,
    pub message_id: pubsub::MessageId,
}

/// fetch secret → query rate limit → serialize → publish. Stops at the first error.
pub async fn run(cfg: &Config) -> Result<Outcome> {
    let token = secret::fetch_secret(cfg, &cfg.secret_name).await?;

    let client = http::build_client(cfg)?;
    let status = http::get_rate_limit(&client, cfg, token.expose()).await?;
    info!("Rate Limit: {}", status.summary());

    let payload = serde_json::to_vec(&status).map_err(Error::Encode)?;
    let message_id = pubsub::publish(cfg, &cfg.project_id, &cfg.topic_id, &payload).await?;

    Ok(Outcome { status, message_id })
}

/// [`run`] bounded by the configured deadline and cancelled on Ctrl-C.
/// Whatever is in flight when either fires is dropped.
pub async fn run_with_deadline(cfg: &Config) -> Result<Outcome> {
    tokio::select! {
        res = tokio::time::timeout(cfg.run_timeout(), run(cfg)) => {
            res.map_err(|_| Error::Timeout(cfg.run_timeout_secs))?
        }
        // Disabled if the handler cannot be installed.
        Ok(()) = tokio::signal::ctrl_c() => Err(Error::Interrupted),
    }
}
