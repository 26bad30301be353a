//! Minimal REST clients for the two Google Cloud services a run touches.
//!
//! Both share how they authenticate: a static access token from the
//! environment when present, otherwise one minted by the metadata server of
//! the instance the job runs on.

pub mod pubsub;
pub mod secret;

use crate::config::Config;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Resolve a Google OAuth access token. The error is a plain message; each
/// caller wraps it into its own error kind.
pub async fn access_token(client: &Client, cfg: &Config) -> Result<String, String> {
    if let Some(token) = &cfg.google_access_token {
        debug!("using access token from GOOGLE_OAUTH_ACCESS_TOKEN");
        return Ok(token.clone());
    }

    let url = format!("http://{}{}", cfg.metadata_host, TOKEN_PATH);
    debug!("requesting access token from metadata server {}", cfg.metadata_host);
    let res = client
        .get(&url)
        .header("Metadata-Flavor", "Google")
        .send()
        .await
        .map_err(|e| format!("metadata server unreachable: {e}"))?;
    let status = res.status();
    if !status.is_success() {
        return Err(format!("metadata server responded {status}"));
    }
    let token: MetadataToken = res
        .json()
        .await
        .map_err(|e| format!("malformed metadata token response: {e}"))?;
    if token.access_token.is_empty() {
        return Err("metadata server returned an empty access token".into());
    }
    debug!("metadata token expires in {:?}s", token.expires_in);
    Ok(token.access_token)
}
