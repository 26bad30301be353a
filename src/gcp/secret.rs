use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::{bearer, build_client};
use base64::Engine;
use log::{debug, info};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;

/// Secret value held in memory only. Formatting never reveals it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value. Callers must not log it.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"<redacted>").finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    #[serde(default)]
    name: Option<String>,
    payload: Option<SecretPayload>,
}

#[derive(Debug, Deserialize)]
struct SecretPayload {
    #[serde(default)]
    data: String,
}

/// Expand a secret name to a version resource; names without a version use `latest`.
pub fn version_name(name: &str) -> Result<String> {
    let name = name.trim().trim_matches('/');
    let parts: Vec<&str> = name.split('/').collect();
    let valid = parts.len() >= 4
        && parts[0] == "projects"
        && parts[2] == "secrets"
        && parts.iter().all(|p| !p.is_empty());
    if !valid {
        return Err(Error::SecretAccess(format!(
            "{name:?} is not a secret resource name (projects/<p>/secrets/<s>[/versions/<v>])"
        )));
    }
    match parts.len() {
        4 => Ok(format!("{name}/versions/latest")),
        6 if parts[4] == "versions" => Ok(name.to_string()),
        _ => Err(Error::SecretAccess(format!(
            "{name:?} is not a secret resource name (projects/<p>/secrets/<s>[/versions/<v>])"
        ))),
    }
}

/// Session against Secret Manager, authenticated once at connect time.
pub struct SecretManagerClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl SecretManagerClient {
    pub async fn connect(cfg: &Config) -> Result<Self> {
        let client = build_client(cfg)
            .map_err(|e| Error::SecretAccess(format!("could not build client: {e}")))?;
        let access_token = super::access_token(&client, cfg)
            .await
            .map_err(Error::SecretAccess)?;
        Ok(Self {
            client,
            base_url: cfg.secret_manager_url.clone(),
            access_token,
        })
    }

    /// Access the payload of one secret version and return it as text, byte for byte.
    pub async fn access(&self, name: &str) -> Result<Credential> {
        let name = version_name(name)?;
        let url = format!("{}/v1/{}:access", self.base_url, name);
        debug!("GET {}", url);
        let auth = bearer(&self.access_token)
            .map_err(|_| Error::SecretAccess("access token is not a valid header value".into()))?;
        let res = self
            .client
            .get(&url)
            .header(AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| Error::SecretAccess(format!("request failed: {e}")))?;

        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(|e| Error::SecretAccess(format!("reading response failed: {e}")))?;
        if !status.is_success() {
            return Err(Error::SecretAccess(format!(
                "{name} responded {status}: {}",
                String::from_utf8_lossy(&body)
            )));
        }

        let parsed: AccessSecretVersionResponse = serde_json::from_slice(&body)
            .map_err(|e| Error::SecretAccess(format!("malformed response: {e}")))?;
        let payload = parsed
            .payload
            .ok_or_else(|| Error::SecretAccess(format!("{name} has no payload")))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.data.as_bytes())
            .map_err(|e| Error::SecretAccess(format!("payload is not base64: {e}")))?;
        let value = String::from_utf8(bytes)
            .map_err(|_| Error::SecretAccess(format!("{name} payload is not UTF-8")))?;

        info!(
            "fetched secret {}",
            parsed.name.as_deref().unwrap_or(name.as_str())
        );
        Ok(Credential::new(value))
    }
}

/// Connect and access `secret_name` in one step.
pub async fn fetch_secret(cfg: &Config, secret_name: &str) -> Result<Credential> {
    let client = SecretManagerClient::connect(cfg).await?;
    client.access(secret_name).await
}
