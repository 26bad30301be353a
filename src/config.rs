use crate::error::{Error, Result};
use reqwest::header::HeaderValue;
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_API_VERSION: &str = "2022-11-28";
pub const DEFAULT_SECRET_MANAGER_URL: &str = "https://secretmanager.googleapis.com";
pub const DEFAULT_PUBSUB_URL: &str = "https://pubsub.googleapis.com";
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

/// Values supplied on the command line; `None` falls back to the environment.
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub secret: Option<String>,
    pub project: Option<String>,
    pub topic: Option<String>,
    pub timeout_secs: Option<u64>,
    pub http_timeout_secs: Option<u64>,
    pub decode_non_success: bool,
}

/// Runtime configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub secret_name: String,
    pub project_id: String,
    pub topic_id: String,
    pub github_api_url: String,
    pub api_version: String,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    pub run_timeout_secs: u64,
    pub decode_non_success: bool,
    pub secret_manager_url: String,
    pub pubsub_url: String,
    /// Set when talking to the Pub/Sub emulator; no credentials are sent.
    pub pubsub_emulator: bool,
    pub google_access_token: Option<String>,
    pub metadata_host: String,
}

impl Config {
    /// Load configuration from flags and process environment.
    ///
    /// Env vars:
    /// - GITHUB_TOKEN_SECRET, PUBSUB_PROJECT, PUBSUB_TOPIC [required unless given as flags]
    /// - GITHUB_API_URL (default: https://api.github.com)
    /// - GITHUB_API_VERSION (default: 2022-11-28)
    /// - GITHUB_USER_AGENT (default: github-rate-pubsub/<version>)
    /// - GITHUB_HTTP_TIMEOUT_SECS (default: 30)
    /// - RUN_TIMEOUT_SECS (default: 120)
    /// - GITHUB_DECODE_NON_SUCCESS (default: false)
    /// - SECRET_MANAGER_URL, PUBSUB_API_URL, PUBSUB_EMULATOR_HOST
    /// - GOOGLE_OAUTH_ACCESS_TOKEN, GCE_METADATA_HOST
    pub fn from_env(cli: &CliOptions) -> Result<Self> {
        Self::resolve(cli, |key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable lookup.
    pub fn resolve<F>(cli: &CliOptions, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |flag: &Option<String>, key: &str, what: &str| {
            flag.clone()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| var(key))
                .ok_or_else(|| Error::Config(format!("missing {what} (--{} or {key})", flag_name(key))))
        };

        let secret_name = required(&cli.secret, "GITHUB_TOKEN_SECRET", "secret name")?;
        let project_id = required(&cli.project, "PUBSUB_PROJECT", "project id")?;
        let topic_id = required(&cli.topic, "PUBSUB_TOPIC", "topic id")?;

        let github_api_url = validated_url(
            "GITHUB_API_URL",
            var("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
        )?;
        let api_version =
            var("GITHUB_API_VERSION").unwrap_or_else(|| DEFAULT_GITHUB_API_VERSION.to_string());
        let user_agent = var("GITHUB_USER_AGENT").unwrap_or_else(|| {
            format!("github-rate-pubsub/{}", env!("CARGO_PKG_VERSION"))
        });
        HeaderValue::from_str(&user_agent)
            .map_err(|e| Error::Config(format!("GITHUB_USER_AGENT is not a valid header value: {e}")))?;

        let http_timeout_secs = match cli.http_timeout_secs {
            Some(v) => v,
            None => parse_secs(&var, "GITHUB_HTTP_TIMEOUT_SECS", 30)?,
        };
        let run_timeout_secs = match cli.timeout_secs {
            Some(v) => v,
            None => parse_secs(&var, "RUN_TIMEOUT_SECS", 120)?,
        };
        if http_timeout_secs == 0 || run_timeout_secs == 0 {
            return Err(Error::Config("timeouts must be greater than zero".into()));
        }

        let decode_non_success = cli.decode_non_success
            || matches!(
                var("GITHUB_DECODE_NON_SUCCESS").as_deref(),
                Some("1" | "true" | "yes")
            );

        let secret_manager_url = validated_url(
            "SECRET_MANAGER_URL",
            var("SECRET_MANAGER_URL").unwrap_or_else(|| DEFAULT_SECRET_MANAGER_URL.to_string()),
        )?;
        let (pubsub_url, pubsub_emulator) = match var("PUBSUB_EMULATOR_HOST") {
            Some(host) => (format!("http://{}", host.trim()), true),
            None => (
                var("PUBSUB_API_URL").unwrap_or_else(|| DEFAULT_PUBSUB_URL.to_string()),
                false,
            ),
        };
        let pubsub_url = validated_url("PUBSUB_API_URL", pubsub_url)?;

        Ok(Self {
            secret_name,
            project_id,
            topic_id,
            github_api_url,
            api_version,
            user_agent,
            http_timeout_secs,
            run_timeout_secs,
            decode_non_success,
            secret_manager_url,
            pubsub_url,
            pubsub_emulator,
            google_access_token: var("GOOGLE_OAUTH_ACCESS_TOKEN"),
            metadata_host: var("GCE_METADATA_HOST")
                .unwrap_or_else(|| DEFAULT_METADATA_HOST.to_string()),
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

fn flag_name(key: &str) -> &'static str {
    match key {
        "GITHUB_TOKEN_SECRET" => "secret",
        "PUBSUB_PROJECT" => "project",
        _ => "topic",
    }
}

fn parse_secs<F>(var: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::Config(format!("{key} must be a number of seconds, got {raw:?}"))),
        None => Ok(default),
    }
}

// Stored without a trailing slash so paths can be appended directly.
fn validated_url(key: &str, raw: String) -> Result<String> {
    let parsed =
        Url::parse(&raw).map_err(|e| Error::Config(format!("{key} is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!("{key} must be an http(s) URL")));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
