#![allow(dead_code)]

use github_rate_pubsub::config::{CliOptions, Config};
use httpmock::MockServer;
use std::collections::HashMap;

pub const SECRET: &str = "projects/p/secrets/gh-token/versions/latest";
pub const RATE_BODY: &str = r#"{"resources":{"core":{"limit":5000,"remaining":4999,"reset":1700000000,"used":1}},"rate":{"limit":5000,"remaining":4999,"reset":1700000000,"used":1}}"#;

/// Config with every service pointed at `server` and a static Google token.
pub fn config_for(server: &MockServer, extra: &[(&str, &str)]) -> Config {
    let base = server.base_url();
    let mut vars: HashMap<String, String> = [
        ("GITHUB_TOKEN_SECRET", SECRET),
        ("PUBSUB_PROJECT", "p"),
        ("PUBSUB_TOPIC", "rate"),
        ("GITHUB_API_URL", base.as_str()),
        ("SECRET_MANAGER_URL", base.as_str()),
        ("PUBSUB_API_URL", base.as_str()),
        ("GOOGLE_OAUTH_ACCESS_TOKEN", "gcp-token"),
        ("GITHUB_HTTP_TIMEOUT_SECS", "5"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::resolve(&CliOptions::default(), |k: &str| vars.get(k).cloned()).unwrap()
}

pub fn b64(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
