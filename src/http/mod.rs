use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::RateLimitStatus;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};

pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";
pub const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

/// Rate figures GitHub reports in response headers for the request itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateMeta {
    pub remaining: Option<i64>,
    pub used: Option<i64>,
    pub reset_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

/// Client with the run's User-Agent and per-request timeout. Each step
/// (GitHub, Secret Manager, Pub/Sub) builds its own.
pub fn build_client(cfg: &Config) -> Result<Client> {
    let mut default_headers = HeaderMap::new();
    let ua = HeaderValue::from_str(&cfg.user_agent)
        .map_err(|e| Error::Config(format!("invalid user agent: {e}")))?;
    default_headers.insert(USER_AGENT, ua);
    // Authorization differs per service, so it is set per request.
    Client::builder()
        .default_headers(default_headers)
        .timeout(cfg.http_timeout())
        .use_rustls_tls()
        .build()
        .map_err(Error::Network)
}

pub fn bearer(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| Error::RequestConstruction("token is not a valid header value".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

pub fn map_status_to_error(status: StatusCode, message: String) -> ErrorInfo {
    let code = match status {
        StatusCode::BAD_REQUEST => "bad_request",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::CONFLICT => "conflict",
        StatusCode::TOO_MANY_REQUESTS => "rate_limited",
        s if s.is_server_error() => "upstream_error",
        _ => "unexpected_status",
    };
    ErrorInfo {
        code: code.to_string(),
        message,
    }
}

pub fn extract_rate_from_rest(headers: &HeaderMap) -> RateMeta {
    let number = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<i64>().ok())
    };
    let reset_at = number("x-ratelimit-reset")
        .and_then(|epoch| chrono::DateTime::<chrono::Utc>::from_timestamp(epoch, 0))
        .map(|t| t.to_rfc3339());
    RateMeta {
        remaining: number("x-ratelimit-remaining"),
        used: number("x-ratelimit-used"),
        reset_at,
    }
}

/// `GET /rate_limit` with the caller's bearer token.
///
/// Non-2xx responses fail with [`Error::HttpStatus`] unless
/// `cfg.decode_non_success` is set, in which case the body is decoded anyway.
/// The response is consumed on every path so the connection goes back to the pool.
pub async fn get_rate_limit(client: &Client, cfg: &Config, token: &str) -> Result<RateLimitStatus> {
    if token.trim().is_empty() {
        return Err(Error::RequestConstruction("empty bearer token".into()));
    }
    let url = format!("{}/rate_limit", cfg.github_api_url);
    let request = client
        .get(&url)
        .header(AUTHORIZATION, bearer(token)?)
        .header(API_VERSION_HEADER, cfg.api_version.as_str())
        .header(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT))
        .build()
        .map_err(|e| Error::RequestConstruction(e.to_string()))?;

    debug!("GET {}", url);
    let res = client.execute(request).await.map_err(Error::Network)?;
    let status = res.status();
    let rate = extract_rate_from_rest(res.headers());
    debug!(
        "rate headers: remaining={:?} used={:?} reset_at={:?}",
        rate.remaining, rate.used, rate.reset_at
    );

    let body = res.bytes().await.map_err(Error::Network)?;
    if !status.is_success() {
        if !cfg.decode_non_success {
            let info = map_status_to_error(status, String::from_utf8_lossy(&body).into_owned());
            return Err(Error::HttpStatus {
                status,
                code: info.code,
                message: info.message,
            });
        }
        warn!("GET {} returned {}; decoding body anyway", url, status);
    }
    serde_json::from_slice(&body).map_err(Error::Decode)
}
