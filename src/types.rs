use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn is_zero(v: &u64) -> bool {
    *v == 0
}

/// Quota snapshot for one GitHub API resource category.
/// Zero-valued fields are omitted on serialization and default to zero on decode.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rate {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub limit: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub remaining: u64,
    /// Epoch seconds at which the window resets.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub reset: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub used: u64,
}

impl Rate {
    pub fn is_empty(&self) -> bool {
        *self == Rate::default()
    }

    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        if self.reset == 0 {
            return None;
        }
        let secs = i64::try_from(self.reset).ok()?;
        DateTime::<Utc>::from_timestamp(secs, 0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resources {
    #[serde(default)]
    pub core: Rate,
    #[serde(default)]
    pub graphql: Rate,
    #[serde(default)]
    pub search: Rate,
    #[serde(default)]
    pub code_search: Rate,
    #[serde(default)]
    pub source_import: Rate,
    #[serde(default)]
    pub integration_manifest: Rate,
    #[serde(default)]
    pub code_scanning_upload: Rate,
    #[serde(default)]
    pub actions_runner_registration: Rate,
    #[serde(default)]
    pub scim: Rate,
    #[serde(default)]
    pub dependency_snapshot: Rate,
}

/// Body of `GET /rate_limit`. Unknown fields are ignored; every `Rate` is
/// always written, as `{}` when it is all zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimitStatus {
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub rate: Rate,
}

impl RateLimitStatus {
    /// One-line summary of the overall and core quotas for logs.
    pub fn summary(&self) -> String {
        let reset = self
            .rate
            .reset_at()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".into());
        format!(
            "rate {}/{} (used {}, resets {}), core {}/{}",
            self.rate.remaining,
            self.rate.limit,
            self.rate.used,
            reset,
            self.resources.core.remaining,
            self.resources.core.limit
        )
    }
}
