use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure a run can end with. All of them are terminal.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("secret access failed: {0}")]
    SecretAccess(String),

    #[error("could not build request: {0}")]
    RequestConstruction(String),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("GitHub responded {status} ({code}): {message}")]
    HttpStatus {
        status: StatusCode,
        code: String,
        message: String,
    },

    #[error("could not decode rate limit response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("could not encode rate limit status: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("pubsub client init failed: {0}")]
    ClientInit(String),

    #[error("topic not found: {0}")]
    TopicNotFound(String),

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("run exceeded deadline of {0}s")]
    Timeout(u64),

    #[error("interrupted")]
    Interrupted,
}

impl Error {
    /// Process exit status for this error; each kind gets its own code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Config(_) => 2,
            Error::SecretAccess(_) => 3,
            Error::RequestConstruction(_) => 4,
            Error::Network(_) => 5,
            Error::HttpStatus { .. } => 6,
            Error::Decode(_) => 7,
            Error::Encode(_) => 8,
            Error::ClientInit(_) => 9,
            Error::TopicNotFound(_) => 10,
            Error::Publish(_) => 11,
            Error::Timeout(_) => 12,
            Error::Interrupted => 130,
        }
    }
}
