use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::{bearer, build_client};
use base64::Engine;
use log::{debug, info};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier Pub/Sub assigns to an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(String);

impl MessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize)]
struct PublishRequest {
    messages: Vec<PubsubMessage>,
}

#[derive(Debug, Serialize)]
struct PubsubMessage {
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// Session scoped to one project.
pub struct PubSubClient {
    client: Client,
    base_url: String,
    project: String,
    // None against the emulator.
    access_token: Option<String>,
}

impl PubSubClient {
    pub async fn connect(cfg: &Config, project: &str) -> Result<Self> {
        let project = project.trim();
        if project.is_empty() || project.contains('/') {
            return Err(Error::ClientInit(format!("invalid project id {project:?}")));
        }
        let client = build_client(cfg)
            .map_err(|e| Error::ClientInit(format!("could not build client: {e}")))?;
        let access_token = if cfg.pubsub_emulator {
            debug!("publishing to emulator at {}", cfg.pubsub_url);
            None
        } else {
            Some(
                super::access_token(&client, cfg)
                    .await
                    .map_err(Error::ClientInit)?,
            )
        };
        Ok(Self {
            client,
            base_url: cfg.pubsub_url.clone(),
            project: project.to_string(),
            access_token,
        })
    }

    /// Handle to a topic in this project. Accepts a bare id or a full
    /// `projects/<p>/topics/<t>` name; existence is only checked on publish.
    pub fn topic(&self, id: &str) -> Topic<'_> {
        let id = id.trim();
        let (project, topic) = match id.split('/').collect::<Vec<_>>().as_slice() {
            ["projects", p, "topics", t] => (p.to_string(), t.to_string()),
            _ => (self.project.clone(), id.to_string()),
        };
        Topic {
            client: self,
            project,
            topic,
        }
    }
}

pub struct Topic<'a> {
    client: &'a PubSubClient,
    project: String,
    topic: String,
}

impl Topic<'_> {
    pub fn name(&self) -> String {
        format!("projects/{}/topics/{}", self.project, self.topic)
    }

    /// Publish one message with `payload` as data and no attributes, waiting
    /// for the server to acknowledge it.
    pub async fn publish(&self, payload: &[u8]) -> Result<MessageId> {
        if self.topic.is_empty() {
            return Err(Error::TopicNotFound("empty topic id".into()));
        }
        let url = format!(
            "{}/v1/projects/{}/topics/{}:publish",
            self.client.base_url,
            urlencoding::encode(&self.project),
            urlencoding::encode(&self.topic)
        );
        let body = PublishRequest {
            messages: vec![PubsubMessage {
                data: base64::engine::general_purpose::STANDARD.encode(payload),
            }],
        };

        debug!("POST {} ({} bytes)", url, payload.len());
        let mut req = self.client.client.post(&url).json(&body);
        if let Some(token) = &self.client.access_token {
            let auth = bearer(token)
                .map_err(|_| Error::ClientInit("access token is not a valid header value".into()))?;
            req = req.header(AUTHORIZATION, auth);
        }
        let res = req
            .send()
            .await
            .map_err(|e| Error::Publish(format!("request failed: {e}")))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| Error::Publish(format!("reading response failed: {e}")))?;
        if status == StatusCode::NOT_FOUND {
            return Err(Error::TopicNotFound(self.name()));
        }
        if !status.is_success() {
            return Err(Error::Publish(format!("{} responded {status}: {text}", self.name())));
        }

        let parsed: PublishResponse = serde_json::from_str(&text)
            .map_err(|e| Error::Publish(format!("malformed response: {e}")))?;
        let id = parsed
            .message_ids
            .into_iter()
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Publish("server returned no message id".into()))?;
        info!("published message {} to {}", id, self.name());
        Ok(MessageId(id))
    }
}

/// Connect, resolve the topic and publish `payload` in one step.
pub async fn publish(cfg: &Config, project: &str, topic: &str, payload: &[u8]) -> Result<MessageId> {
    let client = PubSubClient::connect(cfg, project).await?;
    client.topic(topic).publish(payload).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PubSubClient {
        PubSubClient {
            client: Client::new(),
            base_url: "http://localhost".into(),
            project: "p".into(),
            access_token: None,
        }
    }

    #[test]
    fn topic_accepts_bare_and_full_names() {
        let c = client();
        assert_eq!(c.topic("rate").name(), "projects/p/topics/rate");
        assert_eq!(
            c.topic("projects/other/topics/rate").name(),
            "projects/other/topics/rate"
        );
    }

    #[test]
    fn publish_request_encodes_data_as_base64() {
        let body = PublishRequest {
            messages: vec![PubsubMessage {
                data: base64::engine::general_purpose::STANDARD.encode(b"{}"),
            }],
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"messages":[{"data":"e30="}]}"#
        );
    }
}
