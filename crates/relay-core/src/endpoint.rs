//! HTTP client for the reply endpoint.
//!
//! One `POST` per submission, JSON in and JSON out, no auth and no streaming.
//! The body shape depends on the [`Mode`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::RequestError;
use crate::mode::Mode;

/// Anything that can turn a submitted text into a reply.
///
/// The session controller only talks to this trait, so tests can swap the
/// network for a scripted source.
#[async_trait]
pub trait ReplySource: Send + Sync {
    async fn fetch(&self, text: &str) -> Result<String, RequestError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    user_id: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct ResearchRequest<'a> {
    topic: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    response: String,
}

/// Research replies carry their text in `markdown` or `content`.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ResearchReply {
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ResearchReply {
    /// First non-empty of `markdown`, then `content`, else the empty string.
    pub fn into_text(self) -> String {
        self.markdown
            .filter(|s| !s.is_empty())
            .or(self.content.filter(|s| !s.is_empty()))
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct EndpointClient {
    client: Client,
    url: String,
    mode: Mode,
    user_id: String,
}

impl EndpointClient {
    pub fn new(url: &str, mode: Mode, user_id: &str) -> Self {
        Self::with_client(Client::new(), url, mode, user_id)
    }

    /// Use a preconfigured `reqwest` client (proxies, TLS roots).
    pub fn with_client(client: Client, url: &str, mode: Mode, user_id: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            mode,
            user_id: user_id.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.endpoint_url(), config.mode, &config.user_id)
    }

    /// JSON body sent for `text`.
    pub fn request_body(&self, text: &str) -> serde_json::Value {
        let body = match self.mode {
            Mode::Chat => serde_json::to_value(ChatRequest {
                user_id: &self.user_id,
                message: text,
            }),
            Mode::Research => serde_json::to_value(ResearchRequest { topic: text }),
        };
        // Both request structs are plain string fields
        body.unwrap_or_default()
    }

    /// Extract the reply text from a raw success body.
    pub fn decode_reply(mode: Mode, body: &str) -> Result<String, RequestError> {
        match mode {
            Mode::Chat => {
                let reply: ChatReply = serde_json::from_str(body).map_err(RequestError::Decode)?;
                Ok(reply.response)
            }
            Mode::Research => {
                let reply: ResearchReply =
                    serde_json::from_str(body).map_err(RequestError::Decode)?;
                Ok(reply.into_text())
            }
        }
    }
}

#[async_trait]
impl ReplySource for EndpointClient {
    async fn fetch(&self, text: &str) -> Result<String, RequestError> {
        let body = self.request_body(text);
        tracing::debug!(url = %self.url, mode = %self.mode, %body, "sending request");

        let response = self.client.post(&self.url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status(status));
        }

        let raw = response.text().await?;
        let reply = Self::decode_reply(self.mode, &raw)?;
        tracing::debug!(bytes = reply.len(), "reply received");
        Ok(reply)
    }
}
