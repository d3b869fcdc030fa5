//! HTTP adapters for the chat and classification endpoints.
//!
//! Each adapter performs exactly one POST per call and never retries. Response
//! bodies go through `decode_chat_reply` / `decode_prediction`, which are the
//! only places that look at the wire shape.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::protocol::{
    ChatRequest, ChatResponse, PredictRequest, PredictResponse, CHAT_PATH, PREDICT_PATH,
};
use tracing::debug;

use crate::{
    config::{ClientSettings, SettingsError},
    error::{ClientError, CHAT_MISSING_REPLY},
};

#[async_trait]
pub trait ConversationTransport: Send + Sync {
    /// Returns the assistant reply. A response without a reply is not an
    /// error here; the fallback text is substituted instead.
    async fn send(&self, message: &str) -> Result<String, ClientError>;
}

#[async_trait]
pub trait ClassificationTransport: Send + Sync {
    async fn predict(&self, text: &str) -> Result<String, ClientError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    Reply(String),
    Missing,
}

impl ChatReply {
    pub fn into_text(self) -> String {
        match self {
            Self::Reply(text) => text,
            Self::Missing => CHAT_MISSING_REPLY.to_string(),
        }
    }
}

/// Unparseable bodies and empty replies both count as a missing reply.
pub fn decode_chat_reply(body: &[u8]) -> ChatReply {
    match serde_json::from_slice::<ChatResponse>(body) {
        Ok(ChatResponse {
            response: Some(text),
        }) if !text.is_empty() => ChatReply::Reply(text),
        _ => ChatReply::Missing,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictOutcome {
    Genre(String),
    Rejected(String),
    Malformed,
}

/// An `error` field wins over `genre`; the server only sets one of them.
pub fn decode_prediction(body: &[u8]) -> PredictOutcome {
    let Ok(parsed) = serde_json::from_slice::<PredictResponse>(body) else {
        return PredictOutcome::Malformed;
    };
    match parsed {
        PredictResponse {
            error: Some(error), ..
        } => PredictOutcome::Rejected(error),
        PredictResponse {
            genre: Some(genre), ..
        } if !genre.trim().is_empty() => PredictOutcome::Genre(genre),
        _ => PredictOutcome::Malformed,
    }
}

async fn post_json<T: serde::Serialize + ?Sized>(
    http: &Client,
    url: &str,
    payload: &T,
) -> Result<(StatusCode, Vec<u8>), ClientError> {
    let response = http
        .post(url)
        .json(payload)
        .send()
        .await
        .map_err(|err| ClientError::from_reqwest(url, &err))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| ClientError::from_reqwest(url, &err))?;
    debug!(%url, %status, bytes = body.len(), "received response");
    Ok((status, body.to_vec()))
}

#[derive(Debug, Clone)]
pub struct HttpConversationAdapter {
    http: Client,
    url: String,
}

impl HttpConversationAdapter {
    pub fn new(http: Client, settings: &ClientSettings) -> Self {
        Self {
            http,
            url: settings.endpoint(CHAT_PATH),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, SettingsError> {
        Ok(Self::new(settings.http_client()?, settings))
    }
}

#[async_trait]
impl ConversationTransport for HttpConversationAdapter {
    async fn send(&self, message: &str) -> Result<String, ClientError> {
        let (status, body) = post_json(
            &self.http,
            &self.url,
            &ChatRequest {
                message: message.to_string(),
            },
        )
        .await?;

        if !status.is_success() {
            return Err(ClientError::transport(
                &self.url,
                format!("status {status}"),
            ));
        }

        let reply = decode_chat_reply(&body);
        if reply == ChatReply::Missing {
            debug!(url = %self.url, "chat response carried no reply; using fallback");
        }
        Ok(reply.into_text())
    }
}

#[derive(Debug, Clone)]
pub struct HttpClassificationAdapter {
    http: Client,
    url: String,
}

impl HttpClassificationAdapter {
    pub fn new(http: Client, settings: &ClientSettings) -> Self {
        Self {
            http,
            url: settings.endpoint(PREDICT_PATH),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, SettingsError> {
        Ok(Self::new(settings.http_client()?, settings))
    }
}

#[async_trait]
impl ClassificationTransport for HttpClassificationAdapter {
    async fn predict(&self, text: &str) -> Result<String, ClientError> {
        let (status, body) = post_json(
            &self.http,
            &self.url,
            &PredictRequest {
                text: text.to_string(),
            },
        )
        .await?;

        // The server reports handled failures (e.g. empty input) with a 4xx
        // status and an `error` body; that message is meant for the user.
        match decode_prediction(&body) {
            PredictOutcome::Rejected(message) => Err(ClientError::Application(message)),
            _ if !status.is_success() => Err(ClientError::transport(
                &self.url,
                format!("status {status}"),
            )),
            PredictOutcome::Genre(genre) => Ok(genre),
            PredictOutcome::Malformed => Err(ClientError::Protocol {
                endpoint: self.url.clone(),
                field: "genre",
            }),
        }
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
