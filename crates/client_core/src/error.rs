//! Adapter failures and the single place where they become user-facing text.

use shared::error::ErrorKind;
use thiserror::Error;

pub const CHAT_CONNECT_FAILURE: &str =
    "Sorry, I can't connect to the server right now. Please ensure the backend is running.";
pub const CHAT_MISSING_REPLY: &str = "Sorry, I didn't get a response.";
pub const CHAT_EMPTY_DRAFT: &str = "Please enter a message.";
pub const CLASSIFY_CONNECT_FAILURE: &str = "Cannot connect to the server. Please try again.";
pub const CLASSIFY_EMPTY_DRAFT: &str = "Please provide a movie plot to proceed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSurface {
    Conversation,
    Classification,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("request to {endpoint} failed: {detail}")]
    Transport { endpoint: String, detail: String },
    #[error("response from {endpoint} is missing the `{field}` field")]
    Protocol {
        endpoint: String,
        field: &'static str,
    },
    #[error("server rejected the request: {0}")]
    Application(String),
    #[error("draft input is empty")]
    Validation,
    /// The pending request was dropped before its response arrived.
    #[error("request was abandoned before it completed")]
    Abandoned,
}

impl ClientError {
    pub fn transport(endpoint: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            detail: detail.to_string(),
        }
    }

    pub fn from_reqwest(endpoint: &str, err: &reqwest::Error) -> Self {
        let detail = if err.is_timeout() {
            "timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        Self::transport(endpoint, detail)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::Abandoned => ErrorKind::Transport,
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::Application(_) => ErrorKind::Application,
            Self::Validation => ErrorKind::Validation,
        }
    }

    /// Text shown to the user. Raw transport detail never leaks here; it only
    /// goes to the log.
    pub fn user_message(&self, surface: ErrorSurface) -> String {
        match (surface, self) {
            (ErrorSurface::Conversation, Self::Transport { .. } | Self::Abandoned) => {
                CHAT_CONNECT_FAILURE.into()
            }
            (ErrorSurface::Conversation, Self::Protocol { .. }) => CHAT_MISSING_REPLY.into(),
            (ErrorSurface::Conversation, Self::Validation) => CHAT_EMPTY_DRAFT.into(),
            (
                ErrorSurface::Classification,
                Self::Transport { .. } | Self::Protocol { .. } | Self::Abandoned,
            ) => {
                CLASSIFY_CONNECT_FAILURE.into()
            }
            (ErrorSurface::Classification, Self::Validation) => CLASSIFY_EMPTY_DRAFT.into(),
            (_, Self::Application(message)) => {
                let message = message.trim();
                if message.is_empty() {
                    match surface {
                        ErrorSurface::Conversation => CHAT_CONNECT_FAILURE.into(),
                        ErrorSurface::Classification => CLASSIFY_CONNECT_FAILURE.into(),
                    }
                } else {
                    message.to_string()
                }
            }
        }
    }
}
