use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use shared::protocol::{ChatResponse, PredictResponse, CHAT_PATH, PREDICT_PATH};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, info};

use crate::{assistant, genre};

/// Missing fields are treated as empty text, matching the hosted service.
#[derive(Debug, Default, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PredictBody {
    #[serde(default)]
    pub text: String,
}

pub fn build_router(max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(CHAT_PATH, post(chat))
        .route(PREDICT_PATH, post(predict))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn chat(Json(body): Json<ChatBody>) -> Json<ChatResponse> {
    let reply = assistant::answer(&body.message);
    debug!(chars = body.message.chars().count(), "chat message answered");
    Json(ChatResponse::reply(reply))
}

async fn predict(Json(body): Json<PredictBody>) -> (StatusCode, Json<PredictResponse>) {
    if body.text.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(PredictResponse::rejected("No text provided")),
        );
    }

    let genre = genre::classify(&body.text);
    info!(%genre, chars = body.text.chars().count(), "prediction served");
    (StatusCode::OK, Json(PredictResponse::genre(genre)))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
