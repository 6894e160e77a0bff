//! AI music chat
//!
//! `POST /functions/music-chat` forwards the conversation to the completion
//! gateway and splits the reply into prose and structured recommendations.

use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use super::{parse_body, preflight};
use crate::error::{AdapterError, AdapterResult};
use crate::services::{parse_reply, ChatMessage, ParsedReply, UpstreamError};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

fn chat_error(err: UpstreamError) -> AdapterError {
    match err {
        UpstreamError::NotConfigured(_) => {
            AdapterError::NotConfigured("chat API key is not configured".to_string())
        }
        UpstreamError::Status { status: 429, .. } => AdapterError::UpstreamFailure {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: "Rate limits exceeded, please try again later.".to_string(),
        },
        UpstreamError::Status { status: 402, .. } => AdapterError::UpstreamFailure {
            status: StatusCode::PAYMENT_REQUIRED,
            message: "Payment required, please add funds to your workspace.".to_string(),
        },
        other => {
            error!(error = %other, "AI gateway error");
            AdapterError::upstream("AI gateway error")
        }
    }
}

/// POST /functions/music-chat
pub async fn music_chat(
    State(state): State<AppState>,
    body: Bytes,
) -> AdapterResult<Json<ParsedReply>> {
    let request: ChatRequest = parse_body(&body)?;

    let reply = state.chat.complete(&request.messages).await.map_err(chat_error)?;
    let parsed = parse_reply(&reply);

    info!(recommendations = parsed.recommendations.len(), "Chat reply parsed");
    Ok(Json(parsed))
}

pub fn chat_routes() -> Router<AppState> {
    Router::new().route(
        "/functions/music-chat",
        post(music_chat).options(preflight),
    )
}
