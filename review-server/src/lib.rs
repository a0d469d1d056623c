//! HTTP surface for persona reviews: an OpenAI-compatible completion
//! endpoint where each registered persona appears as a model name.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use futures_util::stream;
use review::{QueryError, Registry};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info};

pub mod api;
pub mod profiles;

use api::{
    completion_id, ChatCompletion, ChatCompletionChunk, ChatCompletionRequest, ChatMessage,
    ErrorResponse, ModelList,
};

#[derive(Clone)]
pub struct AppState {
    registry: Arc<Registry>,
}

pub fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/v1/models", get(list_models))
        .with_state(AppState { registry })
}

/// Recover the story from the message list: every message's content,
/// role-agnostic, joined by a blank line. The conversation is treated as
/// one input document, not a dialogue.
pub fn join_story(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

async fn list_models(State(state): State<AppState>) -> Json<ModelList> {
    Json(ModelList::new(state.registry.model_names()))
}

async fn chat_completions(
    State(state): State<AppState>,
    Json(req): Json<ChatCompletionRequest>,
) -> Response {
    let pipeline = match state.registry.resolve(&req.model) {
        Ok(pipeline) => pipeline.clone(),
        Err(err) => {
            info!("{err}");
            let body = ErrorResponse::new(
                format!("The model `{}` does not exist.", req.model),
                "invalid_request_error",
                Some("model_not_found"),
            );
            return (StatusCode::NOT_FOUND, Json(body)).into_response();
        }
    };

    let story = join_story(&req.messages);
    let outcome = match pipeline.review(&story).await {
        Ok(outcome) => outcome,
        Err(err) => return review_failure(&req.model, err),
    };

    info!(
        model = %req.model,
        retried = outcome.retried,
        "review complete"
    );
    if req.stream {
        stream_completion(&req.model, outcome.block.payload)
    } else {
        Json(ChatCompletion::new(req.model, outcome.block.payload)).into_response()
    }
}

/// One content chunk, one finish chunk, then the end-of-stream marker. The
/// pipeline only completes whole blocks, so the payload streams as a single
/// terminal chunk.
fn stream_completion(model: &str, payload: String) -> Response {
    let id = completion_id();
    let created = Utc::now().timestamp();
    let events = vec![
        Event::default().data(
            serde_json::to_string(&ChatCompletionChunk::content(&id, model, created, payload))
                .unwrap(),
        ),
        Event::default().data(
            serde_json::to_string(&ChatCompletionChunk::finish(&id, model, created)).unwrap(),
        ),
        Event::default().data("[DONE]"),
    ];
    Sse::new(stream::iter(events.into_iter().map(Ok::<_, Infallible>))).into_response()
}

/// Map a pipeline failure to a caller-visible response. Raw model output
/// stays in the log; the response body never carries it.
fn review_failure(model: &str, err: QueryError) -> Response {
    match &err {
        QueryError::Extraction(e) => {
            error!(
                model,
                attempts = e.attempts,
                last_raw = e.last_raw.as_deref().unwrap_or(""),
                "review pipeline exhausted its attempts"
            );
            let body = ErrorResponse::new(
                "The model failed to produce a usable review.",
                "server_error",
                None,
            );
            (StatusCode::BAD_GATEWAY, Json(body)).into_response()
        }
        QueryError::Prompt(e) => {
            error!(model, "prompt rendering failed: {e}");
            let body = ErrorResponse::new("Internal error.", "server_error", None);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
