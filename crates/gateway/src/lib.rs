//! HTTP gateway for Doppel.
//!
//! Thin edge over the chat core: `/v1/chat` streams the upstream SSE
//! body through unchanged, `/v1/text-to-speech` returns base64 audio,
//! `/health` answers liveness probes. Per-user context is keyed by the
//! `x-user-id` header.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use doppel_config::AppConfig;
use doppel_core::error::GatewayError;
use doppel_core::message::ChatMessage;
use doppel_core::store::ContextStore;
use doppel_prompt::{ComposeInput, compose};
use doppel_providers::completion::{CompletionBackend, CompletionClient};
use doppel_providers::speech::SpeechSynthesizer;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContextStore>,
    pub completion: Arc<dyn CompletionBackend>,
    pub speech: Arc<SpeechSynthesizer>,
    pub default_voice: String,
}

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/chat", post(chat))
        .route("/v1/text-to-speech", post(text_to_speech))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// default `info` filter.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Bind and serve until shutdown.
pub async fn serve(config: AppConfig, store: Arc<dyn ContextStore>) -> std::io::Result<()> {
    let completion = CompletionClient::from_config(&config.completion)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let state = AppState {
        store,
        completion: Arc::new(completion),
        speech: Arc::new(SpeechSynthesizer::from_config(&config.speech)),
        default_voice: config.speech.default_voice.clone(),
    };

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Gateway listening");

    axum::serve(listener, router(state)).await
}

// --- Request bodies ---

#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct SpeechRequest {
    text: String,
    #[serde(default)]
    voice: Option<String>,
}

// --- Handlers ---

async fn health() -> impl IntoResponse {
    axum::Json(json!({ "status": "ok" }))
}

async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<ChatRequest>,
) -> Response {
    let Some(user_id) = headers.get("x-user-id").and_then(|v| v.to_str().ok()) else {
        return error_response(StatusCode::BAD_REQUEST, "x-user-id header is required");
    };

    let context = match load_context(&state, user_id).await {
        Ok(context) => context,
        Err(e) => {
            error!(error = %e, "Failed to load user context");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "AI gateway error");
        }
    };

    let history: Vec<ChatMessage> = request
        .messages
        .iter()
        .map(|m| match m.role.as_str() {
            "assistant" => ChatMessage::assistant(&m.content),
            _ => ChatMessage::user(&m.content),
        })
        .collect();

    match state.completion.stream_chat(&context, &history).await {
        Ok(stream) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/event-stream")
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::CONNECTION, "keep-alive")
            .body(Body::from_stream(stream))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(GatewayError::RateLimited) => error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limits exceeded, please try again later.",
        ),
        Err(GatewayError::QuotaExhausted) => error_response(
            StatusCode::PAYMENT_REQUIRED,
            "Payment required, please add credits to your workspace.",
        ),
        Err(e) => {
            error!(error = %e, "AI gateway call failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "AI gateway error")
        }
    }
}

async fn text_to_speech(
    State(state): State<AppState>,
    axum::Json(request): axum::Json<SpeechRequest>,
) -> Response {
    if request.text.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Text is required");
    }

    let voice = request.voice.as_deref().unwrap_or(&state.default_voice);

    match state.speech.synthesize(&request.text, voice).await {
        Ok(synthesis) => axum::Json(json!({
            "audioContent": synthesis.audio_b64,
            "provider": synthesis.provider,
        }))
        .into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

/// Compose the system prompt from the user's stored context.
async fn load_context(
    state: &AppState,
    user_id: &str,
) -> Result<String, doppel_core::error::StoreError> {
    let persona = state.store.persona(user_id).await?;
    let memories = state.store.memory_facts(user_id).await?;
    let documents = state.store.knowledge_documents(user_id).await?;
    let goals = state.store.active_goals(user_id).await?;

    let proactive_enabled = persona
        .as_ref()
        .map(|p| p.proactive_suggestions_enabled)
        .unwrap_or(true);

    Ok(compose(&ComposeInput {
        persona: persona.as_ref(),
        memories: &memories,
        documents: &documents,
        goals: &goals,
        proactive_enabled,
    }))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::Request;
    use bytes::Bytes;
    use doppel_core::error::SpeechError;
    use doppel_providers::completion::ByteStream;
    use doppel_providers::speech::SpeechProvider;
    use doppel_store::InMemoryStore;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    enum CannedOutcome {
        Stream(Vec<String>),
        Fail(GatewayError),
    }

    struct CannedBackend {
        outcome: CannedOutcome,
    }

    #[async_trait]
    impl CompletionBackend for CannedBackend {
        async fn stream_chat(
            &self,
            _system_prompt: &str,
            _history: &[ChatMessage],
        ) -> Result<ByteStream, GatewayError> {
            match &self.outcome {
                CannedOutcome::Stream(chunks) => {
                    let items: Vec<Result<Bytes, GatewayError>> = chunks
                        .iter()
                        .map(|c| Ok(Bytes::from(c.clone())))
                        .collect();
                    Ok(Box::pin(futures::stream::iter(items)))
                }
                CannedOutcome::Fail(e) => Err(e.clone()),
            }
        }
    }

    struct MockSpeech {
        succeed: bool,
    }

    #[async_trait]
    impl SpeechProvider for MockSpeech {
        fn name(&self) -> &str {
            "mock"
        }

        async fn synthesize(&self, _text: &str, _voice: &str) -> Result<Vec<u8>, SpeechError> {
            if self.succeed {
                Ok(b"mp3".to_vec())
            } else {
                Err(SpeechError::Api {
                    provider: "mock".into(),
                    status: 500,
                    body: "down".into(),
                })
            }
        }
    }

    fn test_state(outcome: CannedOutcome, speech_ok: bool) -> AppState {
        AppState {
            store: Arc::new(InMemoryStore::new()),
            completion: Arc::new(CannedBackend { outcome }),
            speech: Arc::new(SpeechSynthesizer::new(
                Box::new(MockSpeech { succeed: speech_ok }),
                Box::new(MockSpeech { succeed: speech_ok }),
            )),
            default_voice: "Aria".into(),
        }
    }

    fn chat_request(with_user: bool) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/v1/chat")
            .header("content-type", "application/json");
        if with_user {
            builder = builder.header("x-user-id", "u1");
        }
        builder
            .body(Body::from(
                json!({ "messages": [{ "role": "user", "content": "Hi" }] }).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let app = router(test_state(CannedOutcome::Stream(vec![]), true));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn chat_requires_the_user_header() {
        let app = router(test_state(CannedOutcome::Stream(vec![]), true));
        let response = app.oneshot(chat_request(false)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_passes_the_event_stream_through_unchanged() {
        let frames = "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n\n";
        let app = router(test_state(
            CannedOutcome::Stream(vec![frames.to_string()]),
            true,
        ));

        let response = app.oneshot(chat_request(true)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("text/event-stream")
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, Bytes::from(frames));
    }

    #[tokio::test]
    async fn upstream_rate_limit_maps_to_429() {
        let app = router(test_state(
            CannedOutcome::Fail(GatewayError::RateLimited),
            true,
        ));
        let response = app.oneshot(chat_request(true)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(parsed["error"].as_str().unwrap().contains("Rate limits"));
    }

    #[tokio::test]
    async fn upstream_quota_maps_to_402() {
        let app = router(test_state(
            CannedOutcome::Fail(GatewayError::QuotaExhausted),
            true,
        ));
        let response = app.oneshot(chat_request(true)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[tokio::test]
    async fn other_upstream_failures_map_to_500() {
        let app = router(test_state(
            CannedOutcome::Fail(GatewayError::Api {
                status: 503,
                body: "down".into(),
            }),
            true,
        ));
        let response = app.oneshot(chat_request(true)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["error"], "AI gateway error");
    }

    #[tokio::test]
    async fn speech_returns_base64_audio_and_provider() {
        let app = router(test_state(CannedOutcome::Stream(vec![]), true));
        let response = app
            .oneshot(
                Request::post("/v1/text-to-speech")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "text": "Hello" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["provider"], "mock");
        assert!(!parsed["audioContent"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn speech_rejects_empty_text() {
        let app = router(test_state(CannedOutcome::Stream(vec![]), true));
        let response = app
            .oneshot(
                Request::post("/v1/text-to-speech")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "text": "" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn speech_exhaustion_maps_to_400() {
        let app = router(test_state(CannedOutcome::Stream(vec![]), false));
        let response = app
            .oneshot(
                Request::post("/v1/text-to-speech")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "text": "Hello" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(parsed["error"].as_str().unwrap().contains("failed"));
    }
}
