//! Gateway handlers.
//!
//! - `POST /api/chat`: run one chat session, stream wire frames
//! - `GET  /api/projects/{id}`: stored messages and snapshot of a project
//! - `GET  /health`: liveness

use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info, warn};

use uigen_agent::{AgentStreamEvent, ChatRequest, spawn_session};
use uigen_core::error::StoreError;
use uigen_wire::encode_error;

use crate::SharedState;

const GENERATION_FAILED: &str = "Failed to generate AI response.";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    fn respond(status: StatusCode, error: impl Into<String>, details: Option<String>) -> Response {
        (
            status,
            Json(Self {
                error: error.into(),
                details,
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /api/chat`
///
/// Waits for the session's first event before committing to a status code:
/// a session that fails before producing anything gets a `500` with a JSON
/// body, everything else gets a `200` whose body is the frame stream.
pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Response {
    info!(
        messages = payload.messages.len(),
        has_files = payload.files.is_some(),
        "Chat request"
    );

    let (ctx, mut rx) = spawn_session(payload, state.session.clone());
    let first = match rx.recv().await {
        Some(AgentStreamEvent::Error(details)) => {
            return ErrorResponse::respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERATION_FAILED,
                Some(details),
            );
        }
        None => {
            error!(request_id = %ctx.request_id, "Session ended without output");
            return ErrorResponse::respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERATION_FAILED,
                None,
            );
        }
        Some(event) => event,
    };

    let frames = tokio_stream::once(first)
        .chain(ReceiverStream::new(rx))
        .map(|event| Ok::<_, Infallible>(render(event)));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header("x-request-id", ctx.request_id.to_string())
        .body(Body::from_stream(frames))
        .unwrap_or_else(|e| {
            error!(error = %e, "Failed to build streaming response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}

/// One event as one wire line. A snapshot that cannot be encoded becomes a
/// terminal error frame.
fn render(event: AgentStreamEvent) -> String {
    match event.into_frame().encode() {
        Ok(line) => line,
        Err(e) => {
            error!(error = %e, "Failed to encode frame");
            encode_error(&e.to_string())
        }
    }
}

/// `GET /api/projects/{id}`
pub async fn get_project_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Response {
    match state.session.store.load(&id).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => ErrorResponse::respond(StatusCode::NOT_FOUND, "Project not found", None),
        Err(StoreError::InvalidProjectId(_)) => {
            ErrorResponse::respond(StatusCode::BAD_REQUEST, "Invalid project id", None)
        }
        Err(e) => {
            warn!(project_id = %id, error = %e, "Failed to load project");
            ErrorResponse::respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load project",
                Some(e.to_string()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AppState, build_router};
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;
    use uigen_agent::{AgentLoop, SessionDeps};
    use uigen_core::error::ProviderError;
    use uigen_core::message::ContentBlock;
    use uigen_core::provider::{Provider, ProviderRequest, ProviderResponse, StopReason};
    use uigen_core::store::ProjectStore;
    use uigen_store::InMemoryStore;
    use uigen_wire::{Frame, decode_all};

    /// Plays back responses in order; errors once the script runs out.
    struct MockProvider {
        script: Mutex<Vec<ProviderResponse>>,
    }

    impl MockProvider {
        fn new(mut script: Vec<ProviderResponse>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
            }
        }
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.script
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| ProviderError::ApiError {
                    status_code: 529,
                    message: "overloaded".into(),
                })
        }
    }

    fn reply(content: Vec<ContentBlock>, stop_reason: StopReason) -> ProviderResponse {
        ProviderResponse {
            content,
            stop_reason,
            usage: None,
            model: "mock-model".into(),
        }
    }

    fn app(script: Vec<ProviderResponse>, store: Arc<dyn ProjectStore>) -> axum::Router {
        let state = AppState {
            session: SessionDeps {
                agent: Arc::new(AgentLoop::new(Arc::new(MockProvider::new(script)), "mock-model")),
                store,
            },
            body_limit: 1024 * 1024,
        };
        build_router(Arc::new(state))
    }

    fn chat_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = app(vec![], Arc::new(InMemoryStore::new()));
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn chat_streams_text_then_snapshot() {
        let script = vec![
            reply(
                vec![
                    ContentBlock::text("Creating \"App\"\n"),
                    ContentBlock::tool_use(
                        "toolu_1",
                        "str_replace_editor",
                        json!({"command": "create", "path": "/App.jsx", "file_text": "export default () => null;"}),
                    ),
                ],
                StopReason::ToolUse,
            ),
            reply(vec![ContentBlock::text("Done.")], StopReason::EndTurn),
        ];
        let app = app(script, Arc::new(InMemoryStore::new()));

        let response = app
            .oneshot(chat_request(json!({
                "messages": [{"role": "user", "content": "Make a counter"}]
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert!(response.headers().contains_key("x-request-id"));

        let body = body_string(response).await;
        assert!(body.starts_with("0:\"Creating \\\"App\\\"\\n\"\n"));

        let frames = decode_all(&body).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], Frame::Text("Creating \"App\"\n".into()));
        assert_eq!(frames[1], Frame::Text("Done.".into()));
        let Frame::Snapshot(snapshot) = &frames[2] else {
            panic!("last frame should be the snapshot");
        };
        assert_eq!(
            snapshot.get("/App.jsx").and_then(|n| n.content.as_deref()),
            Some("export default () => null;")
        );
    }

    #[tokio::test]
    async fn failure_before_first_frame_is_500() {
        let app = app(vec![], Arc::new(InMemoryStore::new()));
        let response = app
            .oneshot(chat_request(json!({"messages": [{"role": "user", "content": "hi"}]})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["error"], GENERATION_FAILED);
        assert!(json["details"].as_str().unwrap().contains("overloaded"));
    }

    #[tokio::test]
    async fn failure_mid_stream_ends_with_error_frame() {
        let script = vec![reply(
            vec![
                ContentBlock::text("Working"),
                ContentBlock::tool_use("toolu_1", "file_manager", json!({"command": "delete", "path": "/x"})),
            ],
            StopReason::ToolUse,
        )];
        let app = app(script, Arc::new(InMemoryStore::new()));
        let response = app
            .oneshot(chat_request(json!({"messages": [{"role": "user", "content": "hi"}]})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let frames = decode_all(&body_string(response).await).unwrap();
        assert_eq!(frames[0], Frame::Text("Working".into()));
        assert!(matches!(
            frames.last(),
            Some(Frame::Error(message)) if message.contains("overloaded")
        ));
        assert!(!frames.iter().any(|f| matches!(f, Frame::Snapshot(_))));
    }

    #[tokio::test]
    async fn malformed_body_rejected() {
        let app = app(vec![], Arc::new(InMemoryStore::new()));
        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn project_lookup() {
        let store = Arc::new(InMemoryStore::new());
        let script = vec![reply(vec![ContentBlock::text("Hello")], StopReason::EndTurn)];
        let app = app(script, store.clone());

        let missing = Request::builder()
            .uri("/api/projects/p1")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(missing).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(chat_request(json!({
                "messages": [{"role": "user", "content": "hi"}],
                "projectId": "p1"
            })))
            .await
            .unwrap();
        body_string(response).await;

        // The session saves after the body has been delivered.
        for _ in 0..100 {
            if !store.is_empty().await {
                break;
            }
            tokio::task::yield_now().await;
        }

        let req = Request::builder()
            .uri("/api/projects/p1")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["project_id"], "p1");
        assert_eq!(json["messages"][1]["content"], "Hello");
    }

    #[tokio::test]
    async fn invalid_project_id_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(vec![], Arc::new(uigen_store::FileStore::new(dir.path())));
        let req = Request::builder()
            .uri("/api/projects/a.b")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
