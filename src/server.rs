//! HTTP chat API
//!
//! Each browser session gets its own [`SessionStore`], kept in a
//! [`SessionMap`] under a random identifier and passed explicitly to every
//! handler. Replies are streamed as server-sent events:
//!
//! - `event: fragment` carries one piece of reply text
//! - `event: done` carries the full reply once the stream has ended
//!
//! The reply is appended to the session by a background task, so it lands in
//! the transcript even if the client disconnects mid-stream. A session streams
//! one reply at a time; a second message while one is pending gets 409. A
//! reply that finishes after the transcript was cleared is dropped.

use crate::error::{Result, TutorError};
use crate::registry::{ModelEntry, ModelRegistry};
use crate::relay::CompletionRelay;
use crate::session::{Message, SessionStore};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

/// One session, locked while it is read or appended
pub type SharedSession = Arc<Mutex<SessionStore>>;

/// All live sessions, keyed by identifier
#[derive(Clone, Default)]
pub struct SessionMap {
    inner: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session using `model`
    pub async fn create(&self, model: &str) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(SessionStore::with_model(model)));
        self.inner.write().await.insert(id, Arc::clone(&session));
        (id, session)
    }

    /// Look up a session
    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.inner.read().await.get(id).cloned()
    }

    /// Discard a session; returns whether it existed
    pub async fn remove(&self, id: &Uuid) -> bool {
        self.inner.write().await.remove(id).is_some()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether no session is live
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    relay: CompletionRelay,
    sessions: SessionMap,
    default_model: String,
}

impl AppState {
    /// Build state around a relay; new sessions start on `default_model`
    pub fn new(relay: CompletionRelay, default_model: impl Into<String>) -> Self {
        Self {
            relay,
            sessions: SessionMap::new(),
            default_model: default_model.into(),
        }
    }

    /// The live sessions
    pub fn sessions(&self) -> &SessionMap {
        &self.sessions
    }
}

/// Error body returned by every endpoint
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let status = match err.downcast_ref::<TutorError>() {
            Some(TutorError::EmptyMessage) | Some(TutorError::UnknownModel(_)) => {
                StatusCode::BAD_REQUEST
            }
            Some(TutorError::SessionNotFound(_)) => StatusCode::NOT_FOUND,
            Some(TutorError::ReplyInProgress) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {:#}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// JSON body whose rejection is reported as an [`ApiError`]
type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

/// Session contents as returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session identifier
    pub id: Uuid,
    /// Identifier of the active model
    pub active_model: String,
    /// Display label of the active model
    pub active_label: String,
    /// When the session was opened
    pub started_at: DateTime<Utc>,
    /// Transcript in order
    pub messages: Vec<Message>,
}

impl SessionSnapshot {
    fn of(id: Uuid, session: &SessionStore) -> Self {
        Self {
            id,
            active_model: session.active_model().to_string(),
            active_label: ModelRegistry::label_for(session.active_model()).to_string(),
            started_at: session.started_at(),
            messages: session.messages().to_vec(),
        }
    }
}

/// Body of `PUT /api/sessions/:id/model`
#[derive(Debug, Deserialize)]
pub struct SetModelRequest {
    /// Label, identifier, or 1-based index
    pub model: String,
}

/// Body of `POST /api/sessions/:id/messages`
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Text typed by the student
    pub content: String,
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/models", get(list_models))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/model", put(set_model))
        .route(
            "/api/sessions/:id/messages",
            post(send_message).delete(clear_messages),
        )
        .with_state(state)
}

/// Bind `address` and serve until CTRL-C
///
/// # Errors
///
/// Returns error if the address cannot be bound or the server fails
pub async fn serve(address: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

async fn lookup(state: &AppState, id: Uuid) -> ApiResult<SharedSession> {
    state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| anyhow::Error::from(TutorError::SessionNotFound(id.to_string())).into())
}

async fn list_models() -> Json<&'static [ModelEntry]> {
    Json(ModelRegistry::entries())
}

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionSnapshot>) {
    let (id, session) = state.sessions.create(&state.default_model).await;
    tracing::info!(session = %id, "Session created");
    let snapshot = SessionSnapshot::of(id, &*session.lock().await);
    (StatusCode::CREATED, Json(snapshot))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = lookup(&state, id).await?;
    let guard = session.lock().await;
    Ok(Json(SessionSnapshot::of(id, &guard)))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.sessions.remove(&id).await {
        tracing::info!(session = %id, "Session ended");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(anyhow::Error::from(TutorError::SessionNotFound(id.to_string())).into())
    }
}

async fn set_model(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: JsonBody<SetModelRequest>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = lookup(&state, id).await?;
    let Json(body) = body?;
    let entry = ModelRegistry::resolve(&body.model)?;
    let mut guard = session.lock().await;
    guard.set_model(entry.id);
    Ok(Json(SessionSnapshot::of(id, &guard)))
}

async fn clear_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = lookup(&state, id).await?;
    let mut guard = session.lock().await;
    guard.clear();
    Ok(Json(SessionSnapshot::of(id, &guard)))
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: JsonBody<SendMessageRequest>,
) -> ApiResult<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let session = lookup(&state, id).await?;
    let Json(body) = body?;

    let (turn, model, transcript) = {
        let mut guard = session.lock().await;
        let turn = guard.start_turn(Message::user(body.content))?;
        (turn, guard.active_model().to_string(), guard.messages().to_vec())
    };

    let mut replies = state.relay.stream_reply(&model, &transcript);
    let (tx, rx) = mpsc::channel::<Event>(32);

    tokio::spawn(async move {
        let mut reply = String::new();
        let mut client_connected = true;

        while let Some(fragment) = replies.next().await {
            reply.push_str(&fragment);
            if client_connected {
                let event = Event::default().event("fragment").data(sse_safe(&fragment));
                if tx.send(event).await.is_err() {
                    tracing::debug!(session = %id, "Client disconnected mid-reply");
                    client_connected = false;
                }
            }
        }

        if !session.lock().await.finish_turn(turn, reply.clone()) {
            tracing::debug!(session = %id, "Reply not stored");
        }

        if client_connected {
            let _ = tx
                .send(Event::default().event("done").data(sse_safe(&reply)))
                .await;
        }
    });

    let events = ReceiverStream::new(rx).map(Ok::<Event, Infallible>);
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// SSE fields cannot carry carriage returns
fn sse_safe(text: &str) -> String {
    text.replace('\r', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedProvider;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    const MODEL: &str = "llama-3.1-8b-instant";

    fn gated_state(parts: &[&str]) -> (AppState, Arc<tokio::sync::Notify>) {
        let (provider, gate) = ScriptedProvider::gated(parts);
        let state = AppState::new(CompletionRelay::new(Arc::new(provider)), MODEL);
        (state, gate)
    }

    fn message_request(id: Uuid, content: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/sessions/{}/messages", id))
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({ "content": content }).to_string()))
            .unwrap()
    }

    fn clear_request(id: Uuid) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/sessions/{}/messages", id))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[tokio::test]
    async fn test_reply_finishing_after_clear_is_dropped() {
        let (state, gate) = gated_state(&["respuesta"]);
        let (id, session) = state.sessions().create(MODEL).await;
        let app = router(state);

        let pending = app.clone().oneshot(message_request(id, "Hola")).await.unwrap();
        assert_eq!(pending.status(), StatusCode::OK);

        let cleared = app.clone().oneshot(clear_request(id)).await.unwrap();
        assert_eq!(cleared.status(), StatusCode::OK);
        assert!(session.lock().await.is_empty());

        gate.notify_one();
        let events = body_text(pending).await;
        assert!(events.contains("event: done"));

        let guard = session.lock().await;
        assert!(guard.is_empty());
        assert!(!guard.reply_pending());
    }

    #[tokio::test]
    async fn test_second_message_while_replying_conflicts() {
        let (state, gate) = gated_state(&["respuesta"]);
        let (id, session) = state.sessions().create(MODEL).await;
        let app = router(state);

        let pending = app.clone().oneshot(message_request(id, "uno")).await.unwrap();
        assert_eq!(pending.status(), StatusCode::OK);

        let rejected = app.clone().oneshot(message_request(id, "dos")).await.unwrap();
        assert_eq!(rejected.status(), StatusCode::CONFLICT);
        let error: serde_json::Value = serde_json::from_str(&body_text(rejected).await).unwrap();
        assert!(error["error"].as_str().unwrap().contains("still being streamed"));

        gate.notify_one();
        body_text(pending).await;

        assert_eq!(
            session.lock().await.messages(),
            &[Message::user("uno"), Message::assistant("respuesta")]
        );
    }

    #[tokio::test]
    async fn test_new_message_allowed_right_after_clear() {
        let (state, gate) = gated_state(&["vieja"]);
        let (id, session) = state.sessions().create(MODEL).await;
        let app = router(state);

        let stale = app.clone().oneshot(message_request(id, "uno")).await.unwrap();
        app.clone().oneshot(clear_request(id)).await.unwrap();

        let fresh = app.clone().oneshot(message_request(id, "dos")).await.unwrap();
        assert_eq!(fresh.status(), StatusCode::OK);

        gate.notify_one();
        body_text(stale).await;
        body_text(fresh).await;

        let guard = session.lock().await;
        assert_eq!(guard.messages()[0], Message::user("dos"));
        assert!(guard.messages().iter().all(|m| m.content != "vieja"));
    }

    #[tokio::test]
    async fn test_session_map_create_get_remove() {
        let map = SessionMap::new();
        assert!(map.is_empty().await);

        let (id, session) = map.create("gemma2-9b-it").await;
        assert_eq!(map.len().await, 1);
        assert_eq!(session.lock().await.active_model(), "gemma2-9b-it");
        assert!(map.get(&id).await.is_some());

        assert!(map.remove(&id).await);
        assert!(!map.remove(&id).await);
        assert!(map.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let map = SessionMap::new();
        let (_, a) = map.create("m").await;
        let (_, b) = map.create("m").await;
        a.lock().await.append(Message::user("solo en a")).unwrap();
        assert_eq!(a.lock().await.len(), 1);
        assert!(b.lock().await.is_empty());
    }

    #[test]
    fn test_api_error_status_mapping() {
        let bad: ApiError = anyhow::Error::from(TutorError::EmptyMessage).into();
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        let missing: ApiError =
            anyhow::Error::from(TutorError::SessionNotFound("x".to_string())).into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        let busy: ApiError = anyhow::Error::from(TutorError::ReplyInProgress).into();
        assert_eq!(busy.status, StatusCode::CONFLICT);
        let other: ApiError = anyhow::anyhow!("boom").into();
        assert_eq!(other.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_sse_safe_strips_carriage_returns() {
        assert_eq!(sse_safe("a\r\nb"), "a\nb");
    }
}
