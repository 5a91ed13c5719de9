//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ActionInfo, ActionsResponse, ChatRequest, CreateSessionResponse, CredentialRequest,
    CredentialResponse, ErrorResponse, QueuedResponse, SuccessResponse, TransactionsResponse,
};
use super::AppState;
use crate::gateway::ActionKind;
use crate::runtime::{SessionError, SessionSnapshot, SseEvent};
use crate::state_machine::Credential;
use crate::wallet::{WalletInfo, WalletStatus};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/close", post(close_session))
        // User input
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/actions/:action", post(trigger_action))
        .route("/api/sessions/:id/credential", put(set_credential))
        // Session views
        .route("/api/sessions/:id/transactions", get(list_transactions))
        .route("/api/sessions/:id/stream", get(stream_session))
        // Quick-action controls
        .route("/api/actions", get(list_actions))
        // Wallet
        .route("/api/wallet", get(wallet_status))
        .route("/api/wallet/connect", post(wallet_connect))
        .route("/api/wallet/disconnect", post(wallet_disconnect))
        .route("/api/wallet/toggle", post(wallet_toggle))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Sessions
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let session_id = state.sessions.open().await;
    Json(CreateSessionResponse { session_id })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.sessions.snapshot(&id).await?))
}

async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.close(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    state.sessions.submit(&id, &req.text).await?;
    Ok(Json(QueuedResponse { queued: true }))
}

async fn trigger_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
) -> Result<Json<QueuedResponse>, AppError> {
    let action: ActionKind = action
        .parse()
        .map_err(|e: crate::gateway::UnknownAction| AppError::BadRequest(e.to_string()))?;
    state.sessions.trigger(&id, action).await?;
    Ok(Json(QueuedResponse { queued: true }))
}

async fn set_credential(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CredentialRequest>,
) -> Result<Json<CredentialResponse>, AppError> {
    let credential = req.api_key.and_then(Credential::new);
    let credential_set = credential.is_some();
    state.sessions.set_credential(&id, credential).await?;
    Ok(Json(CredentialResponse { credential_set }))
}

async fn list_transactions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionsResponse>, AppError> {
    let snapshot = state.sessions.snapshot(&id).await?;
    Ok(Json(TransactionsResponse {
        transactions: snapshot.transactions,
    }))
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (snapshot, broadcast_rx) = state.sessions.subscribe(&id).await?;
    Ok(sse_stream(SseEvent::Init { snapshot }, broadcast_rx))
}

// ============================================================
// Quick actions
// ============================================================

async fn list_actions() -> Json<ActionsResponse> {
    let actions = ActionKind::ALL
        .into_iter()
        .map(|action| ActionInfo {
            action,
            label: action.label(),
            collects_input: action.collects_input(),
        })
        .collect();
    Json(ActionsResponse { actions })
}

// ============================================================
// Wallet
// ============================================================

async fn wallet_status(State(state): State<AppState>) -> Json<WalletStatus> {
    Json(state.wallet.status().await)
}

async fn wallet_connect(State(state): State<AppState>) -> Json<WalletInfo> {
    Json(state.wallet.connect().await)
}

async fn wallet_disconnect(State(state): State<AppState>) -> Json<WalletStatus> {
    state.wallet.disconnect().await;
    Json(state.wallet.status().await)
}

async fn wallet_toggle(State(state): State<AppState>) -> Json<WalletStatus> {
    Json(state.wallet.toggle().await)
}

async fn get_version() -> &'static str {
    concat!("nero-assistant ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(_) => AppError::NotFound(e.to_string()),
            SessionError::Closed(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
