//! HTTP API endpoints for the tutoring engine.
//!
//! # Endpoints
//!
//! - `POST /turn` - Take one conversation turn
//! - `GET /` - Static chat page
//! - `GET /health` - Liveness and provider name
//! - `GET /sessions/{session_id}/history` - Read-only transcript

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use francie_conversation::{ConversationState, TurnError, TurnOrchestrator};
use francie_core::{GatewayError, Role, StorageError};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TurnRequest {
    pub session_id: String,
    pub user_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    pub bot: String,
    pub turn: u32,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub turn: u32,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub state: ConversationState,
    pub messages: Vec<HistoryMessage>,
}

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<TurnOrchestrator>,
    pub index_path: PathBuf,
}

impl AppState {
    #[must_use]
    pub fn new(orchestrator: TurnOrchestrator, index_path: PathBuf) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            index_path,
        }
    }
}

// ============================================================================
// API Error Type
// ============================================================================

#[derive(Debug)]
enum ApiError {
    Turn(TurnError),
    IndexUnavailable(String),
}

impl From<TurnError> for ApiError {
    fn from(err: TurnError) -> Self {
        Self::Turn(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Turn(TurnError::Gateway(GatewayError::Upstream { .. })) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Turn(TurnError::Storage(StorageError::Conflict { .. })) => StatusCode::CONFLICT,
            Self::Turn(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IndexUnavailable(_) => StatusCode::NOT_FOUND,
        };
        let message = match self {
            Self::Turn(err) => err.to_string(),
            Self::IndexUnavailable(msg) => msg,
        };

        if status.is_server_error() {
            error!(%status, "Request failed: {message}");
        } else {
            warn!(%status, "Request rejected: {message}");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

// ============================================================================
// Router Setup
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/turn", post(handle_turn))
        .route("/health", get(handle_health))
        .route("/sessions/:session_id/history", get(handle_history))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_router(state)).await
}

// ============================================================================
// Handlers
// ============================================================================

async fn handle_turn(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let reply = state
        .orchestrator
        .take_turn(&request.session_id, &request.user_text)
        .await?;

    Ok(Json(TurnResponse {
        bot: reply.reply,
        turn: reply.turn,
        done: reply.done,
    }))
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    tokio::fs::read_to_string(&state.index_path)
        .await
        .map(Html)
        .map_err(|e| {
            ApiError::IndexUnavailable(format!(
                "Cannot read {}: {e}",
                state.index_path.display()
            ))
        })
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "provider": state.orchestrator.provider_name(),
    }))
}

async fn handle_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let conversation_state = state.orchestrator.state(&session_id).await?;
    let messages = state
        .orchestrator
        .transcript(&session_id)
        .await?
        .into_iter()
        .map(|m| HistoryMessage {
            turn: m.turn,
            role: m.role,
            content: m.content,
            created_at: m.created_at,
        })
        .collect();

    Ok(Json(HistoryResponse {
        session_id,
        state: conversation_state,
        messages,
    }))
}
