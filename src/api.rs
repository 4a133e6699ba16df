use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::analytics;
use crate::completion::{build_client_from_env, DynCompletionClient};
use crate::export;
use crate::extractor;
use crate::quality;
use crate::signal::Signal;
use crate::store::{MemoryStore, SignalStore};

#[derive(Clone)]
pub struct AppState {
    completion: DynCompletionClient,
    store: Arc<dyn SignalStore>,
}

impl AppState {
    pub fn new(completion: DynCompletionClient, store: Arc<dyn SignalStore>) -> Self {
        Self { completion, store }
    }

    /// Completion client from `GEMINI_API_KEY`, fresh in-memory store.
    pub fn from_env() -> Self {
        Self::new(build_client_from_env(), Arc::new(MemoryStore::new()))
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/extract-signal", post(extract_signal))
        .route("/api/signals", get(list_signals).delete(clear_signals))
        .route("/api/signals/{id}", delete(delete_signal))
        .route("/api/analytics", get(get_analytics))
        .route("/api/export/csv", get(export_csv))
        .route("/api/export/json", get(export_json))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn default_group_name() -> Option<String> {
    Some("Manual Input".to_string())
}

#[derive(serde::Deserialize)]
struct MessageInput {
    message: String,
    /// Missing field defaults to the sentinel; an explicit null stays null.
    #[serde(default = "default_group_name")]
    group_name: Option<String>,
}

#[derive(serde::Serialize)]
struct ExtractResponse {
    success: bool,
    signal: Option<Signal>,
    message: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "gemini_configured": state.completion.is_configured(),
    }))
}

/// The two completion calls are sequential on purpose: the quality prompt
/// embeds stage 1's output. Every extraction failure class collapses to a
/// structured {success: false}; a 5xx would mean a fault in this code path,
/// not "no signal".
async fn extract_signal(
    State(state): State<AppState>,
    Json(body): Json<MessageInput>,
) -> Json<ExtractResponse> {
    let fields = match extractor::extract_fields(state.completion.as_ref(), &body.message).await {
        Some(fields) => fields,
        None => {
            return Json(ExtractResponse {
                success: false,
                signal: None,
                message: "No valid signal found in the message",
            });
        }
    };

    let enrichment = quality::analyze(state.completion.as_ref(), &fields, &body.message).await;
    let signal = Signal::assemble(fields, enrichment, &body.message, body.group_name);
    info!(symbol = %signal.symbol, action = signal.action.as_str(), "signal extracted");

    state.store.append(signal.clone());
    Json(ExtractResponse {
        success: true,
        signal: Some(signal),
        message: "Signal extracted successfully",
    })
}

async fn list_signals(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "signals": state.store.list() }))
}

async fn get_analytics(State(state): State<AppState>) -> Json<analytics::AnalyticsSnapshot> {
    Json(analytics::compute(&state.store.list()))
}

async fn export_csv(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let body = export::to_csv(&state.store.list()).map_err(|e| {
        error!(error = %e, "CSV export failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error exporting signals".to_string(),
        )
    })?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=forex_signals.csv",
            ),
        ],
        body,
    ))
}

async fn export_json(State(state): State<AppState>) -> impl IntoResponse {
    let envelope = export::to_json_envelope(&state.store.list());
    (
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=forex_signals.json",
        )],
        Json(envelope),
    )
}

async fn delete_signal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<serde_json::Value> {
    // Idempotent: an absent id is still success.
    state.store.remove(&id);
    Json(serde_json::json!({ "message": "Signal deleted successfully" }))
}

async fn clear_signals(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.store.clear();
    Json(serde_json::json!({ "message": "All signals cleared successfully" }))
}
