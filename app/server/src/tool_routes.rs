//! Exposes the tool surface (spec §4.7, §6) over HTTP: the only
//! external-host transport named anywhere in the corpus this crate set
//! is grounded on is axum's JSON extractor, already pulled in for the
//! UI hub's websocket route, so the tool-call protocol rides the same
//! router rather than inventing a second wire format.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use paige_error::PaigeError;
use paige_error::StatusCategory;
use paige_tools::ToolContext;
use paige_tools::ToolRegistry;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone)]
struct ToolState {
    registry: Arc<ToolRegistry>,
    context: Arc<ToolContext>,
}

#[derive(Deserialize)]
struct ToolCallRequest {
    name: String,
    call_id: String,
    input: Value,
}

#[derive(Serialize)]
struct ToolErrorBody {
    kind: &'static str,
    message: String,
}

fn status_for(category: StatusCategory) -> StatusCode {
    match category {
        StatusCategory::Validation => StatusCode::BAD_REQUEST,
        StatusCategory::Session => StatusCode::CONFLICT,
        StatusCategory::Filesystem => StatusCode::NOT_FOUND,
        StatusCategory::Model | StatusCategory::Observer => StatusCode::BAD_GATEWAY,
        StatusCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ToolRouteError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.category());
        let body = ToolErrorBody {
            kind: self.0.ui_error_kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

struct ToolRouteError(PaigeError);

impl From<PaigeError> for ToolRouteError {
    fn from(err: PaigeError) -> Self {
        Self(err)
    }
}

async fn list_tools(State(state): State<ToolState>) -> Json<Vec<paige_protocol::ToolDefinition>> {
    Json(state.registry.definitions())
}

async fn call_tool(
    State(state): State<ToolState>,
    Json(request): Json<ToolCallRequest>,
) -> Result<Json<Value>, ToolRouteError> {
    let result = state
        .registry
        .call(&request.name, &request.call_id, request.input, &state.context)
        .await?;
    Ok(Json(result))
}

/// Builds the `/tools` router. Mounted alongside the UI hub's `/ws`
/// router on the same bound port.
pub fn router(registry: Arc<ToolRegistry>, context: Arc<ToolContext>) -> Router {
    let state = ToolState { registry, context };
    Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/call", post(call_tool))
        .with_state(state)
}

#[cfg(test)]
#[path = "tool_routes.test.rs"]
mod tests;
