use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/messages/{correlation_id}: latest version of one message.
pub async fn get_message(
    State(app): State<AppState>,
    Path(correlation_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let stored = app
        .messages
        .get(&correlation_id)
        .ok_or_else(|| AppError::not_found(format!("no message for '{correlation_id}'")))?;
    Ok(Json(serde_json::json!({
        "correlation_id": stored.correlation_id,
        "destination": stored.destination,
        "edits": stored.edits,
        "updated_at": stored.updated_at,
        "text": stored.message.render_plain(),
        "message": stored.message,
    })))
}
