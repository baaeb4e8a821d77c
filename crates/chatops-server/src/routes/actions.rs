use axum::extract::State;
use axum::Json;
use chatops_core::invocation::CommandInvocation;
use chatops_core::registry::DispatchResult;
use serde::Deserialize;

use super::{command_context, validate_command_name};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActionBody {
    pub invocation: CommandInvocation,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

/// POST /api/actions: a button was clicked; continue its invocation.
pub async fn click(
    State(app): State<AppState>,
    Json(body): Json<ActionBody>,
) -> Result<Json<DispatchResult>, AppError> {
    validate_command_name(&body.invocation.command)?;
    let ctx = command_context(&app, body.channel, body.user);
    let result = app.registry.dispatch(body.invocation, &ctx).await?;
    Ok(Json(result))
}
