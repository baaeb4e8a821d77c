use axum::extract::{Path, State};
use axum::Json;
use chatops_core::invocation::{CommandInvocation, DisplayMode};
use chatops_core::params::ParameterBag;
use chatops_core::registry::{CommandDescriptor, DispatchResult};
use serde::Deserialize;

use super::{command_context, validate_command_name};
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/commands: registered commands.
pub async fn list_commands(State(app): State<AppState>) -> Json<Vec<CommandDescriptor>> {
    Json(app.registry.descriptors())
}

#[derive(Debug, Default, Deserialize)]
pub struct DispatchBody {
    #[serde(default)]
    pub params: ParameterBag,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub display: Option<DisplayMode>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

/// POST /api/commands/{name}: start an invocation.
pub async fn dispatch_command(
    State(app): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<DispatchBody>,
) -> Result<Json<DispatchResult>, AppError> {
    validate_command_name(&name)?;

    let invocation = CommandInvocation {
        command: name,
        correlation_id: body.correlation_id,
        display: Some(body.display.unwrap_or(app.config.display.default)),
        params: body.params,
    };
    let ctx = command_context(&app, body.channel, body.user);
    let result = app.registry.dispatch(invocation, &ctx).await?;
    Ok(Json(result))
}
