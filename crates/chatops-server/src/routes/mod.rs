pub mod actions;
pub mod commands;
pub mod health;
pub mod messages;

use chatops_core::context::CommandContext;
use chatops_core::registry::is_valid_command_name;

use crate::error::AppError;
use crate::state::AppState;

pub(crate) fn validate_command_name(name: &str) -> Result<(), AppError> {
    if is_valid_command_name(name) {
        Ok(())
    } else {
        Err(AppError::bad_request(format!("invalid command name '{name}'")))
    }
}

pub(crate) fn command_context(
    app: &AppState,
    channel: Option<String>,
    user: Option<String>,
) -> CommandContext {
    CommandContext {
        client: app.client.clone(),
        channel,
        user,
    }
}
