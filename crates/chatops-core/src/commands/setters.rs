//! Resolvers backed by a [`TeamDirectory`].

use crate::context::CommandContext;
use crate::directory::TeamDirectory;
use crate::error::{ChatOpsError, Result};
use crate::message::ChatPrompt;
use crate::setter::{ParameterSetter, RecursiveSetterResult, SetterRequest};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub const TEAM_NAME: &str = "teamName";
pub const PROJECT_NAME: &str = "projectName";

/// Picks the team from the invoking channel when exactly one team owns it,
/// otherwise asks.
pub struct TeamSetter {
    directory: Arc<dyn TeamDirectory>,
}

impl TeamSetter {
    pub fn new(directory: Arc<dyn TeamDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl ParameterSetter for TeamSetter {
    async fn resolve(
        &self,
        ctx: &CommandContext,
        request: SetterRequest<'_>,
    ) -> Result<RecursiveSetterResult> {
        let mut candidates = match ctx.channel.as_deref() {
            Some(channel) => self.directory.teams_for_channel(channel).await?,
            None => Vec::new(),
        };
        if let [team] = candidates.as_slice() {
            debug!(team = %team, channel = ?ctx.channel, "team taken from channel");
            return Ok(RecursiveSetterResult::resolved(request.parameter, team.as_str()));
        }
        if candidates.is_empty() {
            candidates = self.directory.teams().await?;
        }
        if candidates.is_empty() {
            return Err(ChatOpsError::UserInput(
                "There are no teams yet. Ask an admin to add one to the directory.".to_string(),
            ));
        }
        Ok(RecursiveSetterResult::Prompt(ChatPrompt::menu(
            request.prompt_text("Please select a team"),
            candidates,
        )))
    }
}

/// Offers the projects of the already chosen team.
pub struct ProjectSetter {
    directory: Arc<dyn TeamDirectory>,
}

impl ProjectSetter {
    pub fn new(directory: Arc<dyn TeamDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl ParameterSetter for ProjectSetter {
    async fn resolve(
        &self,
        _ctx: &CommandContext,
        request: SetterRequest<'_>,
    ) -> Result<RecursiveSetterResult> {
        let team = request.value(TEAM_NAME).ok_or_else(|| {
            ChatOpsError::UserInput("A team must be selected before a project".to_string())
        })?;
        let projects = self.directory.projects(team).await?;
        match projects.as_slice() {
            [] => Err(ChatOpsError::UserInput(format!(
                "Team '{team}' has no projects yet"
            ))),
            [only] => Ok(RecursiveSetterResult::resolved(request.parameter, only.as_str())),
            _ => Ok(RecursiveSetterResult::Prompt(ChatPrompt::menu(
                request.prompt_text("Please select a project"),
                projects,
            ))),
        }
    }
}
