use super::setters::{TeamSetter, PROJECT_NAME, TEAM_NAME};
use super::REQUEST_ENVIRONMENTS;
use crate::context::CommandContext;
use crate::directory::TeamDirectory;
use crate::engine::RecursiveCommand;
use crate::error::Result;
use crate::invocation::CommandInvocation;
use crate::message::{ActionButton, ChatMessage};
use crate::params::{ParameterSet, ParameterSpec};
use async_trait::async_trait;
use std::sync::Arc;

pub struct ListProjects {
    directory: Arc<dyn TeamDirectory>,
    params: ParameterSet,
}

impl ListProjects {
    pub fn new(directory: Arc<dyn TeamDirectory>) -> Self {
        let params = ParameterSet::new().with(
            ParameterSpec::recursive(TEAM_NAME, 0, Arc::new(TeamSetter::new(directory.clone())))
                .label("Team")
                .selection_message("Please select the team whose projects you want to see"),
        );
        Self { directory, params }
    }
}

#[async_trait]
impl RecursiveCommand for ListProjects {
    fn name(&self) -> &str {
        super::LIST_PROJECTS
    }

    fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    fn title(&self) -> String {
        "*Projects*".to_string()
    }

    async fn run(&mut self, ctx: &CommandContext, invocation: &CommandInvocation) -> Result<()> {
        let team = invocation.require(TEAM_NAME)?;
        let projects = self.directory.projects(team).await?;

        let mut message = ChatMessage::new(format!("*Projects of {team}*"));
        if projects.is_empty() {
            message.push_text(None, format!("Team {team} has no projects yet."));
        }
        for project in &projects {
            let next = CommandInvocation::new(REQUEST_ENVIRONMENTS)
                .with_param(TEAM_NAME, team)
                .with_param(PROJECT_NAME, project.as_str());
            message.push_actions(
                project.as_str(),
                vec![ActionButton {
                    label: "Request environments".to_string(),
                    invocation: next,
                }],
            );
        }
        ctx.client
            .respond(&message, &invocation.message_options())
            .await
    }
}
