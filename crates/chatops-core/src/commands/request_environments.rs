//! `request-environments`: provision every configured environment for a
//! team's project, one task row per environment.

use super::setters::{ProjectSetter, TeamSetter, PROJECT_NAME, TEAM_NAME};
use crate::context::CommandContext;
use crate::directory::TeamDirectory;
use crate::engine::RecursiveCommand;
use crate::error::Result;
use crate::invocation::CommandInvocation;
use crate::params::{ParameterSet, ParameterSpec};
use crate::provision::{ProvisionRequest, Provisioner};
use crate::task::Task;
use crate::task_list::TaskListMessage;
use crate::task_runner::TaskRunner;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub struct RequestEnvironments {
    params: ParameterSet,
    provisioner: Arc<dyn Provisioner>,
    environments: Arc<Vec<String>>,
}

impl RequestEnvironments {
    pub fn new(
        directory: Arc<dyn TeamDirectory>,
        provisioner: Arc<dyn Provisioner>,
        environments: Arc<Vec<String>>,
    ) -> Self {
        let params = ParameterSet::new()
            .with(
                ParameterSpec::recursive(TEAM_NAME, 0, Arc::new(TeamSetter::new(directory.clone())))
                    .label("Team"),
            )
            .with(
                ParameterSpec::recursive(PROJECT_NAME, 1, Arc::new(ProjectSetter::new(directory)))
                    .label("Project")
                    .selection_message("Please select the project to create environments for"),
            );
        Self {
            params,
            provisioner,
            environments,
        }
    }
}

#[async_trait]
impl RecursiveCommand for RequestEnvironments {
    fn name(&self) -> &str {
        super::REQUEST_ENVIRONMENTS
    }

    fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    fn title(&self) -> String {
        "*Request environments*".to_string()
    }

    async fn run(&mut self, ctx: &CommandContext, invocation: &CommandInvocation) -> Result<()> {
        let team = invocation.require(TEAM_NAME)?;
        let project = invocation.require(PROJECT_NAME)?;
        info!(team, project, environments = self.environments.len(), "requesting environments");

        let message = TaskListMessage::new(
            format!("*Creating environments for {project} ({team})*"),
            ctx.client.clone(),
            invocation.message_options(),
        );
        let mut runner = TaskRunner::new(message);
        for environment in self.environments.iter() {
            runner.add_task(ProvisionTask {
                provisioner: self.provisioner.clone(),
                request: ProvisionRequest {
                    team: team.to_string(),
                    project: project.to_string(),
                    environment: environment.clone(),
                },
            });
        }
        runner.execute(ctx).await
    }
}

struct ProvisionTask {
    provisioner: Arc<dyn Provisioner>,
    request: ProvisionRequest,
}

#[async_trait]
impl Task for ProvisionTask {
    fn description(&self) -> String {
        format!("Create {} environment", self.request.environment)
    }

    async fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        self.provisioner.provision(&self.request).await
    }
}
