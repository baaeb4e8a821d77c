//! Built-in directory-backed commands and the registry that serves them.

mod list_projects;
mod request_environments;
pub mod setters;

pub use list_projects::ListProjects;
pub use request_environments::RequestEnvironments;

use crate::config::Config;
use crate::directory::{InMemoryDirectory, TeamDirectory};
use crate::error::Result;
use crate::provision::{DryRunProvisioner, Provisioner};
use crate::registry::{CommandDescriptor, CommandRegistry};
use std::sync::Arc;

pub const LIST_PROJECTS: &str = "list-projects";
pub const REQUEST_ENVIRONMENTS: &str = "request-environments";

/// Collaborators shared by every built-in command.
#[derive(Clone)]
pub struct BuiltinDeps {
    pub directory: Arc<dyn TeamDirectory>,
    pub provisioner: Arc<dyn Provisioner>,
    pub environments: Arc<Vec<String>>,
}

impl BuiltinDeps {
    /// Directory from `config.directory`, dry-run provisioning.
    pub fn from_config(config: &Config) -> Self {
        Self {
            directory: Arc::new(InMemoryDirectory::new(config.directory.clone())),
            provisioner: Arc::new(DryRunProvisioner::new()),
            environments: Arc::new(config.environments.clone()),
        }
    }
}

/// Registry with the built-in commands followed by `help`.
pub fn build_registry(deps: BuiltinDeps) -> Result<CommandRegistry> {
    let mut registry = CommandRegistry::new();

    let directory = deps.directory.clone();
    registry.register(
        CommandDescriptor::new(LIST_PROJECTS, "Projects", "List a team's projects"),
        move || Box::new(ListProjects::new(directory.clone())),
    )?;

    registry.register(
        CommandDescriptor::new(
            REQUEST_ENVIRONMENTS,
            "Projects",
            "Create the configured environments for a project",
        ),
        move || {
            Box::new(RequestEnvironments::new(
                deps.directory.clone(),
                deps.provisioner.clone(),
                deps.environments.clone(),
            ))
        },
    )?;

    registry.with_help()
}

#[cfg(test)]
mod tests {
    use super::setters::{PROJECT_NAME, TEAM_NAME};
    use super::*;
    use crate::config::{DirectoryConfig, TeamConfig};
    use crate::context::CommandContext;
    use crate::directory::InMemoryDirectory;
    use crate::engine::HandleOutcome;
    use crate::error::ErrorKind;
    use crate::invocation::{CommandInvocation, DisplayMode};
    use crate::message::MessageLevel;
    use crate::messaging::InMemoryMessageClient;
    use crate::provision::DryRunProvisioner;
    use crate::task::TaskStatus;

    struct Fixture {
        registry: CommandRegistry,
        client: Arc<InMemoryMessageClient>,
        provisioner: Arc<DryRunProvisioner>,
    }

    fn fixture(provisioner: DryRunProvisioner) -> Fixture {
        let directory = InMemoryDirectory::new(DirectoryConfig {
            teams: vec![
                TeamConfig {
                    name: "alpha".into(),
                    channels: vec!["alpha-devs".into()],
                    projects: vec!["payments".into()],
                },
                TeamConfig {
                    name: "beta".into(),
                    channels: vec![],
                    projects: vec!["ledger".into(), "reports".into()],
                },
            ],
        });
        let provisioner = Arc::new(provisioner);
        let registry = build_registry(BuiltinDeps {
            directory: Arc::new(directory),
            provisioner: provisioner.clone(),
            environments: Arc::new(vec!["dev".into(), "sit".into(), "uat".into()]),
        })
        .unwrap();
        Fixture {
            registry,
            client: Arc::new(InMemoryMessageClient::new()),
            provisioner,
        }
    }

    #[test]
    fn registry_lists_builtins_and_help() {
        let f = fixture(DryRunProvisioner::new());
        let names: Vec<_> = f.registry.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["help", "list-projects", "request-environments"]);
    }

    #[tokio::test]
    async fn channel_resolves_everything_in_one_turn() {
        let f = fixture(DryRunProvisioner::new());
        let ctx = CommandContext::new(f.client.clone()).with_channel("alpha-devs");
        let result = f
            .registry
            .dispatch(CommandInvocation::new(REQUEST_ENVIRONMENTS), &ctx)
            .await
            .unwrap();
        assert_eq!(result.outcome, HandleOutcome::Completed);

        let envs: Vec<_> = f
            .provisioner
            .requests()
            .into_iter()
            .map(|r| r.environment)
            .collect();
        assert_eq!(envs, vec!["dev", "sit", "uat"]);

        let latest = f.client.get(&result.correlation_id).unwrap();
        assert!(latest.message.render_plain().contains("3/3 completed"));
    }

    #[tokio::test]
    async fn list_projects_buttons_start_request_environments() {
        let f = fixture(DryRunProvisioner::new());
        let ctx = CommandContext::new(f.client.clone());
        let result = f
            .registry
            .dispatch(
                CommandInvocation::new(LIST_PROJECTS).with_param(TEAM_NAME, "beta"),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(result.outcome, HandleOutcome::Completed);

        let latest = f.client.get(&result.correlation_id).unwrap();
        let next: Vec<_> = latest.message.actions().map(|b| b.invocation.clone()).collect();
        assert_eq!(next.len(), 2);
        assert_eq!(next[0].command, REQUEST_ENVIRONMENTS);
        assert_eq!(next[1].param(PROJECT_NAME), Some("reports"));
    }

    #[tokio::test]
    async fn project_prompt_then_click() {
        let f = fixture(DryRunProvisioner::new());
        let ctx = CommandContext::new(f.client.clone());
        let first = f
            .registry
            .dispatch(
                CommandInvocation::new(REQUEST_ENVIRONMENTS).with_param(TEAM_NAME, "beta"),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(
            first.outcome,
            HandleOutcome::Prompted {
                parameter: PROJECT_NAME.into()
            }
        );
        assert!(f.provisioner.requests().is_empty());

        let click = f.client.get(&first.correlation_id).unwrap().message.actions().nth(1).cloned().unwrap();
        assert_eq!(click.label, "reports");
        let second = f.registry.dispatch(click.invocation, &ctx).await.unwrap();
        assert_eq!(second.correlation_id, first.correlation_id);
        assert_eq!(second.outcome, HandleOutcome::Completed);
        assert!(f.provisioner.requests().iter().all(|r| r.project == "reports"));
    }

    #[tokio::test]
    async fn failed_environment_stops_run_and_offers_retry() {
        let f = fixture(DryRunProvisioner::new().failing_on("sit"));
        let ctx = CommandContext::new(f.client.clone());
        let invocation = CommandInvocation::new(REQUEST_ENVIRONMENTS)
            .with_param(TEAM_NAME, "alpha")
            .with_param(PROJECT_NAME, "payments")
            .with_display(DisplayMode::Hide);
        let result = f.registry.dispatch(invocation, &ctx).await.unwrap();
        assert!(matches!(
            result.outcome,
            HandleOutcome::Failed {
                kind: ErrorKind::TaskFailure,
                ..
            }
        ));
        // uat never started
        assert_eq!(f.provisioner.requests().len(), 2);

        // The failure is appended to the task list, not posted over it.
        let latest = f.client.get(&result.correlation_id).unwrap();
        let plain = latest.message.render_plain();
        assert!(plain.contains(&format!("{} Create dev environment", TaskStatus::Succeeded.glyph())));
        assert!(plain.contains(&format!("{} Create sit environment", TaskStatus::Failed.glyph())));
        assert!(plain.contains(&format!("{} Create uat environment", TaskStatus::Pending.glyph())));
        assert!(plain.contains("Step *Create sit environment* failed"));
        assert_eq!(latest.message.level, MessageLevel::Error);

        let retry = latest.message.actions().find(|b| b.label == "Retry").unwrap();
        assert_eq!(retry.invocation.param(PROJECT_NAME), Some("payments"));
        assert_eq!(retry.invocation.correlation_id.as_deref(), Some(result.correlation_id.as_str()));
    }
}
