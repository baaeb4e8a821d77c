use crate::context::CommandContext;
use crate::engine::{HandleOutcome, RecursiveCommand, RecursiveParameterRequest};
use crate::error::{ChatOpsError, Result};
use crate::help::HelpCommand;
use crate::invocation::CommandInvocation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

pub type CommandFactory = Arc<dyn Fn() -> Box<dyn RecursiveCommand> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub name: String,
    pub category: String,
    pub description: String,
}

impl CommandDescriptor {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            description: description.into(),
        }
    }
}

/// Result of dispatching one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    pub correlation_id: String,
    pub outcome: HandleOutcome,
}

/// Command names are letters, digits, hyphens and underscores.
pub fn is_valid_command_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Maps command names to factories. Populated once at startup; every turn
/// builds a fresh command instance from it.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    entries: BTreeMap<String, (CommandDescriptor, CommandFactory)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, descriptor: CommandDescriptor, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn RecursiveCommand> + Send + Sync + 'static,
    {
        if !is_valid_command_name(&descriptor.name) {
            return Err(ChatOpsError::Config(format!(
                "invalid command name '{}'",
                descriptor.name
            )));
        }
        if self.entries.contains_key(&descriptor.name) {
            return Err(ChatOpsError::Config(format!(
                "command '{}' registered twice",
                descriptor.name
            )));
        }
        self.entries
            .insert(descriptor.name.clone(), (descriptor, Arc::new(factory)));
        Ok(())
    }

    /// Register the `help` command over a snapshot of the current catalog.
    pub fn with_help(mut self) -> Result<Self> {
        let catalog = Arc::new(self.descriptors());
        self.register(HelpCommand::descriptor(), move || {
            Box::new(HelpCommand::new(catalog.clone()))
        })?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn descriptors(&self) -> Vec<CommandDescriptor> {
        self.entries.values().map(|(d, _)| d.clone()).collect()
    }

    pub fn build(&self, name: &str) -> Result<Box<dyn RecursiveCommand>> {
        let (_, factory) = self
            .entries
            .get(name)
            .ok_or_else(|| ChatOpsError::UnknownCommand(name.to_string()))?;
        Ok(factory())
    }

    /// Rebuild the named command and drive one turn of it.
    pub async fn dispatch(
        &self,
        invocation: CommandInvocation,
        ctx: &CommandContext,
    ) -> Result<DispatchResult> {
        let command = self.build(&invocation.command)?;
        info!(command = %invocation.command, params = invocation.params.len(), "dispatching");
        let mut request = RecursiveParameterRequest::new(command, invocation);
        let outcome = request.handle(ctx).await?;
        Ok(DispatchResult {
            correlation_id: request
                .invocation()
                .correlation_id
                .clone()
                .unwrap_or_default(),
            outcome,
        })
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::InMemoryMessageClient;
    use crate::params::ParameterSet;
    use async_trait::async_trait;

    struct Noop {
        params: ParameterSet,
    }

    #[async_trait]
    impl RecursiveCommand for Noop {
        fn name(&self) -> &str {
            "noop"
        }

        fn parameters(&self) -> &ParameterSet {
            &self.params
        }

        async fn run(&mut self, _ctx: &CommandContext, _inv: &CommandInvocation) -> Result<()> {
            Ok(())
        }
    }

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry
            .register(CommandDescriptor::new("noop", "General", "Does nothing"), || {
                Box::new(Noop {
                    params: ParameterSet::new(),
                })
            })
            .unwrap();
        registry
    }

    #[test]
    fn command_names_are_validated() {
        assert!(is_valid_command_name("request-environments"));
        assert!(!is_valid_command_name("bad name"));
        assert!(!is_valid_command_name(""));

        let mut registry = registry();
        let err = registry.register(CommandDescriptor::new("noop", "x", "y"), || {
            Box::new(Noop {
                params: ParameterSet::new(),
            })
        });
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn dispatch_generates_correlation_id() {
        let client = Arc::new(InMemoryMessageClient::new());
        let ctx = CommandContext::new(client);
        let result = registry()
            .dispatch(CommandInvocation::new("noop"), &ctx)
            .await
            .unwrap();
        assert_eq!(result.outcome, HandleOutcome::Completed);
        assert!(!result.correlation_id.is_empty());
    }

    #[tokio::test]
    async fn unknown_command_is_an_error() {
        let ctx = CommandContext::new(Arc::new(InMemoryMessageClient::new()));
        let err = registry()
            .dispatch(CommandInvocation::new("missing"), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatOpsError::UnknownCommand(ref n) if n == "missing"));
    }

    #[test]
    fn with_help_adds_help_command() {
        let registry = registry().with_help().unwrap();
        assert!(registry.contains("help"));
        assert_eq!(registry.descriptors().len(), 2);
    }
}
