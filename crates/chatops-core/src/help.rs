//! Built-in `help` command: pick a category, then get a button per command.

use crate::context::CommandContext;
use crate::engine::RecursiveCommand;
use crate::error::{ChatOpsError, Result};
use crate::invocation::CommandInvocation;
use crate::message::{ActionButton, ChatMessage, ChatPrompt};
use crate::params::{ParameterSet, ParameterSpec};
use crate::registry::CommandDescriptor;
use crate::setter::{ParameterSetter, RecursiveSetterResult, SetterRequest};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

pub const HELP_COMMAND: &str = "help";
pub const CATEGORY_PARAM: &str = "category";

pub struct HelpCommand {
    catalog: Arc<Vec<CommandDescriptor>>,
    params: ParameterSet,
}

impl HelpCommand {
    pub fn new(catalog: Arc<Vec<CommandDescriptor>>) -> Self {
        let setter = Arc::new(CategorySetter {
            catalog: catalog.clone(),
        });
        let params = ParameterSet::new().with(
            ParameterSpec::recursive(CATEGORY_PARAM, 0, setter)
                .label("Category")
                .selection_message("Please select a help category"),
        );
        Self { catalog, params }
    }

    pub fn descriptor() -> CommandDescriptor {
        CommandDescriptor::new(HELP_COMMAND, "General", "Browse available commands")
    }
}

#[async_trait]
impl RecursiveCommand for HelpCommand {
    fn name(&self) -> &str {
        HELP_COMMAND
    }

    fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    fn title(&self) -> String {
        "*Help*".to_string()
    }

    async fn run(&mut self, ctx: &CommandContext, invocation: &CommandInvocation) -> Result<()> {
        let category = invocation.require(CATEGORY_PARAM)?;
        let commands: Vec<&CommandDescriptor> = self
            .catalog
            .iter()
            .filter(|d| d.category == category)
            .collect();
        if commands.is_empty() {
            return Err(ChatOpsError::UserInput(format!(
                "There is no help category called '{category}'"
            )));
        }

        let mut message = ChatMessage::new(format!("*Help: {category}*"));
        for descriptor in commands {
            message.push_actions(
                format!("`{}` {}", descriptor.name, descriptor.description),
                vec![ActionButton {
                    label: format!("Run {}", descriptor.name),
                    invocation: CommandInvocation::new(descriptor.name.clone()),
                }],
            );
        }
        ctx.client
            .respond(&message, &invocation.message_options())
            .await
    }
}

struct CategorySetter {
    catalog: Arc<Vec<CommandDescriptor>>,
}

#[async_trait]
impl ParameterSetter for CategorySetter {
    async fn resolve(
        &self,
        _ctx: &CommandContext,
        request: SetterRequest<'_>,
    ) -> Result<RecursiveSetterResult> {
        let categories: BTreeSet<&str> = self.catalog.iter().map(|d| d.category.as_str()).collect();
        match categories.len() {
            0 => Err(ChatOpsError::UserInput(
                "No commands are registered".to_string(),
            )),
            1 => Ok(RecursiveSetterResult::resolved(
                request.parameter,
                categories.into_iter().next().unwrap_or_default(),
            )),
            _ => Ok(RecursiveSetterResult::Prompt(ChatPrompt::menu(
                request.prompt_text("Please select a help category"),
                categories,
            ))),
        }
    }
}
