//! Multi-turn parameter resolution for one command invocation.
//!
//! A chat turn calls [`RecursiveParameterRequest::handle`]. The engine walks
//! the command's recursive parameters in call order and asks the resolver of
//! the first empty one for a value. Resolvers that can derive a value answer
//! immediately and the engine moves on within the same turn. A resolver that
//! needs the user returns a prompt; the engine sends it and the turn ends.
//! The next turn arrives as a fresh invocation (from a button payload) with
//! every earlier value intact. Once nothing force-set is missing, the
//! command's business method runs exactly once.
//!
//! # Turn sequence
//!
//! ```text
//! handle ─► setup (once) ─► correlation id ─► display mode
//!    │
//!    ▼
//!  next unresolved? ──no──► inputs present ─► summary ─► run ─► Completed
//!    │yes
//!    ▼
//!  resolver ──Resolved──► apply updates ─► loop
//!    │Prompt
//!    ▼
//!  respond(summary + buttons) ─► Prompted
//! ```

use crate::context::CommandContext;
use crate::error::{ChatOpsError, ErrorKind, Result};
use crate::invocation::{CommandInvocation, DisplayMode};
use crate::message::{ActionButton, ChatMessage, Destination, MessageOptions};
use crate::messaging::MessageClient;
use crate::params::{is_empty_value, ParameterKind, ParameterSet};
use crate::setter::{RecursiveSetterResult, SetterRequest};
use crate::summary::ParameterStatusDisplay;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// A chat command whose parameters are collected by the engine.
#[async_trait]
pub trait RecursiveCommand: Send + Sync {
    /// Registered command name; button payloads re-dispatch to it.
    fn name(&self) -> &str;

    fn parameters(&self) -> &ParameterSet;

    /// Heading of every message this command writes.
    fn title(&self) -> String {
        format!("*{}*", self.name())
    }

    /// Runs once per instance before any parameter is resolved.
    async fn setup(&mut self, _ctx: &CommandContext) -> Result<()> {
        Ok(())
    }

    /// Business method. Called once, with every force-set parameter present.
    async fn run(&mut self, ctx: &CommandContext, invocation: &CommandInvocation) -> Result<()>;
}

/// What one turn ended with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HandleOutcome {
    /// A prompt for `parameter` was sent; the next turn is the user's answer.
    Prompted { parameter: String },
    /// The business method ran.
    Completed,
    /// The failure was reported in chat.
    Failed { kind: ErrorKind, message: String },
}

pub struct RecursiveParameterRequest {
    command: Box<dyn RecursiveCommand>,
    invocation: CommandInvocation,
    setup_done: bool,
    display: ParameterStatusDisplay,
}

impl RecursiveParameterRequest {
    pub fn new(command: Box<dyn RecursiveCommand>, invocation: CommandInvocation) -> Self {
        Self {
            command,
            invocation,
            setup_done: false,
            display: ParameterStatusDisplay::default(),
        }
    }

    pub fn invocation(&self) -> &CommandInvocation {
        &self.invocation
    }

    pub fn display(&self) -> &ParameterStatusDisplay {
        &self.display
    }

    /// Drive one chat turn. Failures are reported to the user as one message
    /// on the invocation's correlation id and come back as
    /// [`HandleOutcome::Failed`]; `Err` means that report could not be sent.
    pub async fn handle(&mut self, ctx: &CommandContext) -> Result<HandleOutcome> {
        let correlation_id = self.invocation.ensure_correlation_id().to_string();
        info!(
            command = self.command.name(),
            correlation_id = %correlation_id,
            "handling command turn"
        );

        let turn = Arc::new(TurnClient {
            inner: ctx.client.clone(),
            correlation_id: correlation_id.clone(),
            last: Mutex::new(None),
        });
        let turn_ctx = CommandContext {
            client: turn.clone(),
            ..ctx.clone()
        };

        match self.drive(&turn_ctx).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(
                    command = self.command.name(),
                    correlation_id = %correlation_id,
                    kind = err.kind().as_str(),
                    error = %err,
                    "command failed"
                );
                let retry = (err.kind() == ErrorKind::TaskFailure).then(|| ActionButton {
                    label: "Retry".to_string(),
                    invocation: self.invocation.clone(),
                });
                // Keep whatever this turn already showed, e.g. the task list.
                let message = match turn.last() {
                    Some(shown) => err.append_to(shown, retry),
                    None => match retry {
                        Some(retry) => err.to_chat_message_with_retry(retry),
                        None => err.to_chat_message(),
                    },
                };
                ctx.client
                    .respond(&message, &MessageOptions::new(correlation_id))
                    .await?;
                Ok(HandleOutcome::Failed {
                    kind: err.kind(),
                    message: err.to_string(),
                })
            }
        }
    }

    async fn drive(&mut self, ctx: &CommandContext) -> Result<HandleOutcome> {
        if !self.setup_done {
            self.command.parameters().validate(self.command.name())?;
            self.command.setup(ctx).await?;
            self.setup_done = true;
        }
        if self.invocation.display.is_none() {
            self.invocation.display = Some(DisplayMode::Show);
        }

        loop {
            self.display =
                ParameterStatusDisplay::build(self.command.parameters(), &self.invocation.params);

            let Some(spec) = self
                .command
                .parameters()
                .next_unresolved(&self.invocation.params)
            else {
                break;
            };
            let name = spec.name.clone();
            let ParameterKind::Recursive {
                setter,
                selection_message,
            } = spec.kind.clone()
            else {
                break;
            };

            let result = setter
                .resolve(
                    ctx,
                    SetterRequest {
                        command: self.command.name(),
                        parameter: &name,
                        selection_message: selection_message.as_deref(),
                        params: &self.invocation.params,
                    },
                )
                .await?;

            match result {
                RecursiveSetterResult::Resolved(updates) => {
                    let ignored = updates.apply_to(&mut self.invocation.params);
                    if !ignored.is_empty() {
                        debug!(parameter = %name, ?ignored, "resolver tried to replace set values");
                    }
                    if is_empty_value(self.invocation.params.get(&name)) {
                        return Err(ChatOpsError::ResolverStalled(name));
                    }
                    debug!(parameter = %name, "parameter resolved without prompting");
                }
                RecursiveSetterResult::Prompt(prompt) => {
                    let mut message = self.summary_message();
                    message.push_section(prompt.bind(&name, &self.invocation));
                    ctx.client.respond(&message, &self.message_options()).await?;
                    debug!(parameter = %name, choices = prompt.choices.len(), "prompt sent");
                    return Ok(HandleOutcome::Prompted { parameter: name });
                }
            }
        }

        if let Some(spec) = self
            .command
            .parameters()
            .missing_input(&self.invocation.params)
        {
            return Err(ChatOpsError::UserInput(format!(
                "Missing required parameter '{}'",
                spec.display_name()
            )));
        }

        if self.invocation.display_mode() == DisplayMode::Show && !self.display.is_empty() {
            let mut message = self.summary_message();
            message.push_text(None, "All parameters set, running...");
            ctx.client.respond(&message, &self.message_options()).await?;
        }

        self.command.run(ctx, &self.invocation).await?;
        Ok(HandleOutcome::Completed)
    }

    fn summary_message(&self) -> ChatMessage {
        match self.invocation.display_mode() {
            DisplayMode::Show => self.display.to_message(&self.command.title()),
            DisplayMode::Hide => ChatMessage::new(self.command.title()),
        }
    }

    fn message_options(&self) -> MessageOptions {
        MessageOptions::new(self.invocation.correlation_id.clone().unwrap_or_default())
    }
}

/// Passes writes through and remembers the last one made on the turn's own
/// message.
struct TurnClient {
    inner: Arc<dyn MessageClient>,
    correlation_id: String,
    last: Mutex<Option<ChatMessage>>,
}

impl TurnClient {
    fn remember(&self, message: &ChatMessage, options: &MessageOptions) {
        if options.correlation_id == self.correlation_id {
            *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.clone());
        }
    }

    fn last(&self) -> Option<ChatMessage> {
        self.last.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl MessageClient for TurnClient {
    async fn send(
        &self,
        message: &ChatMessage,
        destination: &Destination,
        options: &MessageOptions,
    ) -> Result<()> {
        self.inner.send(message, destination, options).await?;
        self.remember(message, options);
        Ok(())
    }

    async fn respond(&self, message: &ChatMessage, options: &MessageOptions) -> Result<()> {
        self.inner.respond(message, options).await?;
        self.remember(message, options);
        Ok(())
    }
}
