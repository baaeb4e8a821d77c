//! The resume token carried through every chat round trip.
//!
//! A `CommandInvocation` is everything a later turn needs to continue: which
//! command to rebuild, which message to edit, and the parameters known so
//! far. It is embedded in every action button, so nothing has to survive in
//! memory between turns.

use crate::error::{ChatOpsError, Result};
use crate::message::MessageOptions;
use crate::params::ParameterBag;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Render the running parameter summary with every prompt and before running.
    #[default]
    Show,
    Hide,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DisplayMode::Show => "show",
            DisplayMode::Hide => "hide",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInvocation {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayMode>,
    #[serde(default)]
    pub params: ParameterBag,
}

impl CommandInvocation {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            correlation_id: None,
            display: None,
            params: ParameterBag::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_display(mut self, display: DisplayMode) -> Self {
        self.display = Some(display);
        self
    }

    /// Generate a correlation id on the first turn; keep the existing one after that.
    pub fn ensure_correlation_id(&mut self) -> &str {
        self.correlation_id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display.unwrap_or_default()
    }

    /// Non-blank value of `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn require(&self, name: &str) -> Result<&str> {
        self.param(name).ok_or_else(|| {
            ChatOpsError::UserInput(format!("Missing required parameter '{name}'"))
        })
    }

    /// Options addressing this invocation's message.
    pub fn message_options(&self) -> MessageOptions {
        MessageOptions::new(self.correlation_id.clone().unwrap_or_default())
    }

    /// Copy of this invocation with one more parameter filled in.
    pub fn continued_with(&self, name: &str, value: &str) -> Self {
        let mut next = self.clone();
        next.params.insert(name.to_string(), value.to_string());
        next
    }
}
