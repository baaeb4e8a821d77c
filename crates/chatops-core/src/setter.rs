//! Resolver contract for recursive parameters.

use crate::context::CommandContext;
use crate::error::Result;
use crate::message::ChatPrompt;
use crate::params::{ParameterBag, ParameterUpdates};
use async_trait::async_trait;

/// What a resolver decided for its parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecursiveSetterResult {
    /// Value(s) derived without asking the user.
    Resolved(ParameterUpdates),
    /// The user has to choose; the prompt re-invokes the command with the choice.
    Prompt(ChatPrompt),
}

impl RecursiveSetterResult {
    pub fn resolved(name: impl Into<String>, value: impl Into<String>) -> Self {
        RecursiveSetterResult::Resolved(ParameterUpdates::single(name, value))
    }

    pub fn setter_success(&self) -> bool {
        matches!(self, RecursiveSetterResult::Resolved(_))
    }

    pub fn message_prompt(&self) -> Option<&ChatPrompt> {
        match self {
            RecursiveSetterResult::Prompt(p) => Some(p),
            RecursiveSetterResult::Resolved(_) => None,
        }
    }
}

/// Read-only view handed to a resolver.
#[derive(Debug, Clone, Copy)]
pub struct SetterRequest<'a> {
    pub command: &'a str,
    pub parameter: &'a str,
    pub selection_message: Option<&'a str>,
    pub params: &'a ParameterBag,
}

impl<'a> SetterRequest<'a> {
    pub fn value(&self, name: &str) -> Option<&'a str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// The configured selection message, or `fallback`.
    pub fn prompt_text(&self, fallback: &str) -> String {
        self.selection_message.unwrap_or(fallback).to_string()
    }
}

#[async_trait]
pub trait ParameterSetter: Send + Sync {
    async fn resolve(
        &self,
        ctx: &CommandContext,
        request: SetterRequest<'_>,
    ) -> Result<RecursiveSetterResult>;
}

// ---------------------------------------------------------------------------
// StaticChoiceSetter
// ---------------------------------------------------------------------------

/// Offers a fixed list of values. A single choice is taken without asking.
#[derive(Debug, Clone)]
pub struct StaticChoiceSetter {
    choices: Vec<String>,
}

impl StaticChoiceSetter {
    pub fn new<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ParameterSetter for StaticChoiceSetter {
    async fn resolve(
        &self,
        _ctx: &CommandContext,
        request: SetterRequest<'_>,
    ) -> Result<RecursiveSetterResult> {
        if let [only] = self.choices.as_slice() {
            return Ok(RecursiveSetterResult::resolved(request.parameter, only));
        }
        let text = request.prompt_text(&format!("Please select a value for {}", request.parameter));
        Ok(RecursiveSetterResult::Prompt(ChatPrompt::buttons(
            text,
            self.choices.iter().cloned(),
        )))
    }
}

// ---------------------------------------------------------------------------
// FnSetter
// ---------------------------------------------------------------------------

/// Adapts a synchronous closure into a resolver.
pub struct FnSetter<F>(pub F);

#[async_trait]
impl<F> ParameterSetter for FnSetter<F>
where
    F: Fn(&CommandContext, SetterRequest<'_>) -> Result<RecursiveSetterResult> + Send + Sync,
{
    async fn resolve(
        &self,
        ctx: &CommandContext,
        request: SetterRequest<'_>,
    ) -> Result<RecursiveSetterResult> {
        (self.0)(ctx, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::InMemoryMessageClient;
    use std::sync::Arc;

    fn ctx() -> CommandContext {
        CommandContext::new(Arc::new(InMemoryMessageClient::new()))
    }

    #[tokio::test]
    async fn single_static_choice_resolves_without_prompt() {
        let bag = ParameterBag::new();
        let result = StaticChoiceSetter::new(["only"])
            .resolve(
                &ctx(),
                SetterRequest {
                    command: "foo",
                    parameter: "env",
                    selection_message: None,
                    params: &bag,
                },
            )
            .await
            .unwrap();
        assert!(result.setter_success());
        assert_eq!(result, RecursiveSetterResult::resolved("env", "only"));
    }

    #[tokio::test]
    async fn several_static_choices_prompt_with_selection_message() {
        let bag = ParameterBag::new();
        let result = StaticChoiceSetter::new(["dev", "prod"])
            .resolve(
                &ctx(),
                SetterRequest {
                    command: "foo",
                    parameter: "env",
                    selection_message: Some("Which environment?"),
                    params: &bag,
                },
            )
            .await
            .unwrap();
        assert!(!result.setter_success());
        let prompt = result.message_prompt().unwrap();
        assert_eq!(prompt.text, "Which environment?");
        assert_eq!(prompt.choices.len(), 2);
    }

    #[test]
    fn request_value_ignores_blank() {
        let mut bag = ParameterBag::new();
        bag.insert("team".into(), " ".into());
        let req = SetterRequest {
            command: "foo",
            parameter: "project",
            selection_message: None,
            params: &bag,
        };
        assert_eq!(req.value("team"), None);
    }
}
