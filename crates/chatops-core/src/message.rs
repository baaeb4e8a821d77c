use crate::invocation::CommandInvocation;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    #[default]
    Info,
    Success,
    Error,
}

/// Transport-neutral chat message: a text body plus titled sections, each of
/// which may carry action buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    #[serde(default)]
    pub level: MessageLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<MessageSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionButton>,
}

/// A button whose activation re-dispatches `invocation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    pub label: String,
    pub invocation: CommandInvocation,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Error,
            sections: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: MessageLevel) -> Self {
        self.level = level;
        self
    }

    pub fn push_section(&mut self, section: MessageSection) {
        self.sections.push(section);
    }

    pub fn push_text(&mut self, title: Option<&str>, text: impl Into<String>) {
        self.sections.push(MessageSection {
            title: title.map(str::to_string),
            text: text.into(),
            actions: Vec::new(),
        });
    }

    pub fn push_actions(&mut self, text: impl Into<String>, actions: Vec<ActionButton>) {
        self.sections.push(MessageSection {
            title: None,
            text: text.into(),
            actions,
        });
    }

    /// Every button in the message, in display order.
    pub fn actions(&self) -> impl Iterator<Item = &ActionButton> {
        self.sections.iter().flat_map(|s| s.actions.iter())
    }

    /// Plain-text rendering for terminals and logs.
    pub fn render_plain(&self) -> String {
        let mut out = self.text.clone();
        for section in &self.sections {
            if let Some(title) = &section.title {
                out.push_str(&format!("\n\n*{title}*"));
            }
            if !section.text.is_empty() {
                out.push('\n');
                out.push_str(&section.text);
            }
            for action in &section.actions {
                out.push_str(&format!("\n  [{}]", action.label));
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// ChatPrompt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStyle {
    Buttons,
    Menu,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptChoice {
    pub label: String,
    pub value: String,
}

/// A request for the user to pick the value of one parameter.
///
/// Resolvers build prompts without knowing the resume token; the engine binds
/// each choice to a full invocation when the prompt is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub text: String,
    pub style: PromptStyle,
    pub choices: Vec<PromptChoice>,
}

impl ChatPrompt {
    pub fn buttons<I, S>(text: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_values(text, PromptStyle::Buttons, values)
    }

    pub fn menu<I, S>(text: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_values(text, PromptStyle::Menu, values)
    }

    fn from_values<I, S>(text: impl Into<String>, style: PromptStyle, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices = values
            .into_iter()
            .map(|v| {
                let value: String = v.into();
                PromptChoice {
                    label: value.clone(),
                    value,
                }
            })
            .collect();
        Self {
            text: text.into(),
            style,
            choices,
        }
    }

    /// Turn the prompt into a section whose buttons continue `base` with
    /// `parameter` set to the chosen value.
    pub fn bind(&self, parameter: &str, base: &CommandInvocation) -> MessageSection {
        let actions = self
            .choices
            .iter()
            .map(|c| ActionButton {
                label: c.label.clone(),
                invocation: base.continued_with(parameter, &c.value),
            })
            .collect();
        MessageSection {
            title: None,
            text: self.text.clone(),
            actions,
        }
    }
}

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

/// Where a new message is posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Destination {
    Channel { name: String },
    User { name: String },
}

/// Options attached to every write. `correlation_id` identifies the message to
/// edit in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageOptions {
    pub correlation_id: String,
}

impl MessageOptions {
    pub fn new(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
        }
    }
}
