use crate::message::{ActionButton, ChatMessage, MessageLevel};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatOpsError {
    #[error("not initialized: no config found at {0}")]
    NotInitialized(String),

    #[error("{0}")]
    UserInput(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("invalid parameters for '{command}': {reason}")]
    InvalidParameters { command: String, reason: String },

    #[error("resolver for '{0}' reported success without setting a value")]
    ResolverStalled(String),

    #[error("task '{task}' failed: {reason}")]
    TaskFailed { task: String, reason: String },

    #[error("task not found: {0}")]
    TaskNotFound(usize),

    #[error("invalid transition for task '{task}' from {from} to {to}")]
    InvalidTransition {
        task: String,
        from: String,
        to: String,
    },

    #[error("external dependency unavailable: {0}")]
    Transport(String),

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Http(reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChatOpsError>;

const RETRY_TEXT: &str = "Retry the whole request from the first step";

impl From<reqwest::Error> for ChatOpsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ChatOpsError::Transport(err.to_string())
        } else {
            ChatOpsError::Http(err)
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Coarse classification used to pick the wording of the chat failure notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UserInput,
    TaskFailure,
    Transport,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UserInput => "user_input",
            ErrorKind::TaskFailure => "task_failure",
            ErrorKind::Transport => "transport",
            ErrorKind::Internal => "internal",
        }
    }
}

impl ChatOpsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatOpsError::UserInput(_)
            | ChatOpsError::UnknownCommand(_)
            | ChatOpsError::InvalidParameters { .. }
            | ChatOpsError::ResolverStalled(_) => ErrorKind::UserInput,
            ChatOpsError::TaskFailed { .. } => ErrorKind::TaskFailure,
            ChatOpsError::Transport(_) => ErrorKind::Transport,
            ChatOpsError::NotInitialized(_)
            | ChatOpsError::TaskNotFound(_)
            | ChatOpsError::InvalidTransition { .. }
            | ChatOpsError::Config(_)
            | ChatOpsError::Http(_)
            | ChatOpsError::Io(_)
            | ChatOpsError::Yaml(_)
            | ChatOpsError::Json(_) => ErrorKind::Internal,
        }
    }

    /// The single plain-language message shown in chat for this failure.
    pub fn to_chat_message(&self) -> ChatMessage {
        let text = match self.kind() {
            ErrorKind::UserInput => format!(":warning: {self}"),
            ErrorKind::TaskFailure => match self {
                ChatOpsError::TaskFailed { task, reason } => {
                    format!(":x: Step *{task}* failed: {reason}")
                }
                other => format!(":x: {other}"),
            },
            ErrorKind::Transport => format!(
                ":electric_plug: An external dependency is unavailable, please try again later. ({self})"
            ),
            ErrorKind::Internal => {
                ":x: Something went wrong while handling your request.".to_string()
            }
        };
        ChatMessage::error(text)
    }

    /// Failure notice with a button that replays the original invocation.
    pub fn to_chat_message_with_retry(&self, retry: ActionButton) -> ChatMessage {
        let mut message = self.to_chat_message();
        message.push_actions(RETRY_TEXT, vec![retry]);
        message
    }

    /// `message` with this failure's notice (and retry button) added below
    /// what it already shows.
    pub fn append_to(&self, mut message: ChatMessage, retry: Option<ActionButton>) -> ChatMessage {
        message.level = MessageLevel::Error;
        message.push_text(None, self.to_chat_message().text);
        if let Some(retry) = retry {
            message.push_actions(RETRY_TEXT, vec![retry]);
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_input_errors_show_their_text() {
        let err = ChatOpsError::UserInput("select a team first".into());
        assert_eq!(err.kind(), ErrorKind::UserInput);
        assert!(err.to_chat_message().text.contains("select a team first"));
    }

    #[test]
    fn task_failure_references_step() {
        let err = ChatOpsError::TaskFailed {
            task: "Create dev namespace".into(),
            reason: "quota exceeded".into(),
        };
        let text = err.to_chat_message().text;
        assert!(text.contains("Create dev namespace"));
        assert!(text.contains("quota exceeded"));
    }

    #[test]
    fn transport_errors_say_dependency_is_down() {
        let err = ChatOpsError::Transport("connection refused".into());
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err
            .to_chat_message()
            .text
            .contains("external dependency is unavailable"));
    }

    #[test]
    fn appended_failure_keeps_existing_content() {
        let mut base = ChatMessage::new("*Creating environments*");
        base.push_text(None, "✅ Create dev environment\n❌ Create sit environment");
        let err = ChatOpsError::TaskFailed {
            task: "Create sit environment".into(),
            reason: "quota".into(),
        };
        let retry = ActionButton {
            label: "Retry".into(),
            invocation: crate::invocation::CommandInvocation::new("foo"),
        };
        let message = err.append_to(base, Some(retry));
        let plain = message.render_plain();
        assert!(plain.contains("✅ Create dev environment"));
        assert!(plain.contains("Step *Create sit environment* failed: quota"));
        assert_eq!(message.level, MessageLevel::Error);
        assert_eq!(message.actions().count(), 1);
    }

    #[test]
    fn internal_errors_get_generic_notice() {
        let err = ChatOpsError::Config("bad".into());
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_chat_message().text.contains("Something went wrong"));
    }
}
