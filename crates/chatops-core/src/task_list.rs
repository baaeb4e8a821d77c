//! A single chat message rendering an ordered checklist of tasks.
//!
//! Every status change re-renders the whole list and edits the same message,
//! addressed by the correlation id in `MessageOptions`. Rows keep the order
//! they were added in; only their status changes afterwards.

use crate::error::{ChatOpsError, Result};
use crate::message::{ChatMessage, Destination, MessageLevel, MessageOptions, MessageSection};
use crate::messaging::MessageClient;
use crate::task::{TaskHandle, TaskRow, TaskStatus};
use std::sync::Arc;

pub struct TaskListMessage {
    title: String,
    client: Arc<dyn MessageClient>,
    options: MessageOptions,
    destination: Option<Destination>,
    rows: Vec<TaskRow>,
}

impl TaskListMessage {
    pub fn new(
        title: impl Into<String>,
        client: Arc<dyn MessageClient>,
        options: MessageOptions,
    ) -> Self {
        Self {
            title: title.into(),
            client,
            options,
            destination: None,
            rows: Vec::new(),
        }
    }

    /// Post to `destination` instead of replying in the invoking conversation.
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn add_task(&mut self, description: impl Into<String>) -> TaskHandle {
        self.rows.push(TaskRow::new(description));
        TaskHandle(self.rows.len() - 1)
    }

    pub async fn set_task_status(&mut self, handle: TaskHandle, status: TaskStatus) -> Result<()> {
        self.row_mut(handle)?.transition(status)?;
        self.display().await
    }

    /// Mark the row failed and show `reason` under it.
    pub async fn fail_task(&mut self, handle: TaskHandle, reason: impl Into<String>) -> Result<()> {
        let row = self.row_mut(handle)?;
        row.transition(TaskStatus::Failed)?;
        row.failure = Some(reason.into());
        self.display().await
    }

    pub async fn display(&self) -> Result<()> {
        let message = self.render();
        match &self.destination {
            Some(dest) => self.client.send(&message, dest, &self.options).await,
            None => self.client.respond(&message, &self.options).await,
        }
    }

    pub fn render(&self) -> ChatMessage {
        let body = self
            .rows
            .iter()
            .map(TaskRow::render)
            .collect::<Vec<_>>()
            .join("\n");
        let mut message = ChatMessage::new(self.title.clone()).with_level(self.level());
        message.push_section(MessageSection {
            title: None,
            text: body,
            actions: Vec::new(),
        });
        message.push_text(None, self.summary());
        message
    }

    /// "2/3 completed" style footer.
    pub fn summary(&self) -> String {
        let done = self
            .rows
            .iter()
            .filter(|r| r.status == TaskStatus::Succeeded)
            .count();
        let mut line = format!("{done}/{} completed", self.rows.len());
        if let Some(failed) = self.rows.iter().find(|r| r.status == TaskStatus::Failed) {
            line.push_str(&format!(", stopped at '{}'", failed.description));
        }
        line
    }

    pub fn status(&self, handle: TaskHandle) -> Option<TaskStatus> {
        self.rows.get(handle.0).map(|r| r.status)
    }

    pub fn rows(&self) -> &[TaskRow] {
        &self.rows
    }

    pub fn options(&self) -> &MessageOptions {
        &self.options
    }

    fn level(&self) -> MessageLevel {
        if self.rows.iter().any(|r| r.status == TaskStatus::Failed) {
            MessageLevel::Error
        } else if !self.rows.is_empty() && self.rows.iter().all(|r| r.status == TaskStatus::Succeeded)
        {
            MessageLevel::Success
        } else {
            MessageLevel::Info
        }
    }

    fn row_mut(&mut self, handle: TaskHandle) -> Result<&mut TaskRow> {
        self.rows
            .get_mut(handle.0)
            .ok_or(ChatOpsError::TaskNotFound(handle.0))
    }
}
