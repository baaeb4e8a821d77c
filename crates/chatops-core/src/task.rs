use crate::context::CommandContext;
use crate::error::{ChatOpsError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn glyph(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "•",
            TaskStatus::Running => "⏳",
            TaskStatus::Succeeded => "✅",
            TaskStatus::Failed => "❌",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }

    fn can_move_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Running, TaskStatus::Succeeded)
                | (TaskStatus::Running, TaskStatus::Failed)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// TaskRow
// ---------------------------------------------------------------------------

/// Index of a row in a task list, returned when the row is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle(pub(crate) usize);

impl TaskHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRow {
    pub description: String,
    pub status: TaskStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub failure: Option<String>,
}

impl TaskRow {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            status: TaskStatus::Pending,
            started_at: None,
            finished_at: None,
            failure: None,
        }
    }

    /// Move to `next`, allowing only pending → running → succeeded | failed.
    pub fn transition(&mut self, next: TaskStatus) -> Result<()> {
        if !self.status.can_move_to(next) {
            return Err(ChatOpsError::InvalidTransition {
                task: self.description.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        match next {
            TaskStatus::Running => self.started_at = Some(Utc::now()),
            TaskStatus::Succeeded | TaskStatus::Failed => self.finished_at = Some(Utc::now()),
            TaskStatus::Pending => {}
        }
        self.status = next;
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut line = format!("{} {}", self.status.glyph(), self.description);
        if let Some(reason) = &self.failure {
            line.push_str(&format!("\n      _{reason}_"));
        }
        line
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// One unit of work run by a `TaskRunner`. Returning `Err` marks the row
/// failed and stops the run.
#[async_trait]
pub trait Task: Send + Sync {
    fn description(&self) -> String;

    async fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_lifecycle() {
        let mut row = TaskRow::new("Create namespace");
        assert_eq!(row.status, TaskStatus::Pending);

        row.transition(TaskStatus::Running).unwrap();
        assert!(row.started_at.is_some());

        row.transition(TaskStatus::Succeeded).unwrap();
        assert!(row.finished_at.is_some());
        assert!(row.status.is_terminal());
    }

    #[test]
    fn rows_are_never_rerun() {
        let mut row = TaskRow::new("Create namespace");
        row.transition(TaskStatus::Running).unwrap();
        row.transition(TaskStatus::Failed).unwrap();
        assert!(row.transition(TaskStatus::Running).is_err());
    }

    #[test]
    fn pending_cannot_skip_running() {
        let mut row = TaskRow::new("Create namespace");
        let err = row.transition(TaskStatus::Succeeded).unwrap_err();
        assert!(err.to_string().contains("pending"));
    }

    #[test]
    fn render_includes_failure_reason() {
        let mut row = TaskRow::new("Create namespace");
        row.failure = Some("quota exceeded".into());
        row.status = TaskStatus::Failed;
        assert_eq!(row.render(), "❌ Create namespace\n      _quota exceeded_");
    }
}
