//! Sequential executor over a [`TaskListMessage`].
//!
//! Tasks run one at a time in the order they were added. The first failure
//! marks its row failed and stops the run; later rows stay pending and their
//! work is never started. There is no timeout or cancellation here, and no
//! de-duplication of side effects if the same list is run again.

use crate::context::CommandContext;
use crate::error::{ChatOpsError, Result};
use crate::task::{Task, TaskHandle, TaskStatus};
use crate::task_list::TaskListMessage;
use std::time::Instant;
use tracing::{info, warn};

pub struct TaskRunner {
    message: TaskListMessage,
    queue: Vec<(TaskHandle, Box<dyn Task>)>,
}

impl TaskRunner {
    pub fn new(message: TaskListMessage) -> Self {
        Self {
            message,
            queue: Vec::new(),
        }
    }

    /// Queue `task` and register its row.
    pub fn add_task(&mut self, task: impl Task + 'static) -> TaskHandle {
        let handle = self.message.add_task(task.description());
        self.queue.push((handle, Box::new(task)));
        handle
    }

    pub async fn execute(&mut self, ctx: &CommandContext) -> Result<()> {
        self.message.display().await?;

        for (handle, task) in &self.queue {
            let description = task.description();
            self.message
                .set_task_status(*handle, TaskStatus::Running)
                .await?;
            let started = Instant::now();

            match task.execute(ctx).await {
                Ok(()) => {
                    info!(
                        task = %description,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "task succeeded"
                    );
                    self.message
                        .set_task_status(*handle, TaskStatus::Succeeded)
                        .await?;
                }
                Err(e) => {
                    let reason = match &e {
                        ChatOpsError::TaskFailed { reason, .. } => reason.clone(),
                        other => other.to_string(),
                    };
                    warn!(
                        task = %description,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        error = %reason,
                        "task failed, remaining tasks skipped"
                    );
                    self.message.fail_task(*handle, reason.clone()).await?;
                    return Err(ChatOpsError::TaskFailed {
                        task: description,
                        reason,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn message(&self) -> &TaskListMessage {
        &self.message
    }
}
