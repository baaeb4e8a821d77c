use crate::error::{ChatOpsError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    pub team: String,
    pub project: String,
    pub environment: String,
}

/// Creates one environment for a project.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn provision(&self, request: &ProvisionRequest) -> Result<()>;
}

/// Logs what would be provisioned and records it. Environments marked with
/// [`DryRunProvisioner::failing_on`] fail instead.
#[derive(Debug, Default)]
pub struct DryRunProvisioner {
    failing: BTreeSet<String>,
    requests: Mutex<Vec<ProvisionRequest>>,
}

impl DryRunProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, environment: impl Into<String>) -> Self {
        self.failing.insert(environment.into());
        self
    }

    pub fn requests(&self) -> Vec<ProvisionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Provisioner for DryRunProvisioner {
    async fn provision(&self, request: &ProvisionRequest) -> Result<()> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        if self.failing.contains(&request.environment) {
            return Err(ChatOpsError::TaskFailed {
                task: request.environment.clone(),
                reason: format!("environment '{}' is unavailable", request.environment),
            });
        }
        info!(
            team = %request.team,
            project = %request.project,
            environment = %request.environment,
            "dry run: environment provisioned"
        );
        Ok(())
    }
}
