//! Team and project lookups used by the built-in resolvers.
//!
//! The production bot asks the domain service for these; here the lookup is a
//! trait with an in-memory implementation loaded from config.

use crate::config::DirectoryConfig;
use crate::error::{ChatOpsError, Result};
use async_trait::async_trait;

#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn teams(&self) -> Result<Vec<String>>;

    /// Teams whose chat channel list contains `channel`.
    async fn teams_for_channel(&self, channel: &str) -> Result<Vec<String>>;

    async fn projects(&self, team: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    config: DirectoryConfig,
}

impl InMemoryDirectory {
    pub fn new(config: DirectoryConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TeamDirectory for InMemoryDirectory {
    async fn teams(&self) -> Result<Vec<String>> {
        Ok(self.config.teams.iter().map(|t| t.name.clone()).collect())
    }

    async fn teams_for_channel(&self, channel: &str) -> Result<Vec<String>> {
        Ok(self
            .config
            .teams
            .iter()
            .filter(|t| t.channels.iter().any(|c| c == channel))
            .map(|t| t.name.clone())
            .collect())
    }

    async fn projects(&self, team: &str) -> Result<Vec<String>> {
        self.config
            .teams
            .iter()
            .find(|t| t.name == team)
            .map(|t| t.projects.clone())
            .ok_or_else(|| ChatOpsError::UserInput(format!("Team '{team}' does not exist")))
    }
}
