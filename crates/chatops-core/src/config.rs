use crate::error::{ChatOpsError, Result};
use crate::invocation::DisplayMode;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_bot_name")]
    pub name: String,
}

fn default_bot_name() -> String {
    "chatops".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Summary display used when an invocation does not choose one.
    #[serde(default)]
    pub default: DisplayMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamConfig {
    pub name: String,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub teams: Vec<TeamConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Messages the server keeps for `/api/messages`; older ones are dropped.
    #[serde(default = "default_retained_messages")]
    pub retained_messages: usize,
}

fn default_retained_messages() -> usize {
    500
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            retained_messages: default_retained_messages(),
        }
    }
}

fn default_environments() -> Vec<String> {
    ["dev", "sit", "uat"].iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayConfig>,
    #[serde(default = "default_environments")]
    pub environments: Vec<String>,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self::new(default_bot_name())
    }
}

impl Config {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            version: default_version(),
            bot: BotConfig {
                name: bot_name.into(),
            },
            display: DisplayConfig::default(),
            gateway: None,
            environments: default_environments(),
            directory: DirectoryConfig::default(),
            server: ServerConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(ChatOpsError::NotInitialized(path.display().to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(ChatOpsError::NotInitialized(_)) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.environments.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no environments configured; request-environments will do nothing"
                    .to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        for env in &self.environments {
            if !seen.insert(env.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("environment '{env}' listed more than once"),
                });
            }
        }

        if let Some(gateway) = &self.gateway {
            if !(gateway.url.starts_with("http://") || gateway.url.starts_with("https://")) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("gateway url '{}' is not an http(s) url", gateway.url),
                });
            }
            if gateway.timeout_secs == 0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "gateway timeout_secs must be greater than zero".to_string(),
                });
            }
        }

        if self.server.retained_messages == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "server retained_messages must be greater than zero".to_string(),
            });
        }

        let mut names = BTreeSet::new();
        let mut channel_owners: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for team in &self.directory.teams {
            if team.name.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "directory contains a team with an empty name".to_string(),
                });
                continue;
            }
            if !names.insert(team.name.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("team '{}' is defined more than once", team.name),
                });
            }
            if team.projects.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("team '{}' has no projects", team.name),
                });
            }
            for channel in &team.channels {
                channel_owners
                    .entry(channel.as_str())
                    .or_default()
                    .push(team.name.as_str());
            }
        }
        // Shared channels are allowed; the team is then asked for.
        for (channel, owners) in channel_owners {
            if owners.len() > 1 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "channel '{channel}' is mapped to teams {}; users will be asked to pick",
                        owners.join(", ")
                    ),
                });
            }
        }

        warnings
    }
}
