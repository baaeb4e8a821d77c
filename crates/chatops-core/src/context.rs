use crate::message::Destination;
use crate::messaging::MessageClient;
use std::sync::Arc;

/// Per-turn context: who invoked the command, where, and how to talk back.
#[derive(Clone)]
pub struct CommandContext {
    pub client: Arc<dyn MessageClient>,
    pub channel: Option<String>,
    pub user: Option<String>,
}

impl CommandContext {
    pub fn new(client: Arc<dyn MessageClient>) -> Self {
        Self {
            client,
            channel: None,
            user: None,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Channel if known, otherwise a direct message to the user.
    pub fn destination(&self) -> Option<Destination> {
        if let Some(name) = &self.channel {
            return Some(Destination::Channel { name: name.clone() });
        }
        self.user
            .as_ref()
            .map(|name| Destination::User { name: name.clone() })
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("channel", &self.channel)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}
