use async_trait::async_trait;
use chatops_core::commands::{build_registry, BuiltinDeps};
use chatops_core::config::Config;
use chatops_core::message::{ChatMessage, Destination, MessageOptions};
use chatops_core::messaging::{HttpMessageClient, InMemoryMessageClient, MessageClient};
use chatops_core::registry::CommandRegistry;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<CommandRegistry>,
    /// Recent messages, readable through `/api/messages`.
    pub messages: Arc<InMemoryMessageClient>,
    /// What commands write to: the in-memory store, plus the gateway if one
    /// is configured.
    pub client: Arc<dyn MessageClient>,
}

impl AppState {
    pub fn new(config: Config) -> chatops_core::Result<Self> {
        let registry = build_registry(BuiltinDeps::from_config(&config))?;
        Self::with_registry(config, registry)
    }

    pub fn with_registry(config: Config, registry: CommandRegistry) -> chatops_core::Result<Self> {
        let messages = Arc::new(InMemoryMessageClient::bounded(
            config.server.retained_messages,
        ));
        let client: Arc<dyn MessageClient> = match &config.gateway {
            Some(gateway) => Arc::new(RelayClient {
                store: messages.clone(),
                upstream: HttpMessageClient::new(
                    gateway.url.clone(),
                    Duration::from_secs(gateway.timeout_secs),
                )?,
            }),
            None => messages.clone(),
        };
        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            messages,
            client,
        })
    }
}

/// Records locally, then forwards to the chat gateway.
struct RelayClient {
    store: Arc<InMemoryMessageClient>,
    upstream: HttpMessageClient,
}

#[async_trait]
impl MessageClient for RelayClient {
    async fn send(
        &self,
        message: &ChatMessage,
        destination: &Destination,
        options: &MessageOptions,
    ) -> chatops_core::Result<()> {
        self.store.send(message, destination, options).await?;
        self.upstream.send(message, destination, options).await
    }

    async fn respond(
        &self,
        message: &ChatMessage,
        options: &MessageOptions,
    ) -> chatops_core::Result<()> {
        self.store.respond(message, options).await?;
        self.upstream.respond(message, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatops_core::config::GatewayConfig;

    #[test]
    fn new_state_registers_builtins() {
        let state = AppState::new(Config::default()).unwrap();
        assert!(state.registry.contains("help"));
        assert!(state.registry.contains("request-environments"));
    }

    #[tokio::test]
    async fn message_store_honours_retention() {
        let mut config = Config::default();
        config.server.retained_messages = 1;
        let state = AppState::new(config).unwrap();
        for id in ["c1", "c2"] {
            state
                .client
                .respond(&ChatMessage::new(id), &MessageOptions::new(id))
                .await
                .unwrap();
        }
        assert!(state.messages.get("c1").is_none());
        assert_eq!(state.messages.get("c2").unwrap().message.text, "c2");
    }

    #[tokio::test]
    async fn gateway_writes_are_also_recorded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let mut config = Config::default();
        config.gateway = Some(GatewayConfig {
            url: server.url(),
            timeout_secs: 5,
        });
        let state = AppState::new(config).unwrap();
        state
            .client
            .respond(&ChatMessage::new("hi"), &MessageOptions::new("c1"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(state.messages.get("c1").unwrap().message.text, "hi");
    }
}
