//! Messaging boundary: post a message, or edit the one addressed by a
//! correlation id.

use crate::error::Result;
use crate::message::{ChatMessage, Destination, MessageOptions};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait MessageClient: Send + Sync {
    /// Post to `destination`, or edit the message already sent under
    /// `options.correlation_id`.
    async fn send(
        &self,
        message: &ChatMessage,
        destination: &Destination,
        options: &MessageOptions,
    ) -> Result<()>;

    /// Reply in the conversation that triggered the command, editing the
    /// message addressed by `options.correlation_id`.
    async fn respond(&self, message: &ChatMessage, options: &MessageOptions) -> Result<()>;
}

// ---------------------------------------------------------------------------
// InMemoryMessageClient
// ---------------------------------------------------------------------------

/// One write, as seen by the client.
#[derive(Debug, Clone, Serialize)]
pub struct MessageEdit {
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    pub message: ChatMessage,
    pub at: DateTime<Utc>,
}

/// Latest version of one logical message.
#[derive(Debug, Clone, Serialize)]
pub struct StoredMessage {
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    pub message: ChatMessage,
    /// Number of writes, the first post included.
    pub edits: usize,
    pub updated_at: DateTime<Utc>,
}

/// Edits kept in the log per retained message when the store is bounded.
const LOG_EDITS_PER_MESSAGE: usize = 16;

#[derive(Debug, Default)]
struct Store {
    latest: HashMap<String, StoredMessage>,
    /// Correlation ids in order of first write.
    order: VecDeque<String>,
    log: VecDeque<MessageEdit>,
}

/// Keeps messages in memory, keyed by correlation id.
///
/// [`InMemoryMessageClient::new`] keeps everything. A long-running process
/// uses [`InMemoryMessageClient::bounded`], which forgets the oldest messages
/// first.
#[derive(Debug, Default)]
pub struct InMemoryMessageClient {
    store: Mutex<Store>,
    max_messages: Option<usize>,
}

impl InMemoryMessageClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `max_messages` messages and a proportional edit log.
    pub fn bounded(max_messages: usize) -> Self {
        Self {
            store: Mutex::default(),
            max_messages: Some(max_messages.max(1)),
        }
    }

    fn record(&self, message: &ChatMessage, destination: Option<&Destination>, options: &MessageOptions) {
        let now = Utc::now();
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        store.log.push_back(MessageEdit {
            correlation_id: options.correlation_id.clone(),
            destination: destination.cloned(),
            message: message.clone(),
            at: now,
        });
        let entry = store
            .latest
            .entry(options.correlation_id.clone())
            .or_insert_with(|| StoredMessage {
                correlation_id: options.correlation_id.clone(),
                destination: destination.cloned(),
                message: message.clone(),
                edits: 0,
                updated_at: now,
            });
        entry.message = message.clone();
        entry.edits += 1;
        entry.updated_at = now;
        if destination.is_some() {
            entry.destination = destination.cloned();
        }
        let edits = entry.edits;
        if edits == 1 {
            store.order.push_back(options.correlation_id.clone());
        }
        debug!(correlation_id = %options.correlation_id, edits, "message stored");

        if let Some(max) = self.max_messages {
            while store.order.len() > max {
                let Some(evicted) = store.order.pop_front() else {
                    break;
                };
                store.latest.remove(&evicted);
                store.log.retain(|e| e.correlation_id != evicted);
                debug!(correlation_id = %evicted, "message evicted");
            }
            let max_log = max.saturating_mul(LOG_EDITS_PER_MESSAGE);
            while store.log.len() > max_log {
                store.log.pop_front();
            }
        }
    }

    pub fn get(&self, correlation_id: &str) -> Option<StoredMessage> {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        store.latest.get(correlation_id).cloned()
    }

    /// Every write in order.
    pub fn log(&self) -> Vec<MessageEdit> {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        store.log.iter().cloned().collect()
    }

    /// Number of messages currently held.
    pub fn len(&self) -> usize {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        store.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct correlation ids in order of first write.
    pub fn correlation_ids(&self) -> Vec<String> {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        store.order.iter().cloned().collect()
    }
}

#[async_trait]
impl MessageClient for InMemoryMessageClient {
    async fn send(
        &self,
        message: &ChatMessage,
        destination: &Destination,
        options: &MessageOptions,
    ) -> Result<()> {
        self.record(message, Some(destination), options);
        Ok(())
    }

    async fn respond(&self, message: &ChatMessage, options: &MessageOptions) -> Result<()> {
        self.record(message, None, options);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// HttpMessageClient
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum GatewayAction {
    Send,
    Respond,
}

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    action: GatewayAction,
    correlation_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<&'a Destination>,
    message: &'a ChatMessage,
}

/// Forwards every write as JSON to a chat gateway that owns the real
/// platform connection.
#[derive(Debug, Clone)]
pub struct HttpMessageClient {
    client: reqwest::Client,
    url: String,
}

impl HttpMessageClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn post(&self, request: GatewayRequest<'_>) -> Result<()> {
        debug!(url = %self.url, correlation_id = request.correlation_id, "posting to chat gateway");
        self.client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl MessageClient for HttpMessageClient {
    async fn send(
        &self,
        message: &ChatMessage,
        destination: &Destination,
        options: &MessageOptions,
    ) -> Result<()> {
        self.post(GatewayRequest {
            action: GatewayAction::Send,
            correlation_id: &options.correlation_id,
            destination: Some(destination),
            message,
        })
        .await
    }

    async fn respond(&self, message: &ChatMessage, options: &MessageOptions) -> Result<()> {
        self.post(GatewayRequest {
            action: GatewayAction::Respond,
            correlation_id: &options.correlation_id,
            destination: None,
            message,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ChatOpsError, ErrorKind};

    #[tokio::test]
    async fn in_memory_client_edits_in_place() {
        let client = InMemoryMessageClient::new();
        let opts = MessageOptions::new("c1");
        client.respond(&ChatMessage::new("first"), &opts).await.unwrap();
        client.respond(&ChatMessage::new("second"), &opts).await.unwrap();

        let stored = client.get("c1").unwrap();
        assert_eq!(stored.message.text, "second");
        assert_eq!(stored.edits, 2);
        assert_eq!(client.log().len(), 2);
        assert_eq!(client.correlation_ids(), vec!["c1".to_string()]);
    }

    #[tokio::test]
    async fn in_memory_client_remembers_destination() {
        let client = InMemoryMessageClient::new();
        let dest = Destination::Channel {
            name: "ops".into(),
        };
        let opts = MessageOptions::new("c2");
        client.send(&ChatMessage::new("hi"), &dest, &opts).await.unwrap();
        client.respond(&ChatMessage::new("edit"), &opts).await.unwrap();
        assert_eq!(client.get("c2").unwrap().destination, Some(dest));
    }

    #[tokio::test]
    async fn bounded_client_forgets_oldest_messages() {
        let client = InMemoryMessageClient::bounded(2);
        for id in ["c1", "c2", "c3"] {
            client
                .respond(&ChatMessage::new(id), &MessageOptions::new(id))
                .await
                .unwrap();
        }
        // editing a retained message does not evict anything
        client
            .respond(&ChatMessage::new("c2 again"), &MessageOptions::new("c2"))
            .await
            .unwrap();

        assert!(client.get("c1").is_none());
        assert_eq!(client.get("c2").unwrap().message.text, "c2 again");
        assert_eq!(client.len(), 2);
        assert_eq!(client.correlation_ids(), vec!["c2".to_string(), "c3".to_string()]);
        assert!(client.log().iter().all(|e| e.correlation_id != "c1"));
    }

    #[tokio::test]
    async fn bounded_log_drops_oldest_edits() {
        let client = InMemoryMessageClient::bounded(1);
        let opts = MessageOptions::new("c1");
        for i in 0..(LOG_EDITS_PER_MESSAGE + 5) {
            client
                .respond(&ChatMessage::new(format!("edit {i}")), &opts)
                .await
                .unwrap();
        }
        let log = client.log();
        assert_eq!(log.len(), LOG_EDITS_PER_MESSAGE);
        assert_eq!(log[0].message.text, "edit 5");
        assert_eq!(client.get("c1").unwrap().edits, LOG_EDITS_PER_MESSAGE + 5);
    }

    #[tokio::test]
    async fn http_client_posts_json_to_gateway() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/messages")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "action": "respond",
                "correlation_id": "c1",
                "message": { "text": "hello" }
            })))
            .with_status(200)
            .create_async()
            .await;

        let client =
            HttpMessageClient::new(format!("{}/messages", server.url()), Duration::from_secs(5))
                .unwrap();
        client
            .respond(&ChatMessage::new("hello"), &MessageOptions::new("c1"))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_client_surfaces_gateway_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/messages")
            .with_status(500)
            .create_async()
            .await;

        let client =
            HttpMessageClient::new(format!("{}/messages", server.url()), Duration::from_secs(5))
                .unwrap();
        let err = client
            .respond(&ChatMessage::new("hello"), &MessageOptions::new("c1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatOpsError::Http(_)));
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = HttpMessageClient::new(
            format!("http://127.0.0.1:{port}/messages"),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = client
            .respond(&ChatMessage::new("hello"), &MessageOptions::new("c1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
