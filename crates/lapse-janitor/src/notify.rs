//! Reconnect notifications sent to collaborators of an expired document
//!
//! Delivery is best-effort: the deletion stage hands the message to a
//! [`Notifier`] and never waits for acknowledgement.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

/// Action clients react to by disconnecting and reconnecting
pub const RECONNECT_ACTION: &str = "requestRECONNECT";

/// Error returned when a notification could not be handed off
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Nobody is listening
    #[error("No subscribers for document {0}")]
    NoSubscribers(String),

    /// Message could not be encoded
    #[error("Failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Collaboration room message instructing clients to reconnect
///
/// Serializes to
/// `{"type":"COLLABROOM","data":{"type":"CUSTOM","payload":{"authorId":null,"action":"requestRECONNECT","documentId":"<id>"}}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectMessage {
    /// Always `COLLABROOM`
    #[serde(rename = "type")]
    pub kind: String,

    /// Message body
    pub data: ReconnectData,
}

/// Body of a [`ReconnectMessage`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectData {
    /// Always `CUSTOM`
    #[serde(rename = "type")]
    pub kind: String,

    /// Custom payload
    pub payload: ReconnectPayload,
}

/// Payload of a [`ReconnectMessage`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconnectPayload {
    /// Always null: the message comes from the server, not an author
    pub author_id: Option<String>,

    /// Client action, [`RECONNECT_ACTION`]
    pub action: String,

    /// Document the clients are connected to
    pub document_id: String,
}

impl ReconnectMessage {
    /// Build the reconnect request for a document
    pub fn request_reconnect(document_id: impl Into<String>) -> Self {
        Self {
            kind: "COLLABROOM".to_string(),
            data: ReconnectData {
                kind: "CUSTOM".to_string(),
                payload: ReconnectPayload {
                    author_id: None,
                    action: RECONNECT_ACTION.to_string(),
                    document_id: document_id.into(),
                },
            },
        }
    }

    /// Document this message is addressed to
    pub fn document_id(&self) -> &str {
        &self.data.payload.document_id
    }

    /// Encode as JSON
    pub fn to_json(&self) -> Result<String, NotifyError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Host-provided broadcast mechanism for collaboration messages
pub trait Notifier: Send + Sync {
    /// Hand a message to the connected collaborators of its document
    fn broadcast(&self, message: &ReconnectMessage) -> Result<(), NotifyError>;
}

/// Notifier backed by a tokio broadcast channel
///
/// Each subscriber (a websocket hub, a log relay) receives every message.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: broadcast::Sender<ReconnectMessage>,
}

impl ChannelNotifier {
    /// Create a notifier buffering up to `capacity` undelivered messages per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to future messages
    pub fn subscribe(&self) -> broadcast::Receiver<ReconnectMessage> {
        self.sender.subscribe()
    }
}

impl Notifier for ChannelNotifier {
    fn broadcast(&self, message: &ReconnectMessage) -> Result<(), NotifyError> {
        self.sender
            .send(message.clone())
            .map(|_| ())
            .map_err(|_| NotifyError::NoSubscribers(message.document_id().to_string()))
    }
}
