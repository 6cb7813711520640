//! Cross-context session notifications
//!
//! A [`BroadcastHub`] plays the role of an origin: every execution context
//! that opens the same topic on the same hub hears the others. A context never
//! hears its own messages.

use crate::config::AuthConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;

/// Session events exchanged between contexts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEvent {
    #[serde(rename = "signIn")]
    SignIn,
    #[serde(rename = "signOut")]
    SignOut,
}

impl AuthEvent {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "signIn",
            Self::SignOut => "signOut",
        }
    }
}

impl std::fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signIn" => Ok(Self::SignIn),
            "signOut" => Ok(Self::SignOut),
            other => Err(format!("unknown auth event: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
struct Envelope {
    sender: Uuid,
    event: AuthEvent,
}

/// Topic registry shared by all contexts of one origin
#[derive(Clone, Default)]
pub struct BroadcastHub {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<Envelope>>>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new context handle on `topic`
    pub fn open(&self, topic: &str) -> AuthChannel {
        let sender = self
            .topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone();

        let id = Uuid::new_v4();
        tracing::debug!(topic, context = %id, "Opened broadcast channel");

        AuthChannel {
            id,
            topic: topic.to_string(),
            sender,
            closed: watch::Sender::new(false),
        }
    }
}

/// One context's handle on a broadcast topic
pub struct AuthChannel {
    id: Uuid,
    topic: String,
    sender: broadcast::Sender<Envelope>,
    closed: watch::Sender<bool>,
}

impl AuthChannel {
    /// Identifier of the owning context
    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Send an event to every other context on this topic
    pub fn publish(&self, event: AuthEvent) {
        if self.is_closed() {
            tracing::debug!(topic = %self.topic, %event, "Dropping event on closed channel");
            return;
        }

        let envelope = Envelope {
            sender: self.id,
            event,
        };
        // No receivers simply means no sibling context is listening.
        let listeners = self.sender.send(envelope).unwrap_or(0);
        tracing::debug!(topic = %self.topic, %event, listeners, "Published auth event");
    }

    /// Start receiving events from other contexts
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            id: self.id,
            receiver: self.sender.subscribe(),
            closed: self.closed.subscribe(),
        }
    }

    /// Stop publishing and end every subscription of this handle, including
    /// ones currently waiting for an event
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

/// Receiving side of an [`AuthChannel`]
pub struct Subscription {
    id: Uuid,
    receiver: broadcast::Receiver<Envelope>,
    closed: watch::Receiver<bool>,
}

impl Subscription {
    /// Wait for the next event sent by another context
    ///
    /// Returns `None` once the channel is closed.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        loop {
            if *self.closed.borrow() {
                return None;
            }
            let received = tokio::select! {
                biased;
                // Errs only when the channel handle is gone; keep listening then.
                Ok(_) = self.closed.wait_for(|closed| *closed) => return None,
                received = self.receiver.recv() => received,
            };
            match received {
                Ok(envelope) if envelope.sender == self.id => {}
                Ok(envelope) => return Some(envelope.event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Auth channel subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Lazily opened `auth` channel for one execution context
pub struct Notifier {
    hub: BroadcastHub,
    channel: OnceLock<AuthChannel>,
}

impl Notifier {
    pub const fn new(hub: BroadcastHub) -> Self {
        Self {
            hub,
            channel: OnceLock::new(),
        }
    }

    /// The context's channel, opened on first use
    pub fn channel(&self) -> &AuthChannel {
        self.channel
            .get_or_init(|| self.hub.open(AuthConfig::AUTH_CHANNEL))
    }

    pub fn publish(&self, event: AuthEvent) {
        self.channel().publish(event);
    }

    pub fn subscribe(&self) -> Subscription {
        self.channel().subscribe()
    }

    pub fn close(&self) {
        self.channel().close();
    }
}
