//! # Screen Events
//!
//! One-shot notifications from a controller to its screen ("3 charges
//! imported", "Import failed: ...").
//!
//! ## Replay Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Event Replay Policies                              │
//! │                                                                         │
//! │  send(Imported{3})          subscribe()          send(Failed{..})      │
//! │        │                         │                      │               │
//! │  ──────●─────────────────────────●──────────────────────●──────► time  │
//! │                                                                         │
//! │  ReplayPolicy::None     new receiver sees: Failed                      │
//! │  ReplayPolicy::Latest   new receiver sees: Imported{3}, Failed         │
//! │                                                                         │
//! │  Each receiver sees each event at most once.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;
use ts_rs::TS;

/// Default number of undelivered events kept per receiver.
pub const DEFAULT_EVENT_CAPACITY: usize = 16;

/// Notification emitted by a settings controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingsEvent {
    /// Rows were merged into the repository.
    Imported { kind: String, count: usize },

    /// Rows were written to an export sink.
    Exported { kind: String, count: usize },

    /// An import, export or live query failed. The screen stays usable.
    Failed { message: String },
}

impl SettingsEvent {
    pub fn is_failure(&self) -> bool {
        matches!(self, SettingsEvent::Failed { .. })
    }
}

/// Whether a new subscriber first receives the most recent event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReplayPolicy {
    /// Subscribers only see events sent after they subscribed.
    #[default]
    None,

    /// Subscribers first receive the last event sent before they subscribed.
    Latest,
}

impl std::fmt::Display for ReplayPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayPolicy::None => write!(f, "none"),
            ReplayPolicy::Latest => write!(f, "latest"),
        }
    }
}

impl std::str::FromStr for ReplayPolicy {
    type Err = crate::error::SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(ReplayPolicy::None),
            "latest" | "last" => Ok(ReplayPolicy::Latest),
            other => Err(crate::error::SettingsError::InvalidConfig(format!(
                "Unknown replay policy: '{}'. Valid options: none, latest",
                other
            ))),
        }
    }
}

// =============================================================================
// Event Channel
// =============================================================================

/// Multi-subscriber event channel with an explicit replay policy.
///
/// Clones share the same channel.
#[derive(Debug)]
pub struct EventChannel<T> {
    tx: broadcast::Sender<T>,
    policy: ReplayPolicy,
    latest: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for EventChannel<T> {
    fn clone(&self) -> Self {
        EventChannel {
            tx: self.tx.clone(),
            policy: self.policy,
            latest: Arc::clone(&self.latest),
        }
    }
}

impl<T: Clone + Send + 'static> EventChannel<T> {
    pub fn new(policy: ReplayPolicy) -> Self {
        Self::with_capacity(policy, DEFAULT_EVENT_CAPACITY)
    }

    /// Creates a channel buffering up to `capacity` events per receiver.
    ///
    /// `capacity` is raised to 1 if zero.
    pub fn with_capacity(policy: ReplayPolicy, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        EventChannel {
            tx,
            policy,
            latest: Arc::new(Mutex::new(None)),
        }
    }

    pub fn policy(&self) -> ReplayPolicy {
        self.policy
    }

    /// Sends `event` to every current receiver.
    ///
    /// Returns the number of receivers it was delivered to. Sending with no
    /// receivers is not an error.
    pub fn send(&self, event: T) -> usize {
        // Held across the send so a concurrent subscribe sees the event
        // either as its replay or on its receiver, never both.
        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        if self.policy == ReplayPolicy::Latest {
            *latest = Some(event.clone());
        }
        self.tx.send(event).unwrap_or(0)
    }

    /// Creates a new receiver.
    pub fn subscribe(&self) -> EventReceiver<T> {
        let latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        EventReceiver {
            replay: latest.clone(),
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiving half of an [`EventChannel`].
#[derive(Debug)]
pub struct EventReceiver<T> {
    replay: Option<T>,
    rx: broadcast::Receiver<T>,
}

impl<T: Clone> EventReceiver<T> {
    /// Waits for the next event.
    ///
    /// Returns `None` once every sender is gone. Events missed because the
    /// receiver fell behind are skipped.
    pub async fn recv(&mut self) -> Option<T> {
        if let Some(event) = self.replay.take() {
            return Some(event);
        }

        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event receiver lagged, skipping missed events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next event if one is ready.
    pub fn try_recv(&mut self) -> Option<T> {
        if let Some(event) = self.replay.take() {
            return Some(event);
        }

        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event receiver lagged, skipping missed events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
