//! Runtime driving the sync core
//!
//! One task owns the mirror and handles events strictly one at a time:
//! an event is applied and all of its effects are executed before the
//! next event is received. Server frames and user actions share the same
//! channel, so no handler ever interleaves with another.

mod executor;
mod settings;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SyncRuntime;
pub use settings::{FileSettingsStore, Settings};
pub use traits::*;

use crate::model::ConversationId;
use crate::sync::{ClientSyncState, Event};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock, RwLockReadGuard};

/// Notifications sent to view subscribers after a store mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreNotification {
    ConversationsChanged { conversation_ids: Vec<ConversationId> },
    SelectionChanged { shown: Option<ConversationId> },
    /// Session changed; everything previously read is void
    Reset,
}

/// Cloneable handle for the view layer and the transport reader
#[derive(Clone)]
pub struct SyncHandle {
    event_tx: mpsc::Sender<Event>,
    state: Arc<RwLock<ClientSyncState>>,
    notify_tx: broadcast::Sender<StoreNotification>,
}

impl SyncHandle {
    /// Queue an event for the runtime
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.event_tx
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {e}"))
    }

    pub async fn confirm(
        &self,
        conversation_id: ConversationId,
        text: impl Into<String>,
    ) -> Result<(), String> {
        self.send(Event::Confirm {
            conversation_id,
            text: text.into(),
        })
        .await
    }

    pub async fn select(&self, conversation_id: ConversationId) -> Result<(), String> {
        self.send(Event::Select { conversation_id }).await
    }

    pub async fn set_auto_confirm(&self, enabled: bool) -> Result<(), String> {
        self.send(Event::SetAutoConfirm { enabled }).await
    }

    /// Subscribe to store notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreNotification> {
        self.notify_tx.subscribe()
    }

    /// Read access to the mirror between events
    pub async fn read(&self) -> RwLockReadGuard<'_, ClientSyncState> {
        self.state.read().await
    }
}
