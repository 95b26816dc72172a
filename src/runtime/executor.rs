//! Sync runtime executor

use super::settings::Settings;
use super::traits::{SettingsError, SettingsStore, Transport};
use super::{StoreNotification, SyncHandle};
use crate::sync::{ClientSyncState, Effect, Event};
use crate::wire::ClientMessage;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio_util::sync::CancellationToken;

/// Owns the mirror and executes effects against a transport and a
/// settings store
pub struct SyncRuntime<T, P>
where
    T: Transport + 'static,
    P: SettingsStore + 'static,
{
    state: Arc<RwLock<ClientSyncState>>,
    transport: T,
    settings: P,
    event_rx: mpsc::Receiver<Event>,
    notify_tx: broadcast::Sender<StoreNotification>,
}

impl<T, P> SyncRuntime<T, P>
where
    T: Transport + 'static,
    P: SettingsStore + 'static,
{
    pub fn new(
        state: ClientSyncState,
        transport: T,
        settings: P,
        channel_capacity: usize,
    ) -> (Self, SyncHandle) {
        let (event_tx, event_rx) = mpsc::channel(channel_capacity);
        let (notify_tx, _) = broadcast::channel(128);
        let state = Arc::new(RwLock::new(state));

        let handle = SyncHandle {
            event_tx,
            state: state.clone(),
            notify_tx: notify_tx.clone(),
        };
        let runtime = Self {
            state,
            transport,
            settings,
            event_rx,
            notify_tx,
        };
        (runtime, handle)
    }

    /// Build a runtime with the auto-confirm flag restored from `settings`.
    /// A startup override is written back so it sticks.
    pub async fn bootstrap(
        transport: T,
        settings: P,
        auto_confirm_override: Option<bool>,
        channel_capacity: usize,
    ) -> Result<(Self, SyncHandle), SettingsError> {
        let mut persisted = settings.load().await?;
        if let Some(enabled) = auto_confirm_override {
            if enabled != persisted.auto_confirm {
                persisted.auto_confirm = enabled;
                settings.save(&persisted).await?;
            }
        }
        tracing::info!(auto_confirm = persisted.auto_confirm, "Settings loaded");

        Ok(Self::new(
            ClientSyncState::new(persisted.auto_confirm),
            transport,
            settings,
            channel_capacity,
        ))
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!("Starting sync runtime");

        for effect in ClientSyncState::start() {
            self.execute_effect(effect).await;
        }

        // Queued events are drained before cancellation is honored; the
        // loop also ends once every handle is dropped.
        loop {
            tokio::select! {
                biased;
                event = self.event_rx.recv() => match event {
                    Some(event) => self.process_event(event).await,
                    None => break,
                },
                () = cancel.cancelled() => break,
            }
        }

        tracing::info!("Sync runtime stopped");
    }

    /// Apply one event and everything it causes, to completion
    async fn process_event(&mut self, event: Event) {
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            // Lock only for the pure transition; effects run unlocked so
            // readers are not blocked on transport I/O.
            let effects = self.state.write().await.apply(current_event);

            for effect in effects {
                if let Some(generated_event) = self.execute_effect(effect).await {
                    events_to_process.push(generated_event);
                }
            }
        }
    }

    async fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        if let Some(message) = ClientMessage::from_effect(&effect) {
            tracing::debug!(?message, "Sending frame");
            let Err(e) = self.transport.send(message).await else {
                return None;
            };
            tracing::error!(error = %e, "Failed to send frame");
            // A confirm that never left must not count as answered
            return match effect {
                Effect::Confirm {
                    conversation_id,
                    version,
                    ..
                } => Some(Event::ConfirmationSendFailed {
                    conversation_id,
                    version,
                }),
                _ => None,
            };
        }

        match effect {
            Effect::PersistAutoConfirm { enabled } => {
                let settings = Settings {
                    auto_confirm: enabled,
                };
                if let Err(e) = self.settings.save(&settings).await {
                    tracing::error!(error = %e, "Failed to persist auto-confirm");
                }
            }
            Effect::NotifyStoreChanged { conversation_ids } => {
                self.notify(StoreNotification::ConversationsChanged { conversation_ids });
            }
            Effect::NotifySelectionChanged { shown } => {
                self.notify(StoreNotification::SelectionChanged { shown });
            }
            Effect::NotifyReset => self.notify(StoreNotification::Reset),
            Effect::RequestUpdate { .. }
            | Effect::ListConversations { .. }
            | Effect::Confirm { .. } => {}
        }
        None
    }

    fn notify(&self, notification: StoreNotification) {
        // No subscribers is fine
        let _ = self.notify_tx.send(notification);
    }
}
