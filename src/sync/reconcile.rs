//! Pure reconciliation of server deltas and user intents
//!
//! `ClientSyncState::apply` is the only entry point. It mutates the local
//! mirror and returns the effects the runtime must execute, in order. It
//! performs no I/O.

use super::confirmation::{AutoConfirmPolicy, ConfirmationCoordinator};
use super::effect::Effect;
use super::event::{Event, ListConversationsPayload, UpdatePayload};
use super::session::{SessionObservation, SessionTracker};
use super::store::ConversationStore;
use crate::model::{ConversationId, Message};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Anomalies detected while reconciling. Logged, never propagated to the
/// transport; the mirror simply waits for the next server event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Unknown conversation: {0}")]
    UnknownConversation(ConversationId),
    #[error("Conversation {conversation_id}: message {index} differs from the stored copy")]
    OverlapMismatch {
        conversation_id: ConversationId,
        index: usize,
    },
    #[error(
        "Conversation {conversation_id}: delta starts at {first_message_index} but only {local} messages are held"
    )]
    MessageGap {
        conversation_id: ConversationId,
        local: usize,
        first_message_index: usize,
    },
}

/// The whole client-side mirror: session, conversations, selection and the
/// auto-confirm policy.
#[derive(Debug, Default)]
pub struct ClientSyncState {
    session: SessionTracker,
    store: ConversationStore,
    auto_confirm: AutoConfirmPolicy,
}

impl ClientSyncState {
    pub fn new(auto_confirm: bool) -> Self {
        Self {
            session: SessionTracker::new(),
            store: ConversationStore::new(),
            auto_confirm: AutoConfirmPolicy::new(auto_confirm),
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn session_key(&self) -> Option<&str> {
        self.session.current()
    }

    pub fn auto_confirm_enabled(&self) -> bool {
        self.auto_confirm.is_enabled()
    }

    /// Effects to run once at startup
    pub fn start() -> Vec<Effect> {
        vec![Effect::list_conversations(None)]
    }

    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Update(payload) => self.apply_update(payload),
            Event::ListConversations(payload) => self.apply_list_conversations(payload),
            Event::Confirm {
                conversation_id,
                text,
            } => self.confirm(conversation_id, text),
            Event::Select { conversation_id } => self.select(conversation_id),
            Event::SetAutoConfirm { enabled } => self.set_auto_confirm(enabled),
            Event::ConfirmationSendFailed {
                conversation_id,
                version,
            } => self.confirmation_send_failed(conversation_id, version),
        }
    }

    // ============================================================
    // Server events
    // ============================================================

    fn apply_update(&mut self, payload: UpdatePayload) -> Vec<Effect> {
        let mut effects = self.observe_session(&payload.session_key);

        let id = payload.conversation_id;
        let conversation = self.store.create_or_update(id, payload.header);
        conversation.set_pending_confirmation(payload.confirmation_required);

        // A rejected delta must not trigger a catch-up pull, or the client
        // would loop re-fetching the same conflicting window.
        let accepted = match new_messages(
            id,
            conversation.messages(),
            payload.first_message_index,
            payload.messages,
        ) {
            Ok(messages) => {
                conversation.append_messages(messages);
                true
            }
            Err(e @ SyncError::OverlapMismatch { .. }) => {
                tracing::error!(error = %e, "Rejecting delta that rewrites history");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding delta messages");
                true
            }
        };
        let local = conversation.message_count();

        if self.store.show_if_unset(id) {
            effects.push(Effect::NotifySelectionChanged { shown: Some(id) });
        }

        effects.extend(self.auto_confirm.sweep(&mut self.store));
        effects.push(Effect::store_changed([id]));

        if accepted && payload.server_message_count > local {
            tracing::debug!(
                conversation_id = id,
                local,
                server = payload.server_message_count,
                "Requesting remaining messages"
            );
            effects.push(Effect::request_update(id, local));
        }

        effects
    }

    fn apply_list_conversations(&mut self, payload: ListConversationsPayload) -> Vec<Effect> {
        let mut effects = match payload.session_key.as_deref() {
            Some(key) => self.observe_session(key),
            None => Vec::new(),
        };

        let was_empty = self.store.is_empty();
        let mut touched = Vec::with_capacity(payload.conversations.len());

        for listed in payload.conversations {
            let conversation = self.store.create_or_update(listed.id, listed.header);
            let local = conversation.message_count();
            if listed.message_count > local {
                effects.push(Effect::request_update(listed.id, local));
            }
            touched.push(listed.id);
        }

        if let Some(&first) = touched.first() {
            if self.store.show_if_unset(first) {
                effects.push(Effect::NotifySelectionChanged { shown: Some(first) });
            }
            effects.extend(self.auto_confirm.sweep(&mut self.store));
            effects.push(Effect::store_changed(touched));
        }

        // After a reset the directory is re-listed from the start anyway
        let relisting = effects.contains(&Effect::list_conversations(None));
        if !relisting {
            effects.extend(self.next_list_page(was_empty, payload.max_conversation_id));
        }

        effects
    }

    /// Cursor pagination over the conversation directory
    fn next_list_page(
        &self,
        was_empty: bool,
        server_max: Option<ConversationId>,
    ) -> Option<Effect> {
        let Ok(local_max) = self.store.max_id() else {
            // Still nothing held: keep asking only while the server says
            // it has conversations.
            return server_max.map(|_| Effect::list_conversations(None));
        };

        let behind = server_max.is_some_and(|server_max| server_max > local_max);
        if !was_empty && !behind {
            return None;
        }
        // No id can follow the largest representable one
        let start_id = local_max.checked_add(1)?;
        tracing::debug!(local_max, ?server_max, "Requesting next conversation page");
        Some(Effect::list_conversations(Some(start_id)))
    }

    fn observe_session(&mut self, key: &str) -> Vec<Effect> {
        match self.session.observe(key) {
            SessionObservation::Unchanged => Vec::new(),
            SessionObservation::Reset => {
                let had_state = !self.store.is_empty();
                self.store.reset();
                let mut effects = vec![Effect::NotifyReset];
                if had_state {
                    // Rebuild the directory, not just the payload's conversation
                    effects.push(Effect::list_conversations(None));
                }
                effects
            }
        }
    }

    // ============================================================
    // User events
    // ============================================================

    fn confirm(&mut self, conversation_id: ConversationId, text: String) -> Vec<Effect> {
        let Some(conversation) = self.store.get_mut(conversation_id) else {
            tracing::warn!(
                error = %SyncError::UnknownConversation(conversation_id),
                "Ignoring confirmation"
            );
            return Vec::new();
        };
        match ConfirmationCoordinator::send_confirmation(conversation, text) {
            Some(confirm) => vec![confirm, Effect::store_changed([conversation_id])],
            None => Vec::new(),
        }
    }

    fn select(&mut self, conversation_id: ConversationId) -> Vec<Effect> {
        if !self.store.set_shown(conversation_id) {
            tracing::warn!(
                error = %SyncError::UnknownConversation(conversation_id),
                "Ignoring selection"
            );
            return Vec::new();
        }
        vec![Effect::NotifySelectionChanged {
            shown: Some(conversation_id),
        }]
    }

    fn set_auto_confirm(&mut self, enabled: bool) -> Vec<Effect> {
        self.auto_confirm.set_enabled(enabled);
        tracing::info!(enabled, "Auto-confirm toggled");
        let mut effects = vec![Effect::PersistAutoConfirm { enabled }];
        let confirms = self.auto_confirm.sweep(&mut self.store);
        if !confirms.is_empty() {
            let ids: Vec<_> = confirms.iter().filter_map(confirmed_id).collect();
            effects.extend(confirms);
            effects.push(Effect::store_changed(ids));
        }
        effects
    }

    // ============================================================
    // Runtime feedback
    // ============================================================

    fn confirmation_send_failed(
        &mut self,
        conversation_id: ConversationId,
        version: DateTime<Utc>,
    ) -> Vec<Effect> {
        let Some(conversation) = self.store.get_mut(conversation_id) else {
            // Session was reset since; nothing to roll back
            return Vec::new();
        };
        if !conversation.clear_confirmation_sent(version) {
            return Vec::new();
        }
        tracing::warn!(conversation_id, %version, "Confirmation not delivered, outstanding again");
        vec![Effect::store_changed([conversation_id])]
    }
}

fn confirmed_id(effect: &Effect) -> Option<ConversationId> {
    match effect {
        Effect::Confirm {
            conversation_id, ..
        } => Some(*conversation_id),
        _ => None,
    }
}

/// Messages of a delta that extend the `held` history.
///
/// The window `[first_message_index, first_message_index + messages.len())`
/// may overlap what is held; the overlap is trimmed by index after checking
/// it matches the stored copy. Histories are append-only, so a mismatch
/// means the server rewrote history and the delta is rejected.
fn new_messages(
    conversation_id: ConversationId,
    held: &[Message],
    first_message_index: usize,
    mut messages: Vec<Message>,
) -> Result<Vec<Message>, SyncError> {
    let local = held.len();
    if first_message_index > local {
        return Err(SyncError::MessageGap {
            conversation_id,
            local,
            first_message_index,
        });
    }

    let overlap = held.get(first_message_index..).unwrap_or_default();
    if let Some(offset) = overlap
        .iter()
        .zip(&messages)
        .position(|(stored, incoming)| stored != incoming)
    {
        return Err(SyncError::OverlapMismatch {
            conversation_id,
            index: first_message_index + offset,
        });
    }

    let skip = local - first_message_index;
    if skip >= messages.len() {
        return Ok(Vec::new());
    }
    Ok(messages.split_off(skip))
}
