//! Confirmation handshake
//!
//! A confirm is sent at most once per `last_state_change_time` of a
//! conversation. The sent marker is written in the same step that produces
//! the `Confirm` effect, so a second trigger handled afterwards (manual
//! submit racing auto-confirm, or two auto sweeps) finds nothing
//! outstanding.

use super::effect::Effect;
use super::state::ConversationState;
use super::store::ConversationStore;

/// Produces `Confirm` effects for outstanding confirmations
pub struct ConfirmationCoordinator;

impl ConfirmationCoordinator {
    /// Auto-answer `conversation` if a confirmation is outstanding and the
    /// policy allows it.
    pub fn reconcile(
        conversation: &mut ConversationState,
        policy: &AutoConfirmPolicy,
    ) -> Option<Effect> {
        if !conversation.is_confirmation_outstanding() || !policy.is_enabled() {
            return None;
        }
        Self::send_confirmation(conversation, String::new())
    }

    /// Transmit `text` for the current version. No-op when nothing is
    /// outstanding (already answered, or not waiting).
    pub fn send_confirmation(
        conversation: &mut ConversationState,
        text: String,
    ) -> Option<Effect> {
        if !conversation.is_confirmation_outstanding() {
            tracing::debug!(
                conversation_id = conversation.id(),
                state = %conversation.lifecycle_state(),
                "No outstanding confirmation, ignoring"
            );
            return None;
        }

        let version = conversation.mark_confirmation_sent();
        tracing::info!(
            conversation_id = conversation.id(),
            %version,
            auto = text.is_empty(),
            "Sending confirmation"
        );

        Some(Effect::Confirm {
            conversation_id: conversation.id(),
            confirmation: text,
            message_count: conversation.message_count(),
            version,
        })
    }
}

/// Global auto-confirm toggle. Persisted outside the session, so it is
/// never touched by a store reset.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirmPolicy {
    enabled: bool,
}

impl AutoConfirmPolicy {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Answer every outstanding confirmation in the store, shown or not
    pub fn sweep(&self, store: &mut ConversationStore) -> Vec<Effect> {
        if !self.enabled {
            return Vec::new();
        }
        store
            .iter_mut()
            .filter_map(|conversation| ConfirmationCoordinator::reconcile(conversation, self))
            .collect()
    }
}
