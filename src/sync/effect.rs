//! Effects produced by the sync core

use crate::model::ConversationId;
use chrono::{DateTime, Utc};

/// Effects to be executed after an event is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask for messages after index `message_count`
    RequestUpdate {
        conversation_id: ConversationId,
        message_count: usize,
    },

    /// Ask for conversation headers with id >= `start_id`
    ListConversations { start_id: Option<ConversationId> },

    /// Answer a pending confirmation
    Confirm {
        conversation_id: ConversationId,
        confirmation: String,
        message_count: usize,
        /// `last_state_change_time` being answered; not sent on the wire
        version: DateTime<Utc>,
    },

    /// Persist the auto-confirm toggle
    PersistAutoConfirm { enabled: bool },

    /// Notify view subscribers
    NotifyStoreChanged { conversation_ids: Vec<ConversationId> },
    NotifySelectionChanged { shown: Option<ConversationId> },
    NotifyReset,
}

impl Effect {
    pub fn request_update(conversation_id: ConversationId, message_count: usize) -> Self {
        Effect::RequestUpdate {
            conversation_id,
            message_count,
        }
    }

    pub fn list_conversations(start_id: Option<ConversationId>) -> Self {
        Effect::ListConversations { start_id }
    }

    pub fn store_changed(conversation_ids: impl IntoIterator<Item = ConversationId>) -> Self {
        Effect::NotifyStoreChanged {
            conversation_ids: conversation_ids.into_iter().collect(),
        }
    }
}
