//! Events consumed by the sync core

use super::state::ConversationHeader;
use crate::model::{ConversationId, Message};
use chrono::{DateTime, Utc};

/// Everything that can drive a state change: server deltas, user intents,
/// and feedback from effect execution.
#[derive(Debug, Clone)]
pub enum Event {
    // Server events
    Update(UpdatePayload),
    ListConversations(ListConversationsPayload),

    // User events
    Confirm {
        conversation_id: ConversationId,
        text: String,
    },
    Select {
        conversation_id: ConversationId,
    },
    SetAutoConfirm {
        enabled: bool,
    },

    // Runtime feedback
    /// The transport could not deliver a confirm for `version`
    ConfirmationSendFailed {
        conversation_id: ConversationId,
        version: DateTime<Utc>,
    },
}

/// Per-conversation delta: header facts plus a window of messages
#[derive(Debug, Clone)]
pub struct UpdatePayload {
    pub session_key: String,
    pub conversation_id: ConversationId,
    pub header: ConversationHeader,
    /// Server-side index of `messages[0]`
    pub first_message_index: usize,
    pub messages: Vec<Message>,
    /// Total messages the server holds for this conversation
    pub server_message_count: usize,
    pub confirmation_required: Option<String>,
}

/// Lightweight header for one conversation in a list snapshot
#[derive(Debug, Clone)]
pub struct ListedConversation {
    pub id: ConversationId,
    pub header: ConversationHeader,
    pub message_count: usize,
}

/// One page of the server's conversation directory
#[derive(Debug, Clone)]
pub struct ListConversationsPayload {
    pub session_key: Option<String>,
    pub conversations: Vec<ListedConversation>,
    /// Server's largest id at snapshot time; `None` when it has none
    pub max_conversation_id: Option<ConversationId>,
}
