//! Wire format of the server connection
//!
//! Each frame is a JSON object `{"event": <kind>, "data": {...}}`.

use crate::model::{ConversationId, Message};
use crate::sync::{
    ConversationHeader, Effect, Event, ListConversationsPayload, ListedConversation,
    UpdatePayload,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Frames sent by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    Update(UpdateData),
    ListConversations(ListConversationsData),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateData {
    pub session_key: String,
    pub conversation_id: ConversationId,
    #[serde(default)]
    pub conversation_name: Option<String>,
    pub conversation_state: String,
    #[serde(default)]
    pub conversation_state_emoji: String,
    pub last_state_change_time: DateTime<Utc>,
    #[serde(default)]
    pub first_message_index: usize,
    #[serde(default)]
    pub conversation: Vec<Message>,
    pub message_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_required: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConversationsData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
    #[serde(default)]
    pub conversations: Vec<ConversationSummary>,
    #[serde(default)]
    pub max_conversation_id: Option<ConversationId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    #[serde(default)]
    pub name: Option<String>,
    pub state: String,
    #[serde(default)]
    pub state_emoji: String,
    pub last_state_change_time: DateTime<Utc>,
    pub message_count: usize,
}

/// Frames sent by this client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    RequestUpdate {
        conversation_id: ConversationId,
        message_count: usize,
    },
    ListConversations {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_id: Option<ConversationId>,
    },
    Confirm {
        conversation_id: ConversationId,
        confirmation: String,
        message_count: usize,
    },
}

impl ServerMessage {
    pub fn parse(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}

impl ClientMessage {
    /// Wire frame for an outbound effect; `None` for local-only effects
    pub fn from_effect(effect: &Effect) -> Option<Self> {
        match effect {
            Effect::RequestUpdate {
                conversation_id,
                message_count,
            } => Some(ClientMessage::RequestUpdate {
                conversation_id: *conversation_id,
                message_count: *message_count,
            }),
            Effect::ListConversations { start_id } => Some(ClientMessage::ListConversations {
                start_id: *start_id,
            }),
            Effect::Confirm {
                conversation_id,
                confirmation,
                message_count,
                ..
            } => Some(ClientMessage::Confirm {
                conversation_id: *conversation_id,
                confirmation: confirmation.clone(),
                message_count: *message_count,
            }),
            Effect::PersistAutoConfirm { .. }
            | Effect::NotifyStoreChanged { .. }
            | Effect::NotifySelectionChanged { .. }
            | Effect::NotifyReset => None,
        }
    }

    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<UpdateData> for UpdatePayload {
    fn from(data: UpdateData) -> Self {
        UpdatePayload {
            session_key: data.session_key,
            conversation_id: data.conversation_id,
            header: ConversationHeader {
                name: data.conversation_name,
                lifecycle_state: data.conversation_state,
                state_emoji: data.conversation_state_emoji,
                last_state_change_time: data.last_state_change_time,
            },
            first_message_index: data.first_message_index,
            messages: data.conversation,
            server_message_count: data.message_count,
            confirmation_required: data.confirmation_required,
        }
    }
}

impl From<ConversationSummary> for ListedConversation {
    fn from(summary: ConversationSummary) -> Self {
        ListedConversation {
            id: summary.id,
            header: ConversationHeader {
                name: summary.name,
                lifecycle_state: summary.state,
                state_emoji: summary.state_emoji,
                last_state_change_time: summary.last_state_change_time,
            },
            message_count: summary.message_count,
        }
    }
}

impl From<ListConversationsData> for ListConversationsPayload {
    fn from(data: ListConversationsData) -> Self {
        ListConversationsPayload {
            session_key: data.session_key,
            conversations: data.conversations.into_iter().map(Into::into).collect(),
            max_conversation_id: data.max_conversation_id,
        }
    }
}

impl From<ServerMessage> for Event {
    fn from(message: ServerMessage) -> Self {
        match message {
            ServerMessage::Update(data) => Event::Update(data.into()),
            ServerMessage::ListConversations(data) => Event::ListConversations(data.into()),
        }
    }
}
