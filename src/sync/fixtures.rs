//! Builders shared by the sync and runtime tests

use super::event::{ListConversationsPayload, ListedConversation, UpdatePayload};
use super::state::ConversationHeader;
use crate::model::{ContentSection, ConversationId, Message};
use chrono::{DateTime, TimeZone, Utc};

pub const SESSION: &str = "session-a";

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// The `index`-th message of a conversation, distinguishable by content
pub fn msg(index: usize) -> Message {
    let secs = i64::try_from(index).unwrap();
    Message::new(if index % 2 == 0 { "user" } else { "assistant" }, at(secs))
        .with_section(ContentSection::text([format!("message {index}")]))
}

pub fn msgs(range: std::ops::Range<usize>) -> Vec<Message> {
    range.map(msg).collect()
}

pub fn header(state: &str, changed_at: i64) -> ConversationHeader {
    ConversationHeader {
        name: None,
        lifecycle_state: state.to_string(),
        state_emoji: "🤖".to_string(),
        last_state_change_time: at(changed_at),
    }
}

pub fn update(
    conversation_id: ConversationId,
    first_message_index: usize,
    messages: Vec<Message>,
    server_message_count: usize,
) -> UpdatePayload {
    UpdatePayload {
        session_key: SESSION.to_string(),
        conversation_id,
        header: header("RUNNING", 1),
        first_message_index,
        messages,
        server_message_count,
        confirmation_required: None,
    }
}

/// Header-only update putting a conversation in `state` at `changed_at`
pub fn state_update(
    conversation_id: ConversationId,
    state: &str,
    changed_at: i64,
) -> UpdatePayload {
    UpdatePayload {
        header: header(state, changed_at),
        ..update(conversation_id, 0, Vec::new(), 0)
    }
}

pub fn listed(id: ConversationId, message_count: usize) -> ListedConversation {
    ListedConversation {
        id,
        header: header("RUNNING", 1),
        message_count,
    }
}

pub fn list_page(
    conversations: Vec<ListedConversation>,
    max_conversation_id: Option<ConversationId>,
) -> ListConversationsPayload {
    ListConversationsPayload {
        session_key: None,
        conversations,
        max_conversation_id,
    }
}
