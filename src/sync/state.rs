//! Per-conversation mirror state

use crate::model::{ConversationId, Message, WAITING_FOR_CONFIRMATION};
use chrono::{DateTime, Utc};

/// Header facts the server reports for a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHeader {
    pub name: Option<String>,
    pub lifecycle_state: String,
    pub state_emoji: String,
    pub last_state_change_time: DateTime<Utc>,
}

/// Where a conversation stands in the confirmation handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationPhase {
    Normal,
    /// Server is waiting and this client has not answered the current version
    AwaitingConfirmation,
    /// A confirm was transmitted for the current version
    ConfirmationInFlight,
}

/// Local mirror of one server conversation
#[derive(Debug, Clone)]
pub struct ConversationState {
    id: ConversationId,
    name: String,
    lifecycle_state: String,
    state_emoji: String,
    last_state_change_time: DateTime<Utc>,
    last_confirmation_sent_time: Option<DateTime<Utc>>,
    /// Question the server is asking, when it sent one
    pending_confirmation: Option<String>,
    messages: Vec<Message>,
}

impl ConversationState {
    pub(crate) fn new(id: ConversationId, header: ConversationHeader) -> Self {
        let mut state = Self {
            id,
            name: String::new(),
            lifecycle_state: String::new(),
            state_emoji: String::new(),
            last_state_change_time: header.last_state_change_time,
            last_confirmation_sent_time: None,
            pending_confirmation: None,
            messages: Vec::new(),
        };
        state.update_header(header);
        state
    }

    /// Overwrite the mutable header fields; messages and confirmation
    /// bookkeeping are left alone.
    pub(crate) fn update_header(&mut self, header: ConversationHeader) {
        self.name = header
            .name
            .unwrap_or_else(|| format!("Conversation {}", self.id));
        self.lifecycle_state = header.lifecycle_state;
        self.state_emoji = header.state_emoji;
        self.last_state_change_time = header.last_state_change_time;
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifecycle_state(&self) -> &str {
        &self.lifecycle_state
    }

    pub fn state_emoji(&self) -> &str {
        &self.state_emoji
    }

    pub fn last_state_change_time(&self) -> DateTime<Utc> {
        self.last_state_change_time
    }

    pub fn last_confirmation_sent_time(&self) -> Option<DateTime<Utc>> {
        self.last_confirmation_sent_time
    }

    pub fn pending_confirmation(&self) -> Option<&str> {
        self.pending_confirmation.as_deref()
    }

    pub(crate) fn set_pending_confirmation(&mut self, prompt: Option<String>) {
        self.pending_confirmation = prompt;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub(crate) fn append_messages(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    pub fn is_waiting_for_confirmation(&self) -> bool {
        self.lifecycle_state == WAITING_FOR_CONFIRMATION
    }

    /// True iff the server is waiting and no confirm was sent for the
    /// current `last_state_change_time`.
    pub fn is_confirmation_outstanding(&self) -> bool {
        self.is_waiting_for_confirmation()
            && self
                .last_confirmation_sent_time
                .is_none_or(|sent| sent < self.last_state_change_time)
    }

    pub fn confirmation_phase(&self) -> ConfirmationPhase {
        if self.is_confirmation_outstanding() {
            ConfirmationPhase::AwaitingConfirmation
        } else if self.last_confirmation_sent_time == Some(self.last_state_change_time) {
            ConfirmationPhase::ConfirmationInFlight
        } else {
            ConfirmationPhase::Normal
        }
    }

    /// Record a confirm transmission for the current version
    pub(crate) fn mark_confirmation_sent(&mut self) -> DateTime<Utc> {
        self.last_confirmation_sent_time = Some(self.last_state_change_time);
        self.last_state_change_time
    }

    /// Undo `mark_confirmation_sent` if it still refers to `version`.
    /// Any earlier send was for an older version, so clearing is enough to
    /// make the current one outstanding again.
    pub(crate) fn clear_confirmation_sent(&mut self, version: DateTime<Utc>) -> bool {
        if self.last_confirmation_sent_time != Some(version) {
            return false;
        }
        self.last_confirmation_sent_time = None;
        true
    }

    /// Selector label: `"{name} ({message_count}, {emoji})"`
    pub fn label(&self) -> String {
        format!(
            "{} ({}, {})",
            self.name,
            self.message_count(),
            self.state_emoji
        )
    }

    /// Humanized state, e.g. `"⏳ Waiting for confirmation"`
    pub fn display_state(&self) -> String {
        let pretty = self.lifecycle_state.replace('_', " ").to_lowercase();
        let mut chars = pretty.chars();
        let sentence = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("{} {}", self.state_emoji, sentence)
    }
}
