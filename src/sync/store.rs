//! Keyed collection of mirrored conversations

use super::state::{ConversationHeader, ConversationState};
use crate::model::ConversationId;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Conversation store is empty")]
    Empty,
}

/// All conversations of the current session plus the shown selection
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: BTreeMap<ConversationId, ConversationState>,
    shown: Option<ConversationId>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh entry for an unseen id or refresh the header of an
    /// existing one. Never touches messages.
    pub fn create_or_update(
        &mut self,
        id: ConversationId,
        header: ConversationHeader,
    ) -> &mut ConversationState {
        match self.conversations.entry(id) {
            Entry::Occupied(entry) => {
                let conversation = entry.into_mut();
                conversation.update_header(header);
                conversation
            }
            Entry::Vacant(entry) => {
                tracing::debug!(conversation_id = id, "Creating conversation");
                entry.insert(ConversationState::new(id, header))
            }
        }
    }

    pub fn get(&self, id: ConversationId) -> Option<&ConversationState> {
        self.conversations.get(&id)
    }

    pub fn get_mut(&mut self, id: ConversationId) -> Option<&mut ConversationState> {
        self.conversations.get_mut(&id)
    }

    pub fn contains(&self, id: ConversationId) -> bool {
        self.conversations.contains_key(&id)
    }

    /// Ids in ascending order
    pub fn all_ids(&self) -> Vec<ConversationId> {
        self.conversations.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationState> {
        self.conversations.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ConversationState> {
        self.conversations.values_mut()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Largest id present. An empty store is an error rather than a
    /// default so pagination cursors are never computed from nothing.
    pub fn max_id(&self) -> Result<ConversationId, StoreError> {
        self.conversations
            .keys()
            .next_back()
            .copied()
            .ok_or(StoreError::Empty)
    }

    /// Local message count for `id`, zero when unknown
    pub fn message_count(&self, id: ConversationId) -> usize {
        self.get(id).map_or(0, ConversationState::message_count)
    }

    pub fn shown(&self) -> Option<ConversationId> {
        self.shown
    }

    pub fn shown_conversation(&self) -> Option<&ConversationState> {
        self.shown.and_then(|id| self.get(id))
    }

    /// Show `id`. Returns false (and changes nothing) for unknown ids.
    pub fn set_shown(&mut self, id: ConversationId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.shown = Some(id);
        true
    }

    /// Show `id` only when nothing is shown yet
    pub fn show_if_unset(&mut self, id: ConversationId) -> bool {
        if self.shown.is_some() {
            return false;
        }
        self.set_shown(id)
    }

    pub fn reset(&mut self) {
        self.conversations.clear();
        self.shown = None;
    }
}
