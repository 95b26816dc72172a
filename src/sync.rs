//! Conversation mirror synchronization core
//!
//! Same shape as a pure state machine: events in, effects out. The
//! runtime owns the I/O.

mod confirmation;
mod effect;
pub mod event;
mod reconcile;
mod session;
pub mod state;
mod store;

#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(test)]
mod proptests;

pub use confirmation::{AutoConfirmPolicy, ConfirmationCoordinator};
pub use effect::Effect;
pub use event::{Event, ListConversationsPayload, ListedConversation, UpdatePayload};
pub use reconcile::{ClientSyncState, SyncError};
pub use session::{SessionObservation, SessionTracker};
pub use state::{ConfirmationPhase, ConversationHeader, ConversationState};
pub use store::{ConversationStore, StoreError};
