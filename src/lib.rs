//! Agent Mirror - client-side mirror of server agent conversations
//!
//! The sync core keeps a local copy of every conversation on one server
//! session, pulls missing messages incrementally, and answers
//! confirmation prompts at most once per state change.

pub mod config;
pub mod model;
pub mod runtime;
pub mod sync;
pub mod wire;
