//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the runtime with mock implementations.

use super::settings::Settings;
use crate::wire::ClientMessage;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Transport closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outbound half of the server connection
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one frame to the server
    async fn send(&self, message: ClientMessage) -> Result<(), TransportError>;
}

/// Local persistence for settings that outlive server sessions
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<Settings, SettingsError>;

    async fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, message: ClientMessage) -> Result<(), TransportError> {
        (**self).send(message).await
    }
}

#[async_trait]
impl<T: SettingsStore + ?Sized> SettingsStore for Arc<T> {
    async fn load(&self) -> Result<Settings, SettingsError> {
        (**self).load().await
    }

    async fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        (**self).save(settings).await
    }
}
