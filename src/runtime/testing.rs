//! Mock implementations for testing
//!
//! These mocks let the runtime be driven without a server or a disk.

use super::settings::Settings;
use super::traits::*;
use crate::wire::ClientMessage;
use async_trait::async_trait;
use std::sync::Mutex;

// ============================================================================
// Mock Transport
// ============================================================================

/// Records every frame sent; can be told to fail the next few sends
#[derive(Default)]
pub struct MockTransport {
    sent: Mutex<Vec<ClientMessage>>,
    failures_remaining: Mutex<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` sends fail with `TransportError::Closed`
    pub fn fail_next_sends(&self, count: usize) {
        *self.failures_remaining.lock().unwrap() = count;
    }

    /// Frames delivered so far, in order
    pub fn sent(&self) -> Vec<ClientMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, message: ClientMessage) -> Result<(), TransportError> {
        {
            let mut failures = self.failures_remaining.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(TransportError::Closed);
            }
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

// ============================================================================
// In-memory Settings Store
// ============================================================================

pub struct MemorySettingsStore {
    settings: Mutex<Settings>,
    saves: Mutex<usize>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
            saves: Mutex::new(0),
        }
    }

    pub fn current(&self) -> Settings {
        *self.settings.lock().unwrap()
    }

    /// Number of `save` calls seen
    pub fn saves(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Settings, SettingsError> {
        Ok(self.current())
    }

    async fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        *self.settings.lock().unwrap() = *settings;
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}
