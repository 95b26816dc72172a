//! Server session rollover detection

/// Result of comparing an inbound session key with the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionObservation {
    Unchanged,
    /// Local mirror is void; caller must reset before applying the payload
    Reset,
}

/// Holds the single active session key
#[derive(Debug, Default)]
pub struct SessionTracker {
    current: Option<String>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Compare against the stored key and adopt `key`. The first key ever
    /// seen also reports `Reset`.
    pub fn observe(&mut self, key: &str) -> SessionObservation {
        if self.current.as_deref() == Some(key) {
            return SessionObservation::Unchanged;
        }
        tracing::info!(
            previous = ?self.current,
            session_key = %key,
            "Server session changed"
        );
        self.current = Some(key.to_string());
        SessionObservation::Reset
    }
}
