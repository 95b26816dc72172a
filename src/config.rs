//! Environment configuration

use std::path::PathBuf;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Where the auto-confirm flag is persisted
    pub settings_path: PathBuf,
    /// Startup override of the persisted auto-confirm flag
    pub auto_confirm: Option<bool>,
    /// Capacity of the runtime's event channel
    pub channel_capacity: usize,
}

impl MirrorConfig {
    pub fn from_env() -> Self {
        let settings_path = std::env::var("AGENT_MIRROR_SETTINGS_PATH").map_or_else(
            |_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".agent-mirror").join("settings.json")
            },
            PathBuf::from,
        );

        Self {
            settings_path,
            auto_confirm: std::env::var("AGENT_MIRROR_AUTO_CONFIRM")
                .ok()
                .and_then(|v| parse_flag(&v)),
            channel_capacity: std::env::var("AGENT_MIRROR_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_CHANNEL_CAPACITY),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        other => {
            tracing::warn!(value = %other, "Ignoring unrecognized AGENT_MIRROR_AUTO_CONFIRM");
            None
        }
    }
}
