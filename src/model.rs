//! Conversation message value types
//!
//! Messages are immutable once received. The synchronization core only
//! compares and counts them; section structure matters to the view layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned conversation identifier (monotonically allocated)
pub type ConversationId = u64;

/// The one lifecycle state the core interprets
pub const WAITING_FOR_CONFIRMATION: &str = "WAITING_FOR_CONFIRMATION";

/// Sections longer than this are rendered collapsed
const COLLAPSE_THRESHOLD_LINES: usize = 5;

/// Maximum length of a collapsed section preview
const PREVIEW_MAX_CHARS: usize = 100;

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub creation_time: DateTime<Utc>,
    #[serde(default)]
    pub content_sections: Vec<ContentSection>,
}

impl Message {
    pub fn new(role: impl Into<String>, creation_time: DateTime<Utc>) -> Self {
        Self {
            role: role.into(),
            creation_time,
            content_sections: Vec::new(),
        }
    }

    pub fn with_section(mut self, section: ContentSection) -> Self {
        self.content_sections.push(section);
        self
    }
}

/// One block of message content
///
/// `command` and `command_output` are the server's rendering of the
/// structured values and are carried as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_output: Option<String>,
}

/// View-boundary classification of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Text,
    Command,
    CommandOutput,
}

impl ContentSection {
    pub fn text(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            content: lines.into_iter().map(Into::into).collect(),
            summary: None,
            command: None,
            command_output: None,
        }
    }

    pub fn kind(&self) -> SectionKind {
        if self.command_output.is_some() {
            SectionKind::CommandOutput
        } else if self.command.is_some() {
            SectionKind::Command
        } else {
            SectionKind::Text
        }
    }

    pub fn line_count(&self) -> usize {
        self.content.len()
    }

    pub fn is_collapsible(&self) -> bool {
        self.line_count() > COLLAPSE_THRESHOLD_LINES
    }

    /// One-line preview shown while the section is collapsed
    pub fn preview(&self) -> String {
        let first = self
            .summary
            .as_deref()
            .or_else(|| self.content.first().map(String::as_str))
            .unwrap_or_default();

        if first.chars().count() > PREVIEW_MAX_CHARS {
            let truncated: String = first.chars().take(PREVIEW_MAX_CHARS).collect();
            format!("{truncated}...")
        } else {
            first.to_string()
        }
    }
}
