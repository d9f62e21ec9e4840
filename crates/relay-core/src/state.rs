//! UI-agnostic conversation types
//!
//! These types are shared by every front end (the terminal UI and the one-shot
//! `ask` command) and don't depend on any UI framework.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Format used for message timestamps (local hour and minute).
pub const TIMESTAMP_FORMAT: &str = "%H:%M";

/// A single transcript entry. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub timestamp: Option<String>,
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Message {
    /// A locally authored message stamped with the current time.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Some(timestamp_now()),
        }
    }

    /// A reply (or failure placeholder) stamped with the time of receipt.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
            timestamp: Some(timestamp_now()),
        }
    }
}

/// Current local time as `HH:MM`.
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Append-only, insertion-ordered list of messages (oldest first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_hour_and_minute() {
        let stamp = timestamp_now();
        assert_eq!(stamp.len(), 5);
        assert_eq!(&stamp[2..3], ":");
        assert!(stamp[..2].chars().all(|c| c.is_ascii_digit()));
        assert!(stamp[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn transcript_keeps_insertion_order() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("first"));
        transcript.push(Message::bot("second"));
        transcript.push(Message::user("third"));

        let texts: Vec<&str> = transcript.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
        assert_eq!(transcript.last().map(|m| m.role), Some(Role::User));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message {
            role: Role::Bot,
            text: "hi".to_string(),
            timestamp: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"role":"bot","text":"hi","timestamp":null}"#);
    }
}
