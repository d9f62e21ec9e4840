use serde::{Deserialize, Serialize};

/// Which endpoint contract the front end speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// `{user_id, message}` in, `{response}` out.
    #[default]
    Chat,
    /// `{topic}` in, `{markdown | content}` out.
    Research,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Chat => "chat",
            Mode::Research => "research",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "chat" => Some(Mode::Chat),
            "research" => Some(Mode::Research),
            _ => None,
        }
    }

    pub fn all() -> Vec<Mode> {
        vec![Mode::Chat, Mode::Research]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Mode::Chat => "Chat",
            Mode::Research => "Deep Research Engine",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Mode::Chat => "http://localhost:8000/chat",
            Mode::Research => "https://deep-research-agent-2.onrender.com/generate",
        }
    }

    pub fn default_failure_message(&self) -> &'static str {
        match self {
            Mode::Chat => "⚠ Error: Unable to get a response. Please try again.",
            Mode::Research => "⚠ Failed to fetch research results. Please try again.",
        }
    }

    /// Hint shown in the empty input box
    pub fn placeholder(&self) -> &'static str {
        match self {
            Mode::Chat => "Type a message...",
            Mode::Research => "Enter the topic",
        }
    }

    /// Label for the in-flight indicator, without the trailing ellipsis
    pub fn busy_label(&self) -> &'static str {
        match self {
            Mode::Chat => "Thinking",
            Mode::Research => "Searching",
        }
    }

    pub fn bot_label(&self) -> &'static str {
        match self {
            Mode::Chat => "Bot",
            Mode::Research => "Research",
        }
    }

    pub fn empty_hint(&self) -> &'static str {
        match self {
            Mode::Chat => "Start the conversation below...",
            Mode::Research => "Research results will appear here...",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Mode::from_str("Chat"), Some(Mode::Chat));
        assert_eq!(Mode::from_str(" RESEARCH "), Some(Mode::Research));
        assert_eq!(Mode::from_str("search"), None);
    }

    #[test]
    fn round_trips_through_as_str() {
        for mode in Mode::all() {
            assert_eq!(Mode::from_str(mode.as_str()), Some(mode));
        }
    }
}
