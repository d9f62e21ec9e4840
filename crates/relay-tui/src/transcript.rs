//! Formats the session transcript for the chat panel.
//!
//! User text is shown literally, bot text is rendered as markdown. Each entry
//! gets a role label with its `HH:MM` timestamp and a trailing blank line.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use relay_core::{Message, Mode, Role, Session};

use crate::markdown::render_markdown;

pub fn transcript_lines(session: &Session, mode: Mode, animation_frame: u8) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for message in session.transcript() {
        lines.push(label_line(message, mode));
        match message.role {
            Role::User => {
                lines.extend(message.text.lines().map(|l| Line::from(l.to_string())));
            }
            Role::Bot => lines.extend(render_markdown(&message.text)),
        }
        lines.push(Line::default());
    }

    if session.is_awaiting_reply() {
        lines.push(Line::from(Span::styled(
            format!("{}:", mode.bot_label()),
            bot_label_style(),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize % 3) + 1);
        lines.push(Line::from(Span::styled(
            format!("{}{}", mode.busy_label(), dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn label_line(message: &Message, mode: Mode) -> Line<'static> {
    let (label, style) = match message.role {
        Role::User => ("You", user_label_style()),
        Role::Bot => (mode.bot_label(), bot_label_style()),
    };

    let mut spans = vec![Span::styled(format!("{label}:"), style)];
    if let Some(timestamp) = &message.timestamp {
        spans.push(Span::styled(
            format!(" {timestamp}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn user_label_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn bot_label_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;

    #[test]
    fn empty_session_renders_nothing() {
        let session = Session::default();
        assert!(transcript_lines(&session, Mode::Chat, 0).is_empty());
    }

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[tokio::test]
    async fn user_text_is_literal_and_bot_text_is_markdown() {
        let mut app = test_app(false);
        app.controller.set_draft("**not bold**");
        app.submit();

        let waiting: Vec<String> = transcript_lines(app.controller.session(), Mode::Chat, 1)
            .iter()
            .map(plain)
            .collect();
        assert!(waiting[0].starts_with("You: "));
        assert_eq!(waiting[1], "**not bold**");
        assert_eq!(waiting.last().map(String::as_str), Some("Thinking.."));

        app.controller.wait_reply().await;
        let lines: Vec<String> = transcript_lines(app.controller.session(), Mode::Research, 0)
            .iter()
            .map(plain)
            .collect();
        assert!(lines[3].starts_with("Research: "));
        assert_eq!(lines[4], "echo: not bold");
        assert!(!lines.iter().any(|l| l.starts_with("Searching")));
    }
}
