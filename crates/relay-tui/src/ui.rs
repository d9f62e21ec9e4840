use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::transcript::transcript_lines;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Header, transcript, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!(" {} ", app.mode.title()), Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("→ {}", app.endpoint_url), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Transcript ");

    let session = app.controller.session();
    let text = if session.transcript().is_empty() && !session.is_awaiting_reply() {
        Text::from(Span::styled(
            app.mode.empty_hint(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(transcript_lines(session, app.mode, app.animation_frame))
    };

    // Count rows with the same word wrap the panel is drawn with
    let chat = Paragraph::new(text).wrap(Wrap { trim: false });
    let total_lines = u16::try_from(chat.line_count(app.chat_width)).unwrap_or(u16::MAX);
    app.follow_latest(total_lines);

    let chat = chat.block(block).scroll((app.scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let busy = app.is_awaiting_reply();
    let (title, border_color) = if busy {
        let dots = ".".repeat(app.animation_frame as usize % 3 + 1);
        (format!(" {}{} ", app.mode.busy_label(), dots), Color::DarkGray)
    } else {
        (" Enter to send ".to_string(), Color::Yellow)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;
    let scroll_offset = if inner_width > 0 && cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let input = if app.draft().is_empty() {
        Paragraph::new(Span::styled(
            app.mode.placeholder(),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        let visible: String = app
            .draft()
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(block), area);

    let cursor_x = u16::try_from(cursor_pos - scroll_offset).unwrap_or(0);
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let mode_style = if app.is_awaiting_reply() {
        Style::default().bg(Color::Yellow).fg(Color::Black)
    } else {
        Style::default().bg(Color::Blue).fg(Color::White)
    };

    let hints = Line::from(vec![
        Span::styled(format!(" {} ", app.mode.as_str().to_uppercase()), mode_style),
        Span::raw(" "),
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" page ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    frame.render_widget(Paragraph::new(hints), area);
}
