//! Markdown rendering using pulldown-cmark.
//!
//! [`render_markdown`] turns reply text into styled ratatui lines. Tables
//! (GitHub syntax) are laid out with padded columns and a header rule.

use pulldown_cmark::{Alignment, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

const COLUMN_SEPARATOR: &str = " │ ";
const RULE_WIDTH: usize = 24;

pub fn render_markdown(input: &str) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = MarkdownRenderer::default();
    for event in Parser::new_ext(input, options) {
        renderer.handle_event(event);
    }
    renderer.finish()
}

#[derive(Default)]
struct MarkdownRenderer {
    lines: Vec<Line<'static>>,
    /// Stack of active styles for nested formatting
    style_stack: Vec<Style>,
    current_spans: Vec<Span<'static>>,
    /// One entry per open list: next number for ordered lists
    list_stack: Vec<Option<u64>>,
    pending_list_marker: Option<String>,
    in_code_block: bool,
    quote_depth: usize,
    table: Option<TableBuilder>,
}

impl MarkdownRenderer {
    fn handle_event(&mut self, event: Event<'_>) {
        if let Some(table) = self.table.as_mut() {
            if table.handle_event(&event) {
                return;
            }
        }

        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_line();
                self.style_stack.push(heading_style(level));
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush_line();
                self.style_stack.pop();
                self.blank_line();
            }

            Event::Start(Tag::Emphasis) => {
                self.style_stack.push(Style::default().add_modifier(Modifier::ITALIC));
            }
            Event::Start(Tag::Strong) => {
                self.style_stack.push(Style::default().add_modifier(Modifier::BOLD));
            }
            Event::Start(Tag::Strikethrough) => {
                self.style_stack
                    .push(Style::default().add_modifier(Modifier::CROSSED_OUT));
            }
            Event::Start(Tag::Link { .. }) => {
                self.style_stack.push(
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link) => {
                self.style_stack.pop();
            }

            Event::Start(Tag::CodeBlock(_)) => {
                self.flush_line();
                self.in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                self.flush_line();
                self.in_code_block = false;
                self.blank_line();
            }

            Event::Start(Tag::List(start)) => {
                self.flush_line();
                self.list_stack.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }
            Event::Start(Tag::Item) => {
                self.flush_line();
                let indent = "  ".repeat(self.list_stack.len().saturating_sub(1));
                let marker = match self.list_stack.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.pending_list_marker = Some(marker);
            }
            Event::End(TagEnd::Item) => {
                self.flush_line();
            }
            Event::TaskListMarker(checked) => {
                self.push_span(Span::raw(if checked { "[x] " } else { "[ ] " }));
            }

            Event::Start(Tag::BlockQuote) => {
                self.flush_line();
                self.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote) => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }

            Event::Start(Tag::Table(alignments)) => {
                self.flush_line();
                self.table = Some(TableBuilder::new(alignments));
            }
            Event::End(TagEnd::Table) => {
                if let Some(table) = self.table.take() {
                    self.lines.extend(table.render());
                    self.blank_line();
                }
            }

            Event::End(TagEnd::Paragraph) => {
                self.flush_line();
                // Tight spacing inside lists
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }

            Event::Text(text) | Event::Html(text) => self.add_text(&text),
            Event::Code(code) => {
                self.push_span(Span::styled(
                    code.to_string(),
                    Style::default().fg(Color::Yellow),
                ));
            }
            Event::SoftBreak => self.add_text(" "),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(RULE_WIDTH),
                    Style::default().fg(Color::DarkGray),
                )));
                self.blank_line();
            }

            _ => {}
        }
    }

    fn add_text(&mut self, text: &str) {
        if self.in_code_block {
            let style = Style::default().fg(Color::Green);
            for line in text.split_inclusive('\n') {
                let content = line.trim_end_matches('\n');
                self.push_span(Span::styled(format!("  {content}"), style));
                if line.ends_with('\n') {
                    self.flush_line();
                }
            }
            return;
        }

        let style = self.current_style();
        self.push_span(Span::styled(text.to_string(), style));
    }

    fn push_span(&mut self, span: Span<'static>) {
        if self.current_spans.is_empty() {
            if self.quote_depth > 0 {
                self.current_spans.push(Span::styled(
                    "│ ".repeat(self.quote_depth),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            if let Some(marker) = self.pending_list_marker.take() {
                self.current_spans.push(Span::styled(marker, Style::default().fg(Color::Cyan)));
            }
        }
        self.current_spans.push(span);
    }

    fn current_style(&self) -> Style {
        self.style_stack
            .iter()
            .fold(Style::default(), |acc, style| acc.patch(*style))
    }

    fn flush_line(&mut self) {
        if !self.current_spans.is_empty() {
            let spans = std::mem::take(&mut self.current_spans);
            self.lines.push(Line::from(spans));
        }
    }

    /// Separator line, collapsing runs of blanks.
    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|l| l.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        if let Some(table) = self.table.take() {
            self.lines.extend(table.render());
        }
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    let style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => style.add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => style,
        _ => Style::default().add_modifier(Modifier::BOLD),
    }
}

/// Collects cell text until the table ends, then lays out the columns.
struct TableBuilder {
    alignments: Vec<Alignment>,
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
    current_row: Vec<String>,
    current_cell: String,
}

impl TableBuilder {
    fn new(alignments: Vec<Alignment>) -> Self {
        Self {
            alignments,
            header: None,
            rows: Vec::new(),
            current_row: Vec::new(),
            current_cell: String::new(),
        }
    }

    /// Consume events that belong to the table. Returns `false` for the
    /// table's end so the caller can emit it.
    fn handle_event(&mut self, event: &Event<'_>) -> bool {
        match event {
            Event::Start(Tag::TableHead | Tag::TableRow) => self.current_row.clear(),
            Event::End(TagEnd::TableHead) => {
                self.header = Some(std::mem::take(&mut self.current_row));
            }
            Event::End(TagEnd::TableRow) => {
                self.rows.push(std::mem::take(&mut self.current_row));
            }
            Event::Start(Tag::TableCell) => self.current_cell.clear(),
            Event::End(TagEnd::TableCell) => {
                self.current_row
                    .push(std::mem::take(&mut self.current_cell).trim().to_string());
            }
            Event::Text(text) | Event::Code(text) | Event::Html(text) => {
                self.current_cell.push_str(text)
            }
            Event::SoftBreak | Event::HardBreak => self.current_cell.push(' '),
            Event::End(TagEnd::Table) => return false,
            _ => {}
        }
        true
    }

    fn column_widths(&self) -> Vec<usize> {
        let columns = self
            .header
            .iter()
            .chain(self.rows.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(self.alignments.len());

        let mut widths = vec![0; columns];
        for row in self.header.iter().chain(self.rows.iter()) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        widths
    }

    fn render(self) -> Vec<Line<'static>> {
        let widths = self.column_widths();
        let mut lines = Vec::new();

        if let Some(header) = &self.header {
            let style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
            lines.push(self.render_row(header, &widths, style));

            let rule = widths
                .iter()
                .map(|w| "─".repeat(*w))
                .collect::<Vec<_>>()
                .join("─┼─");
            lines.push(Line::from(Span::styled(rule, Style::default().fg(Color::DarkGray))));
        }
        for row in &self.rows {
            lines.push(self.render_row(row, &widths, Style::default()));
        }
        lines
    }

    fn render_row(&self, row: &[String], widths: &[usize], style: Style) -> Line<'static> {
        let separator = Style::default().fg(Color::DarkGray);
        let mut spans = Vec::with_capacity(widths.len() * 2);

        for (i, width) in widths.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(COLUMN_SEPARATOR, separator));
            }
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            let alignment = self.alignments.get(i).copied().unwrap_or(Alignment::None);
            spans.push(Span::styled(pad_cell(cell, *width, alignment), style));
        }
        Line::from(spans)
    }
}

fn pad_cell(cell: &str, width: usize, alignment: Alignment) -> String {
    let fill = width.saturating_sub(cell.chars().count());
    match alignment {
        Alignment::Right => format!("{}{cell}", " ".repeat(fill)),
        Alignment::Center => {
            let left = fill / 2;
            format!("{}{cell}{}", " ".repeat(left), " ".repeat(fill - left))
        }
        Alignment::Left | Alignment::None => format!("{cell}{}", " ".repeat(fill)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn plain_lines(input: &str) -> Vec<String> {
        render_markdown(input).iter().map(plain).collect()
    }

    #[test]
    fn table_columns_are_padded_and_separated() {
        let lines = plain_lines("| Name | Qty |\n|------|----:|\n| apple | 3 |\n| fig | 12 |");

        assert_eq!(
            lines,
            vec![
                "Name  │ Qty",
                "──────┼────",
                "apple │   3",
                "fig   │  12",
            ]
        );
    }

    #[test]
    fn table_header_is_bold() {
        let lines = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |");
        let header_cell = &lines[0].spans[0];
        assert!(header_cell.style.add_modifier.contains(Modifier::BOLD));
        assert!(!lines[2].spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn text_after_a_table_keeps_rendering() {
        let lines = plain_lines("| a |\n|---|\n| 1 |\n\nAfter the table.");
        assert_eq!(lines.last().map(String::as_str), Some("After the table."));
        assert!(lines.iter().any(|l| l == "a"));
    }

    #[test]
    fn ragged_rows_are_filled() {
        let lines = plain_lines("| a | b |\n|---|---|\n| only |");
        assert_eq!(lines[2], "only │  ");
    }

    #[test]
    fn centered_cells_split_padding() {
        assert_eq!(pad_cell("ab", 6, Alignment::Center), "  ab  ");
        assert_eq!(pad_cell("ab", 5, Alignment::Center), " ab  ");
    }

    #[test]
    fn strong_and_emphasis_are_styled() {
        let lines = render_markdown("plain **bold** and *soft*");
        assert_eq!(lines.len(), 1);

        let bold = lines[0].spans.iter().find(|s| s.content == "bold").unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        let soft = lines[0].spans.iter().find(|s| s.content == "soft").unwrap();
        assert!(soft.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn lists_get_markers() {
        let lines = plain_lines("- one\n- two\n\n1. first\n2. second");
        assert_eq!(lines, vec!["• one", "• two", "", "1. first", "2. second"]);
    }

    #[test]
    fn code_blocks_are_indented_line_by_line() {
        let lines = plain_lines("```\nlet x = 1;\nlet y = 2;\n```");
        assert_eq!(lines, vec!["  let x = 1;", "  let y = 2;"]);
    }

    #[test]
    fn paragraphs_are_separated_by_one_blank_line() {
        let lines = plain_lines("# Title\n\nFirst.\n\nSecond.");
        assert_eq!(lines, vec!["Title", "", "First.", "", "Second."]);
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render_markdown("").is_empty());
    }
}
