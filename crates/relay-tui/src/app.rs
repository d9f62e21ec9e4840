use relay_core::{Config, Mode, SessionController};

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub should_quit: bool,
    pub mode: Mode,
    pub endpoint_url: String,
    pub controller: SessionController,

    // Input state
    pub cursor: usize, // cursor position in the draft, in chars

    // Chat panel state
    pub scroll: u16,
    pub chat_height: u16, // Inner height of chat area for scroll calculations
    pub chat_width: u16,  // Inner width of chat area for wrap calculations
    /// (transcript length, awaiting reply) at the last render; a change
    /// means the view jumps to the newest entry
    last_seen: (usize, bool),

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self::with_controller(
            SessionController::from_config(config),
            config.mode,
            config.endpoint_url(),
        )
    }

    pub fn with_controller(controller: SessionController, mode: Mode, endpoint_url: &str) -> Self {
        Self {
            should_quit: false,
            mode,
            endpoint_url: endpoint_url.to_string(),
            controller,
            cursor: 0,
            scroll: 0,
            chat_height: 0,
            chat_width: 0,
            last_seen: (0, false),
            animation_frame: 0,
        }
    }

    pub fn draft(&self) -> &str {
        self.controller.session().draft()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.controller.session().is_awaiting_reply()
    }

    pub fn submit(&mut self) {
        if self.controller.submit() {
            self.cursor = 0;
            self.animation_frame = 0;
        }
    }

    /// Tick: advance the ellipsis and pick up a reply that has arrived.
    pub fn tick(&mut self) {
        self.controller.poll_reply();
        if self.is_awaiting_reply() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Draft editing

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(self.draft(), self.cursor);
        self.controller.draft_mut().insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(self.draft(), self.cursor);
            self.controller.draft_mut().remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.draft().chars().count() {
            let byte_pos = char_to_byte_index(self.draft(), self.cursor);
            self.controller.draft_mut().remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.draft().chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.draft().chars().count();
    }

    // Chat scrolling

    pub fn scroll_up(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_add(rows);
    }

    pub fn page_rows(&self) -> u16 {
        self.chat_height.saturating_sub(1).max(1)
    }

    /// Called by the renderer with the wrapped height of the transcript.
    ///
    /// Jumps to the bottom whenever the transcript or busy state changed since
    /// the last frame, and keeps manual scrolling within bounds otherwise.
    pub fn follow_latest(&mut self, total_lines: u16) {
        let max_scroll = total_lines.saturating_sub(self.chat_height);
        let seen = (
            self.controller.session().transcript().len(),
            self.is_awaiting_reply(),
        );

        if seen != self.last_seen {
            self.last_seen = seen;
            self.scroll = max_scroll;
        }
        self.scroll = self.scroll.min(max_scroll);
    }
}
