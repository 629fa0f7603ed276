//! Minimal code buffer backing the editor pane.
//!
//! Plain text plus a byte-offset cursor kept on char boundaries. No
//! selection, no undo. Tab inserts four spaces to match what the grader
//! expects from pasted Python.

const TAB_SPACES: &str = "    ";

#[derive(Debug, Clone, Default)]
pub struct CodeBuffer {
    text: String,
    cursor: usize,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Replace the whole buffer, cursor at the end. Used for draft restores.
    pub fn set_text(&mut self, text: String) {
        self.cursor = text.len();
        self.text = text;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\t' {
            self.insert_str(TAB_SPACES);
        } else {
            self.text.insert(self.cursor, ch);
            self.cursor += ch.len_utf8();
        }
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_boundary(&self.text, self.cursor);
        self.text.replace_range(prev..self.cursor, "");
        self.cursor = prev;
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = prev_boundary(&self.text, self.cursor);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.len() {
            self.cursor = next_boundary(&self.text, self.cursor);
        }
    }

    pub fn move_up(&mut self) {
        let (line, col) = self.cursor_line_col();
        if line == 0 {
            return;
        }
        self.cursor = offset_for(&self.text, line - 1, col);
    }

    pub fn move_down(&mut self) {
        let (line, col) = self.cursor_line_col();
        let last = self.text.split('\n').count() - 1;
        if line >= last {
            return;
        }
        self.cursor = offset_for(&self.text, line + 1, col);
    }

    pub fn move_line_start(&mut self) {
        let (line, _) = self.cursor_line_col();
        self.cursor = offset_for(&self.text, line, 0);
    }

    pub fn move_line_end(&mut self) {
        let (line, _) = self.cursor_line_col();
        self.cursor = offset_for(&self.text, line, usize::MAX);
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// Cursor position as (line index, char column).
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let line = before.matches('\n').count();
        let col = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count(),
            None => before.chars().count(),
        };
        (line, col)
    }
}

fn prev_boundary(text: &str, at: usize) -> usize {
    let mut i = at - 1;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn next_boundary(text: &str, at: usize) -> usize {
    let mut i = at + 1;
    while i < text.len() && !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Byte offset of `col` chars into line `line`, clamped to the line's length.
fn offset_for(text: &str, line: usize, col: usize) -> usize {
    let mut offset = 0;
    for (i, l) in text.split('\n').enumerate() {
        if i == line {
            let mut taken = 0;
            for (byte, _) in l.char_indices() {
                if taken == col {
                    return offset + byte;
                }
                taken += 1;
            }
            return offset + l.len();
        }
        offset += l.len() + 1;
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_builds_text() {
        let mut buf = CodeBuffer::new();
        for ch in "ab".chars() {
            buf.insert_char(ch);
        }
        buf.newline();
        buf.insert_char('c');
        assert_eq!(buf.text(), "ab\nc");
        assert_eq!(buf.cursor_line_col(), (1, 1));
    }

    #[test]
    fn tab_expands_to_spaces() {
        let mut buf = CodeBuffer::new();
        buf.insert_char('\t');
        buf.insert_char('x');
        assert_eq!(buf.text(), "    x");
    }

    #[test]
    fn backspace_handles_multibyte() {
        let mut buf = CodeBuffer::new();
        buf.insert_str("aé");
        buf.backspace();
        assert_eq!(buf.text(), "a");
        buf.backspace();
        assert_eq!(buf.text(), "");
        // Empty buffer: backspace is a no-op.
        buf.backspace();
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn vertical_movement_clamps_column() {
        let mut buf = CodeBuffer::new();
        buf.set_text("long line\nhi\nanother".to_string());
        buf.move_up(); // from end of "another" (col 7) to "hi"
        assert_eq!(buf.cursor_line_col(), (1, 2));
        buf.move_up();
        assert_eq!(buf.cursor_line_col(), (0, 2));
        buf.move_down();
        buf.move_down();
        assert_eq!(buf.cursor_line_col(), (2, 2));
        // Bottom line: move_down stays put.
        buf.move_down();
        assert_eq!(buf.cursor_line_col(), (2, 2));
    }

    #[test]
    fn horizontal_movement_respects_boundaries() {
        let mut buf = CodeBuffer::new();
        buf.set_text("é".to_string());
        buf.move_left();
        assert_eq!(buf.cursor_line_col(), (0, 0));
        buf.move_left();
        assert_eq!(buf.cursor_line_col(), (0, 0));
        buf.move_right();
        assert_eq!(buf.cursor_line_col(), (0, 1));
        buf.insert_char('x');
        assert_eq!(buf.text(), "éx");
    }

    #[test]
    fn set_text_places_cursor_at_end() {
        let mut buf = CodeBuffer::new();
        buf.set_text("restored draft".to_string());
        buf.insert_char('!');
        assert_eq!(buf.text(), "restored draft!");
    }

    #[test]
    fn is_empty_ignores_whitespace() {
        let mut buf = CodeBuffer::new();
        assert!(buf.is_empty());
        buf.insert_str("  \n\t ");
        assert!(buf.is_empty());
        buf.insert_char('x');
        assert!(!buf.is_empty());
    }
}
