use ropey::Rope;

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl Cursor {
    pub const fn new() -> Self {
        Self::at(0, 0)
    }

    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Rope-backed text store for the markdown being edited.
///
/// Every mutation marks the buffer dirty and bumps its revision so callers
/// can tell "something changed" apart from "cursor moved".
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
    dirty: bool,
    revision: u64,
}

impl EditorBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
            dirty: false,
            revision: 0,
        }
    }

    pub fn empty() -> Self {
        Self::from_text("")
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Whether the buffer has been modified since creation or last save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Number of content mutations applied so far.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content of a line without its trailing newline.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches(['\n', '\r']).to_string())
    }

    /// Length of a line in bytes, without its trailing newline.
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Replace the whole content, leaving the cursor at the start.
    pub fn replace_all(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.cursor = Cursor::new();
        self.touch();
    }

    pub fn insert_char(&mut self, ch: char) {
        let char_idx = self.cursor_char_idx();
        self.rope.insert_char(char_idx, ch);
        if ch == '\n' {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        } else {
            self.cursor.set_col(self.cursor.col + ch.len_utf8());
        }
        self.touch();
    }

    /// Insert text at the cursor and move the cursor past it.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let char_idx = self.cursor_char_idx();
        self.rope.insert(char_idx, s);
        match s.rsplit_once('\n') {
            Some((_, tail)) => {
                self.cursor.line += s.matches('\n').count();
                self.cursor.set_col(tail.len());
            }
            None => self.cursor.set_col(self.cursor.col + s.len()),
        }
        self.touch();
    }

    /// Surround the cursor with `prefix` and `suffix`, leaving the cursor
    /// between them (e.g. `**|**` for bold).
    pub fn insert_wrapped(&mut self, prefix: &str, suffix: &str) {
        self.insert_str(prefix);
        if suffix.is_empty() {
            return;
        }
        let char_idx = self.cursor_char_idx();
        self.rope.insert(char_idx, suffix);
        self.touch();
    }

    /// Insert `prefix` at the start of the cursor line, keeping the cursor
    /// on the same character.
    pub fn prefix_line(&mut self, prefix: &str) {
        if prefix.is_empty() {
            return;
        }
        let line_start = self.rope.line_to_char(self.cursor.line);
        self.rope.insert(line_start, prefix);
        self.cursor.set_col(self.cursor.col + prefix.len());
        self.touch();
    }

    /// Split the current line at the cursor (Enter key).
    pub fn split_line(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the character before the cursor (Backspace).
    ///
    /// Returns `true` if a character was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.cursor.col == 0 && self.cursor.line == 0 {
            return false;
        }
        let char_idx = self.cursor_char_idx();
        if self.cursor.col == 0 {
            let prev_len = self.line_len(self.cursor.line - 1);
            // Removes the previous line's break, which may be "\r\n".
            let prev_line_chars = self.rope.line(self.cursor.line - 1).len_chars();
            let prev_start = self.rope.line_to_char(self.cursor.line - 1);
            let content_chars = self
                .line_at(self.cursor.line - 1)
                .map_or(0, |l| l.chars().count());
            self.rope
                .remove(prev_start + content_chars..prev_start + prev_line_chars);
            self.cursor.line -= 1;
            self.cursor.set_col(prev_len);
        } else {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let prev_char_len = line[..self.cursor.col]
                .chars()
                .next_back()
                .map_or(1, char::len_utf8);
            self.rope.remove(char_idx - 1..char_idx);
            self.cursor.set_col(self.cursor.col - prev_char_len);
        }
        self.touch();
        true
    }

    /// Delete the character at the cursor (Delete key).
    ///
    /// Returns `true` if a character was deleted.
    pub fn delete_forward(&mut self) -> bool {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col >= line_len && self.cursor.line + 1 >= self.line_count() {
            return false;
        }
        if self.cursor.col >= line_len {
            // Join with the next line by dropping this line's break.
            let start = self.cursor_char_idx();
            let end = self.rope.line_to_char(self.cursor.line + 1);
            self.rope.remove(start..end);
        } else {
            let char_idx = self.cursor_char_idx();
            self.rope.remove(char_idx..=char_idx);
        }
        self.touch();
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_vertical(-1),
            Direction::Down => self.move_vertical(1),
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor.set_col(0);
    }

    pub fn move_end(&mut self) {
        self.cursor.set_col(self.line_len(self.cursor.line));
    }

    /// Move cursor one word to the left (Ctrl+Left).
    pub fn move_word_left(&mut self) {
        if self.cursor.col == 0 {
            if self.cursor.line > 0 {
                self.cursor.line -= 1;
                self.move_end();
            }
            return;
        }
        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let trimmed = line[..self.cursor.col].trim_end();
        let pos = trimmed
            .rfind(|c: char| !c.is_alphanumeric() && c != '_')
            .map_or(0, |i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8));
        self.cursor.set_col(pos);
    }

    /// Move cursor one word to the right (Ctrl+Right).
    pub fn move_word_right(&mut self) {
        let line = self.line_at(self.cursor.line).unwrap_or_default();
        if self.cursor.col >= line.len() {
            if self.cursor.line + 1 < self.line_count() {
                self.cursor.line += 1;
                self.cursor.set_col(0);
            }
            return;
        }
        let after = &line[self.cursor.col..];
        let word_end = after
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(after.len());
        let rest = &after[word_end..];
        let gap = rest
            .find(|c: char| c.is_alphanumeric() || c == '_')
            .unwrap_or(rest.len());
        self.cursor.set_col(self.cursor.col + word_end + gap);
    }

    /// Move cursor to a line and column, clamped to the buffer.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.cursor.line = line.min(self.line_count().saturating_sub(1));
        let text = self.line_at(self.cursor.line).unwrap_or_default();
        let mut col = col.min(text.len());
        while !text.is_char_boundary(col) {
            col -= 1;
        }
        self.cursor.set_col(col);
    }

    pub const fn move_to_start(&mut self) {
        self.cursor.line = 0;
        self.cursor.set_col(0);
    }

    pub fn move_to_end(&mut self) {
        self.cursor.line = self.line_count().saturating_sub(1);
        self.move_end();
    }

    const fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    /// Convert the cursor's byte column into a rope char index.
    fn cursor_char_idx(&self) -> usize {
        let line_start = self.rope.line_to_char(self.cursor.line);
        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let byte_col = self.cursor.col.min(line.len());
        line_start + line[..byte_col].chars().count()
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let prev_char_len = line[..self.cursor.col]
                .chars()
                .next_back()
                .map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col - prev_char_len);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.move_end();
        }
    }

    fn move_right(&mut self) {
        let line = self.line_at(self.cursor.line).unwrap_or_default();
        if let Some(ch) = line[self.cursor.col.min(line.len())..].chars().next() {
            self.cursor.set_col(self.cursor.col + ch.len_utf8());
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn move_vertical(&mut self, delta: isize) {
        let Some(target) = self.cursor.line.checked_add_signed(delta) else {
            return;
        };
        if target >= self.line_count() {
            return;
        }
        self.cursor.line = target;
        let text = self.line_at(target).unwrap_or_default();
        let mut col = self.cursor.col_memory.min(text.len());
        while !text.is_char_boundary(col) {
            col -= 1;
        }
        self.cursor.col = col;
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("dirty", &self.dirty)
            .field("revision", &self.revision)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = EditorBuffer::empty();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_at(0), Some(String::new()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_from_text_preserves_content_verbatim() {
        let text = "# Title\r\n- a\n\n- b\n";
        let buf = EditorBuffer::from_text(text);
        assert_eq!(buf.text(), text);
        assert_eq!(buf.line_at(0), Some("# Title".to_string()));
        assert!(!buf.is_dirty());
    }

    #[test]
    fn test_insert_marks_dirty_and_bumps_revision() {
        let mut buf = EditorBuffer::from_text("x");
        buf.insert_char('a');
        assert!(buf.is_dirty());
        assert_eq!(buf.revision(), 1);
        buf.mark_clean();
        assert!(!buf.is_dirty());
        assert_eq!(buf.revision(), 1);
    }

    #[test]
    fn test_cursor_moves_do_not_dirty() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        buf.move_cursor(Direction::Down);
        buf.move_end();
        buf.move_word_left();
        assert!(!buf.is_dirty());
        assert_eq!(buf.revision(), 0);
    }

    #[test]
    fn test_insert_multibyte_char() {
        let mut buf = EditorBuffer::from_text("ab");
        buf.move_to(0, 1);
        buf.insert_char('é');
        assert_eq!(buf.text(), "aéb");
        assert_eq!(buf.cursor().col, 3);
    }

    #[test]
    fn test_insert_str_multiline_moves_cursor() {
        let mut buf = EditorBuffer::empty();
        buf.insert_str("# T\n- a");
        assert_eq!(buf.cursor(), Cursor::at(1, 3));
    }

    #[test]
    fn test_insert_wrapped_places_cursor_inside() {
        let mut buf = EditorBuffer::from_text("say ");
        buf.move_end();
        buf.insert_wrapped("**", "**");
        assert_eq!(buf.text(), "say ****");
        assert_eq!(buf.cursor().col, 6);
        buf.insert_str("hi");
        assert_eq!(buf.text(), "say **hi**");
    }

    #[test]
    fn test_prefix_line_inserts_at_line_start() {
        let mut buf = EditorBuffer::from_text("one\ntwo");
        buf.move_to(1, 2);
        buf.prefix_line("## ");
        assert_eq!(buf.text(), "one\n## two");
        assert_eq!(buf.cursor(), Cursor::at(1, 5));
    }

    #[test]
    fn test_split_line_in_middle() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.move_to(0, 2);
        buf.split_line();
        assert_eq!(buf.text(), "he\nllo");
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_delete_back_at_start_is_noop() {
        let mut buf = EditorBuffer::from_text("a");
        assert!(!buf.delete_back());
        assert!(!buf.is_dirty());
    }

    #[test]
    fn test_delete_back_joins_lines() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        buf.move_to(1, 0);
        assert!(buf.delete_back());
        assert_eq!(buf.text(), "abcd");
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_delete_back_joins_crlf_lines() {
        let mut buf = EditorBuffer::from_text("ab\r\ncd");
        buf.move_to(1, 0);
        assert!(buf.delete_back());
        assert_eq!(buf.text(), "abcd");
    }

    #[test]
    fn test_delete_back_multibyte() {
        let mut buf = EditorBuffer::from_text("aé");
        buf.move_end();
        buf.delete_back();
        assert_eq!(buf.text(), "a");
        assert_eq!(buf.cursor().col, 1);
    }

    #[test]
    fn test_delete_forward_joins_lines() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        buf.move_end();
        assert!(buf.delete_forward());
        assert_eq!(buf.text(), "abcd");
    }

    #[test]
    fn test_delete_forward_at_end_is_noop() {
        let mut buf = EditorBuffer::from_text("ab");
        buf.move_end();
        assert!(!buf.delete_forward());
    }

    #[test]
    fn test_horizontal_moves_wrap_lines() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        buf.move_to(1, 0);
        buf.move_cursor(Direction::Left);
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
        buf.move_cursor(Direction::Right);
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_column_memory_across_short_line() {
        let mut buf = EditorBuffer::from_text("hello\nhi\nworld");
        buf.move_to(0, 4);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 2);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 4);
    }

    #[test]
    fn test_vertical_move_respects_char_boundaries() {
        let mut buf = EditorBuffer::from_text("abc\né");
        buf.move_to(0, 1);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 0);
    }

    #[test]
    fn test_word_motion() {
        let mut buf = EditorBuffer::from_text("## Use cases");
        buf.move_word_right();
        assert_eq!(buf.cursor().col, 3);
        buf.move_word_right();
        assert_eq!(buf.cursor().col, 7);
        buf.move_end();
        buf.move_word_left();
        assert_eq!(buf.cursor().col, 7);
    }

    #[test]
    fn test_move_to_clamps() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        buf.move_to(10, 10);
        assert_eq!(buf.cursor(), Cursor::at(1, 2));
    }

    #[test]
    fn test_replace_all_resets_cursor_and_dirties() {
        let mut buf = EditorBuffer::from_text("old");
        buf.move_end();
        buf.replace_all("# New Mind Map");
        assert_eq!(buf.text(), "# New Mind Map");
        assert_eq!(buf.cursor(), Cursor::new());
        assert!(buf.is_dirty());
    }
}
