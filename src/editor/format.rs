use super::EditorBuffer;

/// Markdown formatting shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Bold,
    Italic,
    /// Heading prefix, level 1-3.
    Heading(u8),
    Bullet,
    Numbered,
}

impl Format {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Heading(1) => "heading 1",
            Self::Heading(2) => "heading 2",
            Self::Heading(_) => "heading 3",
            Self::Bullet => "bullet list",
            Self::Numbered => "numbered list",
        }
    }

    /// Apply to the buffer at the cursor.
    ///
    /// Inline styles wrap the cursor; block styles prefix the cursor line.
    pub fn apply(self, buffer: &mut EditorBuffer) {
        match self {
            Self::Bold => buffer.insert_wrapped("**", "**"),
            Self::Italic => buffer.insert_wrapped("*", "*"),
            Self::Heading(level) => {
                let level = usize::from(level.clamp(1, 3));
                buffer.prefix_line(&format!("{} ", "#".repeat(level)));
            }
            Self::Bullet => buffer.prefix_line("- "),
            Self::Numbered => buffer.prefix_line("1. "),
        }
    }
}
