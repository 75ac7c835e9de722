//! The markdown document being edited.
//!
//! A [`Document`] pairs the editor buffer (the single source of truth for
//! the text) with a display name and, once the text has touched the disk,
//! the path it came from. The display name is independent of the content.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::editor::EditorBuffer;

/// Name given to documents that have never been saved or renamed.
pub const UNTITLED_NAME: &str = "untitled.md";

/// Text of a freshly created document.
pub const NEW_DOCUMENT_TEXT: &str = "# New Mind Map";

/// Shown when the program starts without a file.
pub const WELCOME_TEXT: &str = "# Markdown Mind Map

## Features
- Real-time visualization
- Split-screen interface
- Markdown editing

## Benefits
- Easy to use
- Visual organization
- Quick note-taking

## Use Cases
- Project planning
- Knowledge management
- Brainstorming sessions";

/// Why a display name was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("file name cannot be empty")]
    Empty,
    #[error("file name cannot contain path separators")]
    Separator,
    #[error("'{0}' is not a file name")]
    Reserved(String),
}

/// Validate a proposed display name, returning it trimmed.
///
/// # Errors
/// Returns a [`NameError`] for empty names, names with path separators, and
/// `.`/`..`.
pub fn validate_name(name: &str) -> Result<String, NameError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.contains(['/', '\\']) {
        return Err(NameError::Separator);
    }
    if matches!(name, "." | "..") {
        return Err(NameError::Reserved(name.to_string()));
    }
    Ok(name.to_string())
}

pub struct Document {
    buffer: EditorBuffer,
    name: String,
    /// Directory saves go to; the working directory until a file is opened.
    dir: PathBuf,
    /// Set once the text has been read from or written to disk.
    path: Option<PathBuf>,
}

impl Document {
    /// A path-less document with the given text.
    pub fn from_text(text: &str, name: impl Into<String>) -> Self {
        Self {
            buffer: EditorBuffer::from_text(text),
            name: name.into(),
            dir: PathBuf::from("."),
            path: None,
        }
    }

    /// The welcome outline shown when no file was given.
    pub fn welcome() -> Self {
        Self::from_text(WELCOME_TEXT, UNTITLED_NAME)
    }

    pub fn new_untitled() -> Self {
        Self::from_text(NEW_DOCUMENT_TEXT, UNTITLED_NAME)
    }

    /// An empty document that will be saved as `path` (which need not exist).
    pub fn empty_at(path: &Path) -> Self {
        let mut doc = Self::from_text("", UNTITLED_NAME);
        if let Some(name) = path.file_name() {
            doc.name = name.to_string_lossy().to_string();
        }
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            doc.dir = dir.to_path_buf();
        }
        doc
    }

    /// Load a file; invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        let name = path
            .file_name()
            .map_or_else(|| UNTITLED_NAME.to_string(), |n| n.to_string_lossy().to_string());
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(Self {
            buffer: EditorBuffer::from_text(&text),
            name,
            dir,
            path: Some(path.to_path_buf()),
        })
    }

    /// Replace the text with what is on disk now, keeping the name.
    ///
    /// # Errors
    /// Returns an error if the document has no backing file or it cannot be
    /// read.
    pub fn reload(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .context("Document has no file to reload from")?;
        let bytes = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        self.buffer = EditorBuffer::from_text(&String::from_utf8_lossy(&bytes));
        Ok(())
    }

    /// Write the text verbatim to [`Self::save_path`] and mark it clean.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written; the document is left
    /// untouched in that case.
    pub fn save(&mut self) -> Result<PathBuf> {
        let target = self.save_path();
        fs::write(&target, self.buffer.text())
            .with_context(|| format!("Failed to write {}", target.display()))?;
        self.buffer.mark_clean();
        self.path = Some(target.clone());
        Ok(target)
    }

    /// Where [`Self::save`] will write.
    pub fn save_path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    /// Change the display name. The text is not touched.
    ///
    /// # Errors
    /// Returns a [`NameError`] if the name is not a usable file name.
    pub fn rename(&mut self, name: &str) -> Result<(), NameError> {
        self.name = validate_name(name)?;
        Ok(())
    }

    /// Start over with new text and name, dropping the backing file.
    pub fn reset(&mut self, text: &str, name: &str) {
        self.buffer = EditorBuffer::from_text(text);
        self.name = name.to_string();
        self.path = None;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub const fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    pub const fn buffer_mut(&mut self) -> &mut EditorBuffer {
        &mut self.buffer
    }

    pub const fn is_dirty(&self) -> bool {
        self.buffer.is_dirty()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::welcome()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("dirty", &self.is_dirty())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_welcome_document_outline_shape() {
        let doc = Document::welcome();
        let tree = crate::outline::parse(&doc.text());
        assert_eq!(tree.label, "Markdown Mind Map");
        assert_eq!(tree.child_labels(), vec!["Features", "Benefits", "Use Cases"]);
        assert_eq!(doc.name(), UNTITLED_NAME);
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_open_uses_file_name_and_lossy_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.md");
        fs::write(&path, b"# Plan \xff\n- step").unwrap();
        let doc = Document::open(&path).unwrap();
        assert_eq!(doc.name(), "plan.md");
        assert_eq!(doc.text(), "# Plan \u{fffd}\n- step");
        assert_eq!(doc.path(), Some(path.as_path()));
    }

    #[test]
    fn test_empty_at_saves_to_the_given_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh.md");
        let mut doc = Document::empty_at(&path);
        assert_eq!(doc.name(), "fresh.md");
        assert_eq!(doc.text(), "");
        assert_eq!(doc.path(), None);
        doc.buffer_mut().insert_str("# Fresh");
        assert_eq!(doc.save().unwrap(), path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Fresh");
    }

    #[test]
    fn test_open_missing_file_errors() {
        let dir = tempdir().unwrap();
        assert!(Document::open(&dir.path().join("absent.md")).is_err());
    }

    #[test]
    fn test_save_writes_text_verbatim_to_display_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.md");
        let text = "# Notes\r\n\n- a  \n";
        fs::write(&path, text).unwrap();
        let mut doc = Document::open(&path).unwrap();
        doc.rename("renamed.md").unwrap();
        doc.buffer_mut().move_to_end();
        doc.buffer_mut().insert_str("- b");
        assert!(doc.is_dirty());

        let written = doc.save().unwrap();
        assert_eq!(written, dir.path().join("renamed.md"));
        assert_eq!(fs::read_to_string(&written).unwrap(), format!("{text}- b"));
        assert!(!doc.is_dirty());
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn test_failed_save_keeps_document_dirty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone").join("x.md");
        let mut doc = Document::from_text("# X", "x.md");
        doc.dir = path.parent().unwrap().to_path_buf();
        doc.buffer_mut().insert_char('!');
        assert!(doc.save().is_err());
        assert!(doc.is_dirty());
        assert_eq!(doc.path(), None);
    }

    #[test]
    fn test_rename_validation() {
        let mut doc = Document::new_untitled();
        assert_eq!(doc.rename("   "), Err(NameError::Empty));
        assert_eq!(doc.rename("a/b.md"), Err(NameError::Separator));
        assert_eq!(doc.rename(".."), Err(NameError::Reserved("..".to_string())));
        assert_eq!(doc.name(), UNTITLED_NAME);
        doc.rename("  ideas.md ").unwrap();
        assert_eq!(doc.name(), "ideas.md");
        assert_eq!(doc.text(), NEW_DOCUMENT_TEXT);
    }

    #[test]
    fn test_reload_reads_disk_and_requires_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("w.md");
        fs::write(&path, "# One").unwrap();
        let mut doc = Document::open(&path).unwrap();
        fs::write(&path, "# Two").unwrap();
        doc.reload().unwrap();
        assert_eq!(doc.text(), "# Two");

        let mut unsaved = Document::new_untitled();
        assert!(unsaved.reload().is_err());
    }

    #[test]
    fn test_reset_drops_backing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("w.md");
        fs::write(&path, "# One").unwrap();
        let mut doc = Document::open(&path).unwrap();
        doc.reset(NEW_DOCUMENT_TEXT, UNTITLED_NAME);
        assert_eq!(doc.path(), None);
        assert_eq!(doc.name(), UNTITLED_NAME);
        assert_eq!(doc.save_path(), dir.path().join(UNTITLED_NAME));
    }
}
