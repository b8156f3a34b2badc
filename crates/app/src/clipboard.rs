//! Clipboard sinks.
//!
//! A terminal has no portable clipboard, so the binary writes copied text to
//! a file in the data directory; tests use [`MemoryClipboard`].

use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard write failed: {0}")]
    Io(#[from] std::io::Error),
}

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Keeps the last copied text in memory.
#[derive(Default)]
pub struct MemoryClipboard {
    last: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.last.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(text.to_string());
        Ok(())
    }
}

/// Overwrites a single file with each copied text.
pub struct FileClipboard {
    path: PathBuf,
}

impl FileClipboard {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Clipboard for FileClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, text)?;
        tracing::debug!(path = %self.path.display(), bytes = text.len(), "Copied to clipboard file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_clipboard_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let clipboard = FileClipboard::new(dir.path().join("clip").join("clipboard.txt"));

        clipboard.write_text("first").unwrap();
        clipboard.write_text("second").unwrap();

        assert_eq!(std::fs::read_to_string(clipboard.path()).unwrap(), "second");
    }

    #[test]
    fn memory_clipboard_keeps_last() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.contents(), None);
        clipboard.write_text("x").unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("x"));
    }
}
