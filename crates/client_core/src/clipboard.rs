use anyhow::{anyhow, Context, Result};
use arboard::Clipboard;

pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard, opened on first use so headless hosts only fail when a copy is attempted.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => Clipboard::new().context("failed to open system clipboard")?,
        };
        self.inner
            .insert(clipboard)
            .set_text(text.to_owned())
            .context("failed to write to system clipboard")
    }
}

#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
    unavailable: bool,
}

impl MemoryClipboard {
    /// A clipboard that refuses every write, like a browser without clipboard permission.
    pub fn unavailable() -> Self {
        Self {
            contents: None,
            unavailable: true,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.unavailable {
            return Err(anyhow!("clipboard access denied"));
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

impl<C: ClipboardSink + ?Sized> ClipboardSink for &mut C {
    fn write_text(&mut self, text: &str) -> Result<()> {
        (**self).write_text(text)
    }
}
