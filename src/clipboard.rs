//! Clipboard access for the copy action.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::io::{self, Write};

pub trait Clipboard: Send {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// Copies through the terminal with an OSC 52 escape sequence, so it also
/// works over SSH as long as the terminal emulator allows it.
#[derive(Debug)]
pub struct Osc52Clipboard<W: Write + Send = io::Stdout> {
    out: W,
}

impl Osc52Clipboard<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", BASE64.encode(text.as_bytes()))
}

impl<W: Write + Send> Clipboard for Osc52Clipboard<W> {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(osc52_sequence(text).as_bytes())
            .context("Failed to write clipboard sequence")?;
        self.out.flush().context("Failed to flush clipboard sequence")?;
        tracing::debug!(chars = text.chars().count(), "copied text via OSC 52");
        Ok(())
    }
}
