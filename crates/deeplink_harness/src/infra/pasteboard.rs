//! Transfer channel handing fixture content to the remote application.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};

use crate::domain::model::ContentSource;

/// Fixed type identifier under which fixture payloads are registered.
pub const HTML_TYPE_IDENTIFIER: &str = "public.html";

/// Payload of a transfer item: inline markup or a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferPayload {
    Inline(String),
    FileBacked(PathBuf),
}

impl From<&ContentSource> for TransferPayload {
    fn from(source: &ContentSource) -> Self {
        match source {
            ContentSource::InlineHtml(html) => Self::Inline(html.clone()),
            ContentSource::FileUrl(path) => Self::FileBacked(path.clone()),
        }
    }
}

/// Single item staged on the transfer channel: a payload under a fixed type
/// identifier with a suggested display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferItem {
    pub payload: TransferPayload,
    pub type_id: String,
    pub suggested_name: String,
}

impl TransferItem {
    pub fn html(payload: TransferPayload, suggested_name: impl Into<String>) -> Self {
        Self {
            payload,
            type_id: HTML_TYPE_IDENTIFIER.to_owned(),
            suggested_name: suggested_name.into(),
        }
    }

    /// Resolve the payload to its HTML text. File-backed payloads are read
    /// at staging time.
    pub fn materialize(&self) -> Result<String> {
        match &self.payload {
            TransferPayload::Inline(html) => Ok(html.clone()),
            TransferPayload::FileBacked(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read fixture file at {}", path.display())),
        }
    }
}

/// System-wide, clipboard-like channel the remote application pastes from.
/// Staging replaces whatever was previously on the channel (single item,
/// local only, no expiration).
pub trait TransferChannel {
    fn stage(&mut self, item: &TransferItem) -> Result<()>;
}

/// Host pasteboard with fallbacks for headless environments.
pub struct SystemPasteboard {
    primary: Option<arboard::Clipboard>,
}

impl SystemPasteboard {
    /// Attempt to attach to the system clipboard. When unavailable we fall
    /// back to shell-based clipboard utilities.
    pub fn new() -> Self {
        let primary = arboard::Clipboard::new().ok();
        Self { primary }
    }
}

impl Default for SystemPasteboard {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferChannel for SystemPasteboard {
    fn stage(&mut self, item: &TransferItem) -> Result<()> {
        let html = item.materialize()?;
        tracing::debug!(name = %item.suggested_name, type_id = %item.type_id, "staging transfer item");

        if let Some(primary) = self.primary.as_mut()
            && primary.set_html(html.clone(), Option::<String>::None).is_ok()
        {
            return Ok(());
        }

        self.primary = None;
        fallback_stage(&html)
    }
}

fn fallback_stage(html: &str) -> Result<()> {
    for command in fallback_commands() {
        if try_command_stage(command, html).is_ok() {
            return Ok(());
        }
    }

    Err(anyhow!(
        "failed to stage html on the transfer channel using available backends"
    ))
}

fn try_command_stage(command: &[&str], html: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("transfer command missing program")?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn transfer command: {program}"))?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin
            .write_all(html.as_bytes())
            .context("failed to write transfer payload")?;
    }

    let status = child
        .wait()
        .with_context(|| format!("transfer command did not exit cleanly: {program}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("transfer command exited with status {status}"))
    }
}

#[cfg(target_os = "macos")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["pbcopy"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![
        &["wl-copy", "--type", "text/html"],
        &["xclip", "-selection", "clipboard", "-t", "text/html"],
    ]
}

#[cfg(target_os = "windows")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["powershell.exe", "-NoProfile", "-Command", "Set-Clipboard"]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    Vec::new()
}
