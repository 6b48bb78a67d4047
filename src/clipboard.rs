/*!
 * System clipboard sink for finished snapshots
 *
 * Pipes text into the first working clipboard command for the platform
 * (tmux, wl-copy, xsel, xclip, pbcopy, clip.exe, termux-clipboard-set).
 */

use std::env;
use std::io::{self, Write};
use std::process::{Command, Stdio};

use thiserror::Error;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Failed to execute the command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Known clipboard commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardProvider {
    Tmux,
    Wayland,
    Xsel,
    Xclip,
    MacOS,
    Wsl,
    Termux,
}

impl ClipboardProvider {
    /// Program and arguments that read the text from stdin
    fn command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Tmux => ("tmux", &["load-buffer", "-w", "-"] as &[&str]),
            Self::Wayland => ("wl-copy", &[] as &[&str]),
            Self::Xsel => ("xsel", &["-b", "-i"] as &[&str]),
            Self::Xclip => ("xclip", &["-selection", "clipboard", "-in"] as &[&str]),
            Self::MacOS => ("pbcopy", &[] as &[&str]),
            Self::Wsl => ("clip.exe", &[] as &[&str]),
            Self::Termux => ("termux-clipboard-set", &[] as &[&str]),
        }
    }

    /// Program name
    pub fn program(self) -> &'static str {
        self.command().0
    }

    /// Pipe `text` into the provider's command
    pub fn copy(self, text: &str) -> Result<()> {
        let (cmd, args) = self.command();
        let mut child = Command::new(cmd)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ClipboardError::CommandFailed(format!("Failed to spawn {}: {}", cmd, e)))?;

        child
            .stdin
            .take()
            .ok_or_else(|| ClipboardError::CommandFailed(format!("Failed to open stdin for {}", cmd)))?
            .write_all(text.as_bytes())?;

        let status = child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::CommandFailed(format!("{} exited with status: {}", cmd, status)))
        }
    }
}

/// Providers to try on this machine, most preferred first
pub fn available_providers() -> Vec<ClipboardProvider> {
    let mut candidates = Vec::new();

    if env::var_os("TMUX").is_some() {
        candidates.push(ClipboardProvider::Tmux);
    }

    if cfg!(target_os = "macos") {
        candidates.push(ClipboardProvider::MacOS);
    } else if cfg!(target_os = "windows") || env::var_os("WSL_DISTRO_NAME").is_some() {
        candidates.push(ClipboardProvider::Wsl);
    } else if cfg!(target_os = "android") {
        candidates.push(ClipboardProvider::Termux);
    } else {
        if env::var_os("WAYLAND_DISPLAY").is_some() {
            candidates.push(ClipboardProvider::Wayland);
        }
        candidates.extend([ClipboardProvider::Xsel, ClipboardProvider::Xclip]);
    }

    candidates
        .into_iter()
        .filter(|provider| command_exists(provider.program()))
        .collect()
}

/// Copy text with the first provider that succeeds
pub fn copy_to_clipboard(text: &str) -> Result<ClipboardProvider> {
    for provider in available_providers() {
        match provider.copy(text) {
            Ok(()) => {
                log::debug!("Copied {} bytes with {}", text.len(), provider.program());
                return Ok(provider);
            }
            Err(e) => log::debug!("Clipboard provider {} failed: {}", provider.program(), e),
        }
    }

    Err(ClipboardError::NoClipboardFound)
}

/// Whether `command` is an executable file on `PATH`
pub fn command_exists(command: &str) -> bool {
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(command).is_file()))
        .unwrap_or(false)
}
