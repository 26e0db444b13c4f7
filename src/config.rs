//! Configuration management for linebisect
//!
//! Reads optional settings from ~/.config/linebisect/config.json.
//! Command-line flags take precedence over anything stored here.

use crate::process::{ExecOptions, DEFAULT_SHELL};
use crate::theme::ColorChoice;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SHELL_ENV: &str = "LINEBISECT_SHELL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interpreter used for commands that need shell syntax
    pub shell: Option<String>,
    pub color: ColorChoice,
    /// Lines shown above and below a candidate during interactive judging
    pub context_lines: usize,
    /// Let judged commands print to the terminal
    pub show_command_output: bool,
    /// Run every command through the shell, even plain ones
    pub force_shell: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell: None,
            color: ColorChoice::Auto,
            context_lines: 1,
            show_command_output: false,
            force_shell: false,
        }
    }
}

impl Config {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("linebisect"))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from disk, or return default
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load config from a specific file. Missing files yield defaults; a
    /// corrupt file is moved aside and defaults are used.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                preserve_corrupt_config(path, &content);
                eprintln!(
                    "  Warning: Config file was corrupted ({}). A backup was saved and defaults were loaded.",
                    err
                );
                Self::default()
            }
        }
    }

    /// Shell to use, honouring `LINEBISECT_SHELL` over the stored value.
    pub fn shell(&self) -> String {
        std::env::var(SHELL_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.shell.clone())
            .unwrap_or_else(|| DEFAULT_SHELL.to_string())
    }

    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            shell: self.shell(),
            force_shell: self.force_shell,
            show_output: self.show_command_output,
        }
    }
}

fn preserve_corrupt_config(path: &Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}
