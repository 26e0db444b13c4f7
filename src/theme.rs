//! Terminal colours.
//!
//! Nothing in the search depends on this module; it only decorates text.

use clap::ValueEnum;
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use serde::{Deserialize, Serialize};

/// When to emit ANSI colour codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// `Auto` colours only a terminal, and never when `NO_COLOR` is set.
    pub fn resolve<S: IsTty>(self, stream: &S) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var_os("NO_COLOR").map_or(true, |v| v.is_empty()) && stream.is_tty()
            }
        }
    }
}

pub const STEP_SEPARATOR: &str = "─────────────────────────────────────────────────────────────";
pub const RESULT_SEPARATOR: &str = "═════════════════════════════════════════════════════════════";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn bold(&self, text: &str) -> String {
        self.apply(text, |t| t.bold().to_string())
    }

    pub fn good(&self, text: &str) -> String {
        self.apply(text, |t| t.green().to_string())
    }

    pub fn bad(&self, text: &str) -> String {
        self.apply(text, |t| t.red().to_string())
    }

    pub fn heading(&self, text: &str) -> String {
        self.apply(text, |t| t.blue().bold().to_string())
    }

    pub fn success(&self, text: &str) -> String {
        self.apply(text, |t| t.green().bold().to_string())
    }

    pub fn candidate(&self, text: &str) -> String {
        self.apply(text, |t| t.cyan().bold().to_string())
    }

    pub fn culprit(&self, text: &str) -> String {
        self.apply(text, |t| t.red().bold().to_string())
    }

    pub fn faded(&self, text: &str) -> String {
        self.apply(text, |t| t.dim().to_string())
    }

    fn apply(&self, text: &str, style: impl Fn(&str) -> String) -> String {
        if self.enabled {
            style(text)
        } else {
            text.to_string()
        }
    }
}
