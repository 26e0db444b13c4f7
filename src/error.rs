//! Error types for a bisection run.

use std::fmt;
use std::io;
use thiserror::Error;

/// Which end of the search range a pattern was meant to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Good,
    Bad,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Good => f.write_str("good"),
            Boundary::Bad => f.write_str("bad"),
        }
    }
}

/// Every failure that aborts a run. None of these leave a partial result behind.
#[derive(Error, Debug)]
pub enum BisectError {
    #[error("no input lines provided")]
    EmptyInput,

    #[error("{boundary} pattern {pattern:?} not found in input")]
    PatternNotFound { boundary: Boundary, pattern: String },

    /// Indices are 0-based; the message shows them as line numbers.
    #[error("good line ({}) must come before bad line ({})", .good + 1, .bad + 1)]
    InvalidBoundaries { good: usize, bad: usize },

    #[error("failed to read response: {0}")]
    ResponseRead(#[source] io::Error),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to start command `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{shell}` does not understand POSIX quoting; configure a POSIX sh as the shell")]
    UnsupportedShell { shell: String },
}

impl BisectError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        BisectError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T, E = BisectError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_boundaries_message_is_one_indexed() {
        let err = BisectError::InvalidBoundaries { good: 4, bad: 2 };
        assert_eq!(
            err.to_string(),
            "good line (5) must come before bad line (3)"
        );
    }

    #[test]
    fn test_pattern_not_found_names_boundary() {
        let err = BisectError::PatternNotFound {
            boundary: Boundary::Bad,
            pattern: "ERROR".to_string(),
        };
        assert_eq!(err.to_string(), "bad pattern \"ERROR\" not found in input");
    }

    #[test]
    fn test_unsupported_shell_names_the_shell() {
        let err = BisectError::UnsupportedShell {
            shell: "cmd".to_string(),
        };
        assert!(err.to_string().starts_with("`cmd` does not understand POSIX quoting"));
    }
}
