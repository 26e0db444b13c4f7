//! Running judged commands and hooks.

use crate::error::{BisectError, Result};
use crate::template::Invocation;
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

/// Shell-mode commands need a POSIX shell: `{line}` is single-quoted for one.
pub const DEFAULT_SHELL: &str = "sh";

/// How subordinate commands are launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    /// Interpreter for shell invocations.
    pub shell: String,
    /// Run every template through the shell, even plain ones.
    pub force_shell: bool,
    /// Let commands write to our stdout/stderr instead of discarding output.
    pub show_output: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
            force_shell: false,
            show_output: false,
        }
    }
}

impl ExecOptions {
    fn command_for(&self, invocation: &Invocation) -> Command {
        match invocation {
            Invocation::Direct(argv) => {
                let mut command = Command::new(&argv[0]);
                command.args(&argv[1..]);
                command
            }
            Invocation::Shell(script) => {
                let mut command = Command::new(&self.shell);
                command.arg("-c").arg(script);
                command
            }
        }
    }

    /// Run `invocation` to completion and return its exit status.
    ///
    /// Only a failure to start the process is an error; the caller decides
    /// what a nonzero status means.
    pub fn run(&self, invocation: &Invocation) -> Result<ExitStatus> {
        if let Invocation::Direct(argv) = invocation {
            if argv.is_empty() {
                return Err(BisectError::CommandSpawn {
                    command: String::new(),
                    source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
                });
            }
        }
        if let Invocation::Shell(_) = invocation {
            if !is_posix_shell(&self.shell) {
                return Err(BisectError::UnsupportedShell {
                    shell: self.shell.clone(),
                });
            }
        }

        let mut command = self.command_for(invocation);
        command.stdin(Stdio::null());
        if !self.show_output {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        debug!(command = %describe(invocation), "spawning");
        command.status().map_err(|source| BisectError::CommandSpawn {
            command: describe(invocation),
            source,
        })
    }
}

/// `cmd.exe` and PowerShell do not honour POSIX single quotes.
fn is_posix_shell(shell: &str) -> bool {
    let name = std::path::Path::new(shell)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(shell);
    !["cmd", "powershell", "pwsh"]
        .iter()
        .any(|other| name.eq_ignore_ascii_case(other))
}

/// Human-readable form of an invocation for logs and errors.
pub fn describe(invocation: &Invocation) -> String {
    match invocation {
        Invocation::Direct(argv) => argv
            .iter()
            .map(|arg| {
                if !arg.is_empty()
                    && arg
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || "-_./:=@+,".contains(c))
                {
                    arg.clone()
                } else {
                    crate::template::shell_quote(arg)
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
        Invocation::Shell(script) => script.clone(),
    }
}
