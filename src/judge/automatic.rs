use crate::bisect::{Judge, Judgment};
use crate::error::{BisectError, Result};
use crate::input::LineSequence;
use crate::process::{describe, ExecOptions};
use crate::template::CommandTemplate;
use std::io::{BufWriter, Write};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const TEMP_PREFIX: &str = "linebisect-";
const TEMP_SUFFIX: &str = ".txt";

/// Judges each candidate by running a command.
///
/// Every step writes lines 1 through the candidate to a fresh temporary file,
/// runs the optional `before` hook, runs the test command, then the optional
/// `after` hook. Exit status 0 is good; anything else, including death by
/// signal, is bad. Hook statuses are ignored.
#[derive(Debug, Clone)]
pub struct AutomaticJudge {
    test: CommandTemplate,
    before: Option<CommandTemplate>,
    after: Option<CommandTemplate>,
    exec: ExecOptions,
}

impl AutomaticJudge {
    pub fn new(test: &str) -> Self {
        Self {
            test: CommandTemplate::parse(test),
            before: None,
            after: None,
            exec: ExecOptions::default(),
        }
    }

    pub fn with_before(mut self, before: Option<&str>) -> Self {
        self.before = before.map(CommandTemplate::parse);
        self
    }

    pub fn with_after(mut self, after: Option<&str>) -> Self {
        self.after = after.map(CommandTemplate::parse);
        self
    }

    pub fn with_exec(mut self, exec: ExecOptions) -> Self {
        self.exec = exec;
        self
    }

    pub fn test_command(&self) -> &str {
        self.test.as_str()
    }

    fn run_hook(&self, label: &str, hook: Option<&CommandTemplate>, path: &str, line: &str) {
        let Some(hook) = hook else {
            return;
        };
        let invocation = hook.invocation(path, line, self.exec.force_shell);
        match self.exec.run(&invocation) {
            Ok(status) => debug!(hook = label, %status, "hook finished"),
            Err(err) => warn!(hook = label, error = %err, "hook could not be started"),
        }
    }
}

/// Write `lines[..=candidate]` to a new temporary file, one per line.
///
/// The file is removed when the returned handle drops.
fn materialize_prefix(lines: &LineSequence, candidate: usize) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile()
        .map_err(|e| BisectError::io("failed to create temp file", e))?;

    {
        let mut writer = BufWriter::new(file.as_file_mut());
        for line in lines.prefix_through(candidate) {
            writer
                .write_all(line.as_bytes())
                .and_then(|_| writer.write_all(b"\n"))
                .map_err(|e| BisectError::io("failed to write temp file", e))?;
        }
        writer
            .flush()
            .map_err(|e| BisectError::io("failed to write temp file", e))?;
    }

    Ok(file)
}

impl Judge for AutomaticJudge {
    fn judge(&mut self, lines: &LineSequence, candidate: usize) -> Result<Option<Judgment>> {
        let file = materialize_prefix(lines, candidate)?;
        let path = file.path().to_string_lossy().into_owned();
        let line = &lines[candidate];
        debug!(path = %path, line = candidate + 1, "wrote candidate prefix");

        self.run_hook("before", self.before.as_ref(), &path, line);

        let invocation = self.test.invocation(&path, line, self.exec.force_shell);
        let status = self.exec.run(&invocation)?;
        let judgment = if status.success() {
            Judgment::Good
        } else {
            Judgment::Bad
        };
        debug!(command = %describe(&invocation), %status, %judgment, "test finished");

        self.run_hook("after", self.after.as_ref(), &path, line);

        drop(file);
        Ok(Some(judgment))
    }
}
