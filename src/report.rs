//! Human-facing progress and result output.

use crate::bisect::{BisectObserver, BisectResult, Judgment, SearchRange};
use crate::input::LineSequence;
use crate::theme::{Palette, RESULT_SEPARATOR, STEP_SEPARATOR};
use std::io::{self, Write};

/// Longest line content echoed in automatic step logs.
const MAX_ECHOED_LINE: usize = 120;

/// Which judge the progress output is describing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Automatic { test_command: String },
}

/// Prints progress for a run to a terminal (or any writer).
pub struct TerminalObserver<W: Write> {
    out: W,
    palette: Palette,
    mode: Mode,
    lines: Option<LineSequence>,
}

impl<W: Write> TerminalObserver<W> {
    pub fn new(out: W, palette: Palette, mode: Mode) -> Self {
        Self {
            out,
            palette,
            mode,
            lines: None,
        }
    }

    /// Lets automatic mode echo each candidate's content.
    pub fn with_lines(mut self, lines: LineSequence) -> Self {
        self.lines = Some(lines);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: std::fmt::Arguments<'_>) {
        // Progress output is best-effort; a closed pipe must not abort the search.
        let _ = self.out.write_fmt(text);
        let _ = self.out.write_all(b"\n");
        let _ = self.out.flush();
    }
}

impl<W: Write> BisectObserver for TerminalObserver<W> {
    fn on_start(&mut self, range: SearchRange, total_lines: usize) {
        let p = self.palette;
        match self.mode.clone() {
            Mode::Interactive => {
                self.emit(format_args!(
                    "{} between lines {} and {} ({} lines total, about {} steps)",
                    p.heading("Starting bisection"),
                    range.good() + 1,
                    range.bad() + 1,
                    total_lines,
                    range.remaining_steps()
                ));
                self.emit(format_args!(
                    "Type 'g' or 'good' if the line is good, 'b' or 'bad' if the line is bad"
                ));
            }
            Mode::Automatic { test_command } => {
                self.emit(format_args!(
                    "{} between lines {} and {} ({} lines total, about {} steps)",
                    p.heading("Starting automatic bisection"),
                    range.good() + 1,
                    range.bad() + 1,
                    total_lines,
                    range.remaining_steps()
                ));
                self.emit(format_args!("Test command: {}", test_command));
            }
        }
        self.emit(format_args!(""));
    }

    fn on_step(&mut self, step: usize, candidate: usize, total_lines: usize) {
        let p = self.palette;
        let header = p.heading(&format!("Step {}:", step));
        match self.mode {
            Mode::Interactive => {
                self.emit(format_args!("{}", p.heading(STEP_SEPARATOR)));
                self.emit(format_args!(
                    "{} Testing line {} of {}",
                    header,
                    candidate + 1,
                    total_lines
                ));
            }
            Mode::Automatic { .. } => {
                self.emit(format_args!(
                    "{} Testing line {} of {}",
                    header,
                    candidate + 1,
                    total_lines
                ));
                let content = self
                    .lines
                    .as_ref()
                    .and_then(|lines| lines.get(candidate))
                    .map(|line| truncate(line, MAX_ECHOED_LINE));
                if let Some(content) = content {
                    self.emit(format_args!("Line content: {}", content));
                }
            }
        }
    }

    fn on_judged(&mut self, judgment: Judgment, range: SearchRange) {
        let p = self.palette;
        let label = match (&self.mode, judgment) {
            (Mode::Interactive, Judgment::Good) => p.good("✓ Marked as good"),
            (Mode::Interactive, Judgment::Bad) => p.bad("✗ Marked as bad"),
            (Mode::Automatic { .. }, Judgment::Good) => p.good("Test passed (good)"),
            (Mode::Automatic { .. }, Judgment::Bad) => p.bad("Test failed (bad)"),
        };
        self.emit(format_args!(
            "{}. Searching lines {}-{}",
            label,
            range.good() + 1,
            range.bad() + 1
        ));
        self.emit(format_args!(""));
    }
}

/// Print the completion banner, the first bad line with context, and the step count.
pub fn write_result<W: Write>(
    out: &mut W,
    lines: &LineSequence,
    result: &BisectResult,
    palette: Palette,
    context: usize,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", palette.good(RESULT_SEPARATOR))?;
    writeln!(out, "{}", palette.success("✓ Bisection Complete"))?;
    writeln!(out, "{}", palette.good(RESULT_SEPARATOR))?;
    writeln!(out)?;
    writeln!(
        out,
        "The first bad line is {}",
        palette.culprit(&result.bad_line_number.to_string())
    )?;
    writeln!(out)?;

    let bad = result.bad_index();
    for (number, content) in lines.window(bad, context) {
        let row = format!("{:4} | {}", number, content);
        if number == result.bad_line_number {
            writeln!(out, "{}", palette.culprit(&row))?;
        } else {
            writeln!(out, "{}", palette.faded(&row))?;
        }
    }

    writeln!(out)?;
    writeln!(out, "{} {}", palette.bold("Steps taken:"), result.steps_taken)?;
    writeln!(out)?;
    out.flush()
}

/// Print the result as one JSON object.
pub fn write_json<W: Write>(out: &mut W, result: &BisectResult) -> io::Result<()> {
    serde_json::to_writer(&mut *out, result).map_err(io::Error::from)?;
    writeln!(out)?;
    out.flush()
}

fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }

    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }

    if max <= 3 {
        return s.chars().take(max).collect();
    }

    let truncated: String = s.chars().take(max - 3).collect();
    format!("{}...", truncated)
}
