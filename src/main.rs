//! linebisect - find the first bad line
//!
//! Works like `git bisect`, but over the lines of a file or stdin.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use crossterm::tty::IsTty;
use linebisect::config::Config;
use linebisect::judge::{AutomaticJudge, InteractiveJudge};
use linebisect::report::{self, Mode, TerminalObserver};
use linebisect::theme::{ColorChoice, Palette};
use linebisect::{logging, resolve_boundaries, Bisector, Judge, LineSequence};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "linebisect",
    about = "Bisect input lines to find the first bad line",
    long_about = "Bisects the lines of a file (or stdin) to find the first bad line,\n\
                  the way git bisect finds the first bad commit.\n\n\
                  By default the first line is assumed good and the last line bad.\n\
                  Use --good and --bad to start from the first lines containing a pattern.\n\
                  Use --test to judge lines with a command instead of answering prompts.\n\n\
                  Placeholders (in --test, --before and --after):\n  \
                  {file} or {}  path of a temp file holding lines 1 through the tested line\n  \
                  {line}        the tested line itself\n\
                  A command with no placeholder gets the temp file path appended.",
    version
)]
struct Args {
    /// Input file (reads stdin when omitted)
    file: Option<PathBuf>,

    /// Content pattern identifying a known good line
    #[arg(long, value_name = "PATTERN")]
    good: Option<String>,

    /// Content pattern identifying a known bad line
    #[arg(long, value_name = "PATTERN")]
    bad: Option<String>,

    /// Command judging each line (exit 0 = good, non-zero = bad)
    #[arg(long, value_name = "CMD")]
    test: Option<String>,

    /// Command to run before each test (exit status ignored)
    #[arg(long, value_name = "CMD")]
    before: Option<String>,

    /// Command to run after each test (exit status ignored)
    #[arg(long, value_name = "CMD")]
    after: Option<String>,

    /// Interpreter for commands that use shell syntax
    #[arg(long, value_name = "PROGRAM")]
    shell: Option<String>,

    /// Run every command through the shell
    #[arg(long)]
    force_shell: bool,

    /// Show output of judged commands
    #[arg(long)]
    show_output: bool,

    /// When to use colors
    #[arg(long, value_enum, value_name = "WHEN")]
    color: Option<ColorChoice>,

    /// Lines of context shown around each line
    #[arg(long, value_name = "N")]
    context: Option<usize>,

    /// Print the result as JSON (progress goes to stderr)
    #[arg(long)]
    json: bool,

    /// More diagnostics on stderr (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut config = Config::load();
    if let Some(shell) = args.shell.clone() {
        config.shell = Some(shell);
    }
    config.force_shell |= args.force_shell;
    config.show_command_output |= args.show_output;
    if let Some(color) = args.color {
        config.color = color;
    }
    if let Some(context) = args.context {
        config.context_lines = context;
    }

    let (lines, data_from_stdin) = read_input(args.file.as_ref())?;
    let range = resolve_boundaries(
        &lines,
        non_empty(args.good).as_deref(),
        non_empty(args.bad).as_deref(),
    )?;

    // Progress shares stdout with the result unless stdout is reserved for JSON.
    let to_stderr = args.json;
    let palette = Palette::new(if to_stderr {
        config.color.resolve(&io::stderr())
    } else {
        config.color.resolve(&io::stdout())
    });

    let test = non_empty(args.test);
    let mode = match &test {
        Some(command) => Mode::Automatic {
            test_command: command.clone(),
        },
        None => Mode::Interactive,
    };

    let mut judge: Box<dyn Judge> = match test {
        Some(test) => Box::new(
            AutomaticJudge::new(&test)
                .with_before(non_empty(args.before).as_deref())
                .with_after(non_empty(args.after).as_deref())
                .with_exec(config.exec_options()),
        ),
        None => Box::new(
            InteractiveJudge::new(open_responses(data_from_stdin), progress_stream(to_stderr))
                .with_palette(palette)
                .with_context(config.context_lines),
        ),
    };

    let mut observer =
        TerminalObserver::new(progress_stream(to_stderr), palette, mode).with_lines(lines.clone());

    let result = Bisector::new(&lines, range)?.run(&mut judge, &mut observer)?;

    let mut stdout = io::stdout().lock();
    if args.json {
        report::write_json(&mut stdout, &result)?;
    } else {
        report::write_result(&mut stdout, &lines, &result, palette, config.context_lines)?;
    }

    Ok(())
}

fn read_input(file: Option<&PathBuf>) -> Result<(LineSequence, bool)> {
    if let Some(path) = file {
        let lines = LineSequence::from_path(path).context("failed to read input")?;
        return Ok((lines, false));
    }

    let stdin = io::stdin();
    if stdin.is_tty() {
        bail!("no input provided: specify a file argument or pipe/redirect stdin");
    }
    let lines = LineSequence::from_reader(stdin.lock()).context("failed to read input")?;
    Ok((lines, true))
}

/// Where interactive answers come from. When stdin carries the data, answers
/// come from the controlling terminal instead.
fn open_responses(data_from_stdin: bool) -> Box<dyn BufRead> {
    if data_from_stdin {
        match File::open(terminal_device()) {
            Ok(tty) => return Box::new(BufReader::new(tty)),
            Err(err) => warn!(error = %err, "could not open terminal, reading answers from stdin"),
        }
    }
    Box::new(BufReader::new(io::stdin()))
}

#[cfg(windows)]
fn terminal_device() -> &'static str {
    "CONIN$"
}

#[cfg(not(windows))]
fn terminal_device() -> &'static str {
    "/dev/tty"
}

fn progress_stream(to_stderr: bool) -> Box<dyn Write> {
    if to_stderr {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    }
}
