use crate::bisect::{Judge, Judgment};
use crate::error::{BisectError, Result};
use crate::input::LineSequence;
use crate::theme::Palette;
use std::io::{self, BufRead, Write};

pub const PROMPT: &str = "Is this line good or bad? [g/b]: ";

/// Map a typed answer to a judgment. Case and surrounding whitespace are ignored.
pub fn parse_response(response: &str) -> Option<Judgment> {
    match response.trim().to_lowercase().as_str() {
        "g" | "good" => Some(Judgment::Good),
        "b" | "bad" => Some(Judgment::Bad),
        _ => None,
    }
}

/// Asks a person about each candidate.
///
/// The candidate is shown with `context` lines on either side, then one line
/// is read from `reader`. Unrecognised answers print a notice and yield no
/// verdict, so the same line is asked about again.
pub struct InteractiveJudge<R, W> {
    reader: R,
    out: W,
    palette: Palette,
    context: usize,
}

impl<R: BufRead, W: Write> InteractiveJudge<R, W> {
    pub fn new(reader: R, out: W) -> Self {
        Self {
            reader,
            out,
            palette: Palette::plain(),
            context: 1,
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_context(mut self, context: usize) -> Self {
        self.context = context;
        self
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.out)
    }

    fn show_candidate(&mut self, lines: &LineSequence, candidate: usize) -> io::Result<()> {
        writeln!(self.out)?;
        for (number, content) in lines.window(candidate, self.context) {
            if number == candidate + 1 {
                writeln!(
                    self.out,
                    "{} | {}",
                    self.palette.candidate(&format!("{:4}", number)),
                    content
                )?;
            } else {
                writeln!(
                    self.out,
                    "{}",
                    self.palette.faded(&format!("{:4} | {}", number, content))
                )?;
            }
        }
        writeln!(self.out)?;
        write!(self.out, "{}", PROMPT)?;
        self.out.flush()
    }

    /// One raw answer. Bytes that are not UTF-8 are kept lossily and end up
    /// as an unrecognised answer, not a read failure.
    fn read_response(&mut self) -> Result<String> {
        let mut response = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut response)
            .map_err(BisectError::ResponseRead)?;
        if read == 0 {
            return Err(BisectError::ResponseRead(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a response was given",
            )));
        }
        Ok(String::from_utf8_lossy(&response).into_owned())
    }
}

impl<R: BufRead, W: Write> Judge for InteractiveJudge<R, W> {
    fn judge(&mut self, lines: &LineSequence, candidate: usize) -> Result<Option<Judgment>> {
        self.show_candidate(lines, candidate)
            .map_err(|e| BisectError::io("failed to write prompt", e))?;

        let response = self.read_response()?;
        let judgment = parse_response(&response);
        if judgment.is_none() {
            writeln!(
                self.out,
                "{}. Please enter 'g' (good) or 'b' (bad)",
                self.palette.bad("⚠ Invalid input")
            )
            .map_err(|e| BisectError::io("failed to write prompt", e))?;
        }
        Ok(judgment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bisect::{Bisector, SearchRange, Silent};
    use std::io::Cursor;

    fn seq(lines: &[&str]) -> LineSequence {
        LineSequence::new(lines.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn run(lines: &LineSequence, good: usize, bad: usize, input: &str) -> Result<(crate::bisect::BisectResult, String)> {
        let mut judge = InteractiveJudge::new(Cursor::new(input.to_string()), Vec::new());
        let result = Bisector::new(lines, SearchRange::new(good, bad)?)?.run(&mut judge, &mut Silent)?;
        let (_, out) = judge.into_inner();
        Ok((result, String::from_utf8(out).unwrap()))
    }

    #[test]
    fn test_parse_response_variants() {
        for answer in ["g", "G", "good", "GOOD", "  Good \n"] {
            assert_eq!(parse_response(answer), Some(Judgment::Good), "{answer:?}");
        }
        for answer in ["b", "B", "bad", "BAD", "\tbAd\r\n"] {
            assert_eq!(parse_response(answer), Some(Judgment::Bad), "{answer:?}");
        }
        for answer in ["", "y", "gb", "goodish", "n", "ba d"] {
            assert_eq!(parse_response(answer), None, "{answer:?}");
        }
    }

    #[test]
    fn test_single_bad_line() {
        let lines = seq(&["good1", "good2", "bad"]);
        let (result, _) = run(&lines, 0, 2, "g\n").unwrap();
        assert_eq!(result.bad_line_number, 3);
        assert_eq!(result.bad_line_content, "bad");
        assert_eq!(result.steps_taken, 1);
    }

    #[test]
    fn test_multiple_answers() {
        let lines = seq(&["good1", "good2", "bad1", "bad2", "bad3"]);
        let (result, _) = run(&lines, 0, 4, "g\nb\n").unwrap();
        assert_eq!(result.bad_line_number, 4);
        assert_eq!(result.bad_line_content, "bad2");
        assert_eq!(result.steps_taken, 2);
    }

    #[test]
    fn test_invalid_answer_is_retried_and_not_counted() {
        let lines = seq(&["good1", "good2", "bad"]);
        let (result, out) = run(&lines, 0, 2, "invalid\n\ng\n").unwrap();
        assert_eq!(result.bad_line_number, 3);
        assert_eq!(result.steps_taken, 1);
        assert_eq!(out.matches("Invalid input").count(), 2);
        assert_eq!(out.matches(PROMPT).count(), 3);
        assert_eq!(out.matches("   2 | good2").count(), 3);
    }

    #[test]
    fn test_non_utf8_answer_is_retried() {
        let lines = seq(&["good1", "good2", "bad"]);
        let mut input = vec![0xff, 0xfe, b'\n'];
        input.extend_from_slice(b"g\n");
        let mut judge = InteractiveJudge::new(Cursor::new(input), Vec::new());
        let result = Bisector::new(&lines, SearchRange::new(0, 2).unwrap())
            .unwrap()
            .run(&mut judge, &mut Silent)
            .unwrap();
        assert_eq!(result.bad_line_number, 3);
        assert_eq!(result.steps_taken, 1);
        let (_, out) = judge.into_inner();
        assert_eq!(String::from_utf8(out).unwrap().matches("Invalid input").count(), 1);
    }

    #[test]
    fn test_eof_aborts_with_read_error() {
        let lines = seq(&["a", "b", "c", "d"]);
        let err = run(&lines, 0, 3, "g\n").unwrap_err();
        assert!(matches!(err, BisectError::ResponseRead(_)));
    }

    #[test]
    fn test_candidate_shown_with_context() {
        let lines = seq(&["one", "two", "three", "four", "five"]);
        let mut judge = InteractiveJudge::new(Cursor::new("b\n"), Vec::new());
        judge.judge(&lines, 2).unwrap();
        let (_, out) = judge.into_inner();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("   2 | two\n"));
        assert!(out.contains("   3 | three\n"));
        assert!(out.contains("   4 | four\n"));
        assert!(!out.contains("one"));
        assert!(!out.contains("five"));
    }

    #[test]
    fn test_wider_context() {
        let lines = seq(&["one", "two", "three", "four", "five"]);
        let mut judge = InteractiveJudge::new(Cursor::new("b\n"), Vec::new()).with_context(2);
        judge.judge(&lines, 2).unwrap();
        let (_, out) = judge.into_inner();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("one") && out.contains("five"));
    }
}
