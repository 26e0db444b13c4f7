//! The bisection engine.
//!
//! The engine owns a [`SearchRange`] whose `good` end is known good and whose
//! `bad` end is known bad. Each step asks a [`Judge`] about the lower-middle
//! line and moves one end onto it, until the two ends are adjacent. The first
//! bad line is then `bad`.

use crate::error::{BisectError, Result};
use crate::input::LineSequence;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Verdict on a single candidate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Judgment {
    Good,
    Bad,
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Judgment::Good => f.write_str("good"),
            Judgment::Bad => f.write_str("bad"),
        }
    }
}

/// Half-open search window `(good, bad]`, 0-indexed.
///
/// Invariant: `good < bad`. Narrowing only ever moves `good` up or `bad` down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRange {
    good: usize,
    bad: usize,
}

impl SearchRange {
    pub fn new(good: usize, bad: usize) -> Result<Self> {
        if good >= bad {
            return Err(BisectError::InvalidBoundaries { good, bad });
        }
        Ok(Self { good, bad })
    }

    /// Like [`SearchRange::new`], additionally checking `bad` is a valid index into `lines`.
    pub fn within(lines: &LineSequence, good: usize, bad: usize) -> Result<Self> {
        if bad > lines.last_index() {
            return Err(BisectError::InvalidBoundaries { good, bad });
        }
        Self::new(good, bad)
    }

    pub fn good(&self) -> usize {
        self.good
    }

    pub fn bad(&self) -> usize {
        self.bad
    }

    /// Lower-middle candidate; floor division keeps step counts reproducible.
    pub fn midpoint(&self) -> usize {
        self.good + (self.bad - self.good) / 2
    }

    pub fn is_narrowed(&self) -> bool {
        self.bad - self.good == 1
    }

    /// Valid judgments needed to finish: `ceil(log2(bad - good))`.
    pub fn remaining_steps(&self) -> u32 {
        let width = self.bad - self.good;
        if width <= 1 {
            0
        } else {
            usize::BITS - (width - 1).leading_zeros()
        }
    }

    fn apply(&mut self, judgment: Judgment, candidate: usize) {
        debug_assert!(self.good < candidate && candidate < self.bad);
        match judgment {
            Judgment::Good => self.good = candidate,
            Judgment::Bad => self.bad = candidate,
        }
    }
}

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BisectResult {
    /// 1-indexed.
    pub bad_line_number: usize,
    pub bad_line_content: String,
    /// Valid judgments only; retried responses are not counted.
    pub steps_taken: usize,
}

impl BisectResult {
    pub fn bad_index(&self) -> usize {
        self.bad_line_number - 1
    }
}

/// Something that can decide whether a candidate line is good or bad.
///
/// `Ok(None)` means no verdict was reached (for example an unrecognised
/// interactive answer); the engine asks again about the same line without
/// counting the attempt.
pub trait Judge {
    fn judge(&mut self, lines: &LineSequence, candidate: usize) -> Result<Option<Judgment>>;
}

impl<J: Judge + ?Sized> Judge for &mut J {
    fn judge(&mut self, lines: &LineSequence, candidate: usize) -> Result<Option<Judgment>> {
        (**self).judge(lines, candidate)
    }
}

impl<J: Judge + ?Sized> Judge for Box<J> {
    fn judge(&mut self, lines: &LineSequence, candidate: usize) -> Result<Option<Judgment>> {
        (**self).judge(lines, candidate)
    }
}

/// Progress callbacks. None of them can influence the search.
pub trait BisectObserver {
    fn on_start(&mut self, _range: SearchRange, _total_lines: usize) {}

    /// `step` is 1-based and counts the attempt about to be made.
    fn on_step(&mut self, _step: usize, _candidate: usize, _total_lines: usize) {}

    fn on_judged(&mut self, _judgment: Judgment, _range: SearchRange) {}

    fn on_invalid_response(&mut self, _candidate: usize) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl BisectObserver for Silent {}

/// A single bisection run over borrowed lines.
pub struct Bisector<'a> {
    lines: &'a LineSequence,
    range: SearchRange,
    steps: usize,
}

impl<'a> Bisector<'a> {
    pub fn new(lines: &'a LineSequence, range: SearchRange) -> Result<Self> {
        let range = SearchRange::within(lines, range.good(), range.bad())?;
        Ok(Self {
            lines,
            range,
            steps: 0,
        })
    }

    pub fn range(&self) -> SearchRange {
        self.range
    }

    /// Drive the search to completion.
    ///
    /// Any judge error aborts the run immediately.
    pub fn run<J, O>(mut self, judge: &mut J, observer: &mut O) -> Result<BisectResult>
    where
        J: Judge + ?Sized,
        O: BisectObserver + ?Sized,
    {
        let total = self.lines.len();
        info!(
            good = self.range.good() + 1,
            bad = self.range.bad() + 1,
            total,
            "starting bisection"
        );
        observer.on_start(self.range, total);

        while !self.range.is_narrowed() {
            let candidate = self.range.midpoint();
            self.steps += 1;
            observer.on_step(self.steps, candidate, total);

            match judge.judge(self.lines, candidate)? {
                Some(judgment) => {
                    self.range.apply(judgment, candidate);
                    debug!(
                        step = self.steps,
                        line = candidate + 1,
                        %judgment,
                        good = self.range.good() + 1,
                        bad = self.range.bad() + 1,
                        "narrowed range"
                    );
                    observer.on_judged(judgment, self.range);
                }
                None => {
                    self.steps -= 1;
                    debug!(line = candidate + 1, "no verdict, asking again");
                    observer.on_invalid_response(candidate);
                }
            }
        }

        let bad = self.range.bad();
        Ok(BisectResult {
            bad_line_number: bad + 1,
            bad_line_content: self.lines[bad].to_string(),
            steps_taken: self.steps,
        })
    }
}
