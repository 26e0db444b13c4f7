//! Line-oriented input.
//!
//! A [`LineSequence`] is the immutable list of lines a run searches over.
//! Indices are 0-based internally; everything shown to a user is 1-based.

use crate::error::{BisectError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Index;
use std::path::Path;

/// Ordered, non-empty list of input lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSequence {
    lines: Vec<String>,
}

impl LineSequence {
    /// Wrap already-split lines. Fails with `EmptyInput` for an empty list.
    pub fn new(lines: Vec<String>) -> Result<Self> {
        if lines.is_empty() {
            return Err(BisectError::EmptyInput);
        }
        Ok(Self { lines })
    }

    /// Read every line from `reader`.
    ///
    /// Line terminators (`\n` or `\r\n`) are stripped. A final newline does not
    /// produce a trailing empty line, but blank lines in the middle are kept.
    /// Bytes that are not UTF-8 become U+FFFD instead of failing the read.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut lines = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| BisectError::io("failed to read input", e))?;
            if read == 0 {
                break;
            }
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
            lines.push(String::from_utf8_lossy(&buf).into_owned());
        }
        Self::new(lines)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| BisectError::io(format!("failed to open {}", path.display()), e))?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.lines.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    /// Lines `0..=index`, the prefix an automatic judge hands to its command.
    pub fn prefix_through(&self, index: usize) -> &[String] {
        let end = (index + 1).min(self.lines.len());
        &self.lines[..end]
    }

    /// Index of the first line containing `pattern` as a substring.
    pub fn find(&self, pattern: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.contains(pattern))
    }

    /// `(line_number, content)` pairs for `index` and up to `radius` lines on each side.
    pub fn window(&self, index: usize, radius: usize) -> impl Iterator<Item = (usize, &str)> {
        let start = index.saturating_sub(radius);
        let end = index.saturating_add(radius).min(self.last_index());
        (start..=end).map(move |i| (i + 1, self.lines[i].as_str()))
    }
}

impl Index<usize> for LineSequence {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.lines[index]
    }
}

impl From<LineSequence> for Vec<String> {
    fn from(seq: LineSequence) -> Self {
        seq.lines
    }
}
