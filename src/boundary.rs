//! Locating the initial good/bad lines before any judging happens.

use crate::bisect::SearchRange;
use crate::error::{BisectError, Boundary, Result};
use crate::input::LineSequence;

/// Resolve the starting range from optional content patterns.
///
/// Each pattern is matched as a substring, scanning from the first line; the
/// two scans are independent. Without a pattern the good end defaults to the
/// first line and the bad end to the last.
pub fn resolve_boundaries(
    lines: &LineSequence,
    good_pattern: Option<&str>,
    bad_pattern: Option<&str>,
) -> Result<SearchRange> {
    let good = match good_pattern {
        Some(pattern) => find_boundary(lines, Boundary::Good, pattern)?,
        None => 0,
    };
    let bad = match bad_pattern {
        Some(pattern) => find_boundary(lines, Boundary::Bad, pattern)?,
        None => lines.last_index(),
    };

    SearchRange::new(good, bad)
}

fn find_boundary(lines: &LineSequence, boundary: Boundary, pattern: &str) -> Result<usize> {
    lines
        .find(pattern)
        .ok_or_else(|| BisectError::PatternNotFound {
            boundary,
            pattern: pattern.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(lines: &[&str]) -> LineSequence {
        LineSequence::new(lines.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_defaults_to_first_and_last() {
        let lines = seq(&["a", "b", "c", "d"]);
        let range = resolve_boundaries(&lines, None, None).unwrap();
        assert_eq!((range.good(), range.bad()), (0, 3));
    }

    #[test]
    fn test_patterns_pick_first_match() {
        let lines = seq(&[
            "boot", "START here", "x", "x", "x", "x", "x", "x", "x", "ERROR one", "ERROR two",
            "START again",
        ]);
        let range = resolve_boundaries(&lines, Some("START"), Some("ERROR")).unwrap();
        assert_eq!((range.good(), range.bad()), (1, 9));
    }

    #[test]
    fn test_bad_scan_does_not_resume_from_good() {
        // "mark" matches line 0 for both scans, so the range collapses.
        let lines = seq(&["mark", "x", "mark"]);
        let err = resolve_boundaries(&lines, Some("mark"), Some("mark")).unwrap_err();
        assert!(matches!(
            err,
            BisectError::InvalidBoundaries { good: 0, bad: 0 }
        ));
    }

    #[test]
    fn test_missing_good_pattern() {
        let lines = seq(&["a", "b"]);
        let err = resolve_boundaries(&lines, Some("nope"), None).unwrap_err();
        match err {
            BisectError::PatternNotFound { boundary, pattern } => {
                assert_eq!(boundary, Boundary::Good);
                assert_eq!(pattern, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_bad_pattern() {
        let lines = seq(&["a", "b"]);
        let err = resolve_boundaries(&lines, None, Some("nope")).unwrap_err();
        assert!(matches!(
            err,
            BisectError::PatternNotFound {
                boundary: Boundary::Bad,
                ..
            }
        ));
    }

    #[test]
    fn test_good_after_bad_is_invalid() {
        let lines = seq(&["bad here", "good here"]);
        let err = resolve_boundaries(&lines, Some("good"), Some("bad")).unwrap_err();
        assert!(matches!(
            err,
            BisectError::InvalidBoundaries { good: 1, bad: 0 }
        ));
    }

    #[test]
    fn test_single_line_input_is_invalid() {
        let lines = seq(&["only"]);
        assert!(matches!(
            resolve_boundaries(&lines, None, None),
            Err(BisectError::InvalidBoundaries { good: 0, bad: 0 })
        ));
    }
}
