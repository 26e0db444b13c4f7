//! linebisect library crate
//!
//! Binary search over the lines of some input to find the first bad one,
//! judged either by a person or by a command. The binary is a thin wrapper
//! around these modules.

pub mod bisect;
pub mod boundary;
pub mod config;
pub mod error;
pub mod input;
pub mod judge;
pub mod logging;
pub mod process;
pub mod report;
pub mod template;
pub mod theme;

pub use bisect::{BisectObserver, BisectResult, Bisector, Judge, Judgment, SearchRange, Silent};
pub use boundary::resolve_boundaries;
pub use error::{BisectError, Boundary, Result};
pub use input::LineSequence;
pub use judge::{AutomaticJudge, InteractiveJudge};
pub use template::{render, CommandTemplate};
