//! The two ways a candidate line can be judged.
//!
//! Both implement [`crate::bisect::Judge`]; the engine never knows which one
//! it is talking to.

pub mod automatic;
pub mod interactive;

pub use automatic::AutomaticJudge;
pub use interactive::{parse_response, InteractiveJudge};
