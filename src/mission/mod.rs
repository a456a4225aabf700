//! Mission decision logic
//!
//! Pure functions over the domain model. Nothing here touches a store or the
//! clock; callers pass `now` in.

pub mod engine;
pub mod progress;

pub use engine::{evaluate_claim, ClaimRejection, ClaimResult};
pub use progress::{merge_progress, ProgressReport, ReportedSlot, SaveRejection};
