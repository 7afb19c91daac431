//! Actions and action plans.
//!
//! A scan produces a flat list of [`Action`]s. [`ActionPlan::build`] turns it
//! into the canonical plan: companions kept together, duplicates dropped,
//! copy/move decided per source and everything in execution order. The plan
//! is pure data; executing it is somebody else's job.

mod companions;
mod order;
mod plan;
mod types;

pub use companions::{keep_together, tidy_up};
pub use order::{dedupe, finalize, same_volume};
pub use plan::ActionPlan;
pub use types::*;
