//! Scan passes.
//!
//! A [`Scanner`] runs one reconciliation pass over a [`Library`](crate::episode::Library):
//! - **Check**: season folders are compared with the derived episode lists
//! - **Match**: missing episodes are looked up in the search-folder snapshot
//! - **Plan**: file operations and artifacts are canonicalized into an [`ActionPlan`](crate::action::ActionPlan)
//!
//! The pass is single-threaded and cooperative; see [`crate::control`].

mod runner;
mod types;

pub use runner::Scanner;
pub use types::{ScanError, ScanReport, ScanStats, ScanWarning};
