//! Directory snapshots.
//!
//! A snapshot is the full listing of files under a set of roots taken once per
//! scan, so matching never touches the filesystem again. Enumeration failures
//! are recorded per directory and never abort the snapshot.

mod types;
mod walker;

pub use types::{DirectoryCacheItem, DirectorySnapshot, SnapshotError, SnapshotOptions};
pub use walker::{build_snapshot, SnapshotBuild};
