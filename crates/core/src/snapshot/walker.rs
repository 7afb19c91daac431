//! Folder enumeration into a [`DirectorySnapshot`].

use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::types::{DirectoryCacheItem, DirectorySnapshot, SnapshotError, SnapshotOptions};
use crate::control::{Cancelled, ScanControl, ScanPhase};
use crate::metrics;

/// Result of enumerating a set of roots.
#[derive(Debug, Default)]
pub struct SnapshotBuild {
    pub snapshot: DirectorySnapshot,
    /// Per-directory failures. Enumeration continued past each one.
    pub errors: Vec<SnapshotError>,
}

/// Enumerates every file below `roots`.
///
/// Failures are isolated to the directory or file that caused them and
/// returned alongside the snapshot. Only cancellation aborts the walk.
pub fn build_snapshot(
    roots: &[PathBuf],
    options: &SnapshotOptions,
    control: &mut ScanControl<'_>,
) -> Result<SnapshotBuild, Cancelled> {
    let mut items = Vec::new();
    let mut errors = Vec::new();

    for (index, root) in roots.iter().enumerate() {
        control.check()?;
        control.report(ScanPhase::Enumerating, index, roots.len());

        if !root.is_dir() {
            warn!(path = %root.display(), "Snapshot root is not a directory, skipping");
            errors.push(SnapshotError::RootNotFound { path: root.clone() });
            continue;
        }

        let before = items.len();
        walk_root(root, options, control, &mut items, &mut errors)?;
        debug!(
            path = %root.display(),
            files = items.len() - before,
            "Enumerated snapshot root"
        );
    }
    control.report(ScanPhase::Enumerating, roots.len(), roots.len());

    metrics::FILES_ENUMERATED.inc_by(items.len() as u64);
    metrics::ENUMERATION_ERRORS.inc_by(errors.len() as u64);
    info!(
        roots = roots.len(),
        files = items.len(),
        errors = errors.len(),
        "Snapshot complete"
    );

    Ok(SnapshotBuild {
        snapshot: DirectorySnapshot::from_items(items),
        errors,
    })
}

fn walk_root(
    root: &Path,
    options: &SnapshotOptions,
    control: &ScanControl<'_>,
    items: &mut Vec<DirectoryCacheItem>,
    errors: &mut Vec<SnapshotError>,
) -> Result<(), Cancelled> {
    let walker = WalkDir::new(root)
        .follow_links(options.follow_links)
        .max_depth(options.max_depth)
        .sort_by_file_name();

    for entry in walker {
        control.check()?;
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                match entry.metadata() {
                    Ok(metadata) => {
                        let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
                        items.push(DirectoryCacheItem::new(
                            entry.path(),
                            metadata.len(),
                            modified,
                        ));
                    }
                    Err(e) => {
                        warn!(path = %entry.path().display(), error = %e, "Failed to read file metadata");
                        errors.push(classify(entry.path(), &e));
                    }
                }
            }
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                warn!(path = %path.display(), error = %e, "Error walking directory");
                errors.push(classify(&path, &e));
            }
        }
    }
    Ok(())
}

fn classify(path: &Path, error: &walkdir::Error) -> SnapshotError {
    match error.io_error().map(|e| e.kind()) {
        Some(ErrorKind::PermissionDenied) => SnapshotError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => SnapshotError::Unreadable {
            path: path.to_path_buf(),
            message: error.to_string(),
        },
    }
}
