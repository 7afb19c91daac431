//! Plan canonicalization: deduplication, copy/move decision and ordering.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::{Action, ActionCategory, ActionKind, FileOpKind, FileOperation};

/// Deduplicates, decides copy versus move, and orders a raw action list.
///
/// - Two actions with the same category and produced path collapse to the first.
/// - Among file operations sharing a source, the last in sort order becomes a
///   move unless `preserve_originals` is set; the rest are copies. A rename of
///   a source forces its other operations to copies.
/// - File operations come first, sorted by source, then cross-volume before
///   same-volume, then target. Other actions keep their relative order within
///   their kind; deletions come last.
pub fn finalize(actions: Vec<Action>, preserve_originals: bool) -> Vec<Action> {
    let actions = dedupe(actions);

    let (mut file_ops, others): (Vec<Action>, Vec<Action>) = actions
        .into_iter()
        .partition(|a| matches!(a.kind, ActionKind::FileOperation(_)));

    sort_file_operations(&mut file_ops);
    decide_copy_or_move(&mut file_ops, preserve_originals);

    let mut others = others;
    others.sort_by_key(rank);

    let mut ordered = file_ops;
    ordered.extend(others);
    ordered
}

/// Removes actions whose (category, produced path) was already seen, keeping the first.
pub fn dedupe(actions: Vec<Action>) -> Vec<Action> {
    let mut seen: HashSet<(ActionCategory, PathBuf)> = HashSet::new();
    let before = actions.len();
    let kept: Vec<Action> = actions
        .into_iter()
        .filter(|a| seen.insert((a.category(), a.produces())))
        .collect();
    if kept.len() != before {
        debug!(dropped = before - kept.len(), "Dropped duplicate actions");
    }
    kept
}

/// Position of a non-file action kind in the final plan.
fn rank(action: &Action) -> u8 {
    match &action.kind {
        ActionKind::FileOperation(_) => 0,
        ActionKind::DownloadArtifact(_) => 1,
        ActionKind::TimestampCorrection(_) => 2,
        ActionKind::ExternalFetch(_) => 3,
        ActionKind::MissingEpisode(_) => 4,
        ActionKind::DeleteFile { .. } => 5,
        ActionKind::DeleteDirectory { .. } => 6,
    }
}

fn sort_file_operations(file_ops: &mut [Action]) {
    file_ops.sort_by_cached_key(|a| match a.as_file_operation() {
        Some(op) => (
            op.source.clone(),
            op.operation == FileOpKind::Rename,
            same_volume(&op.source, &op.target),
            op.target.clone(),
        ),
        None => (PathBuf::new(), false, false, PathBuf::new()),
    });
}

fn decide_copy_or_move(file_ops: &mut [Action], preserve_originals: bool) {
    let mut renamed: HashSet<PathBuf> = HashSet::new();
    let mut last_by_source: BTreeMap<PathBuf, usize> = BTreeMap::new();

    for (index, action) in file_ops.iter().enumerate() {
        let Some(op) = action.as_file_operation() else {
            continue;
        };
        if op.operation == FileOpKind::Rename {
            renamed.insert(op.source.clone());
        } else {
            last_by_source.insert(op.source.clone(), index);
        }
    }

    for (index, action) in file_ops.iter_mut().enumerate() {
        let Some(op) = action.as_file_operation_mut() else {
            continue;
        };
        if op.operation == FileOpKind::Rename {
            continue;
        }
        let is_last = last_by_source.get(&op.source) == Some(&index);
        op.operation = if is_last && !preserve_originals && !renamed.contains(&op.source) {
            FileOpKind::Move
        } else {
            FileOpKind::Copy
        };
    }
}

/// Whether `a` and `b` live on the same volume.
///
/// Compares the device of the nearest existing ancestor of each path where
/// the platform exposes one, else the leading path components.
pub fn same_volume(a: &Path, b: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let device = |p: &Path| {
            p.ancestors()
                .find_map(|ancestor| std::fs::metadata(ancestor).ok())
                .map(|m| m.dev())
        };
        if let (Some(da), Some(db)) = (device(a), device(b)) {
            return da == db;
        }
    }

    same_prefix(a, b)
}

/// Whether `a` and `b` share their first two path components.
fn same_prefix(a: &Path, b: &Path) -> bool {
    a.components().take(2).eq(b.components().take(2))
}

/// Every source path used by a file operation in `actions`.
pub(crate) fn operation_sources(actions: &[Action]) -> HashSet<PathBuf> {
    actions
        .iter()
        .filter_map(Action::as_file_operation)
        .map(|op: &FileOperation| op.source.clone())
        .collect()
}
