//! Companion files: keep-together and tidy-up.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::order::operation_sources;
use super::types::{Action, CleanupPolicy, FileOpKind, FileOperation};
use crate::config::PlanConfig;
use crate::snapshot::{DirectoryCacheItem, DirectorySnapshot};

/// Files directly inside `directory` across all snapshots, ordered by path.
fn siblings<'a>(
    snapshots: &[&'a DirectorySnapshot],
    directory: &Path,
) -> Vec<&'a DirectoryCacheItem> {
    let mut found: BTreeMap<&Path, &DirectoryCacheItem> = BTreeMap::new();
    for snapshot in snapshots {
        for item in snapshot.files_in(directory) {
            found.entry(item.path.as_path()).or_insert(item);
        }
    }
    found.into_values().collect()
}

/// Adds a file operation for every companion of a planned file operation.
///
/// A companion shares the source's stem (`Show.S01E02.en.srt` next to
/// `Show.S01E02.mkv`) and gets the target's stem with its own suffix. Excluded
/// extensions, files already used as a source and companions that would land
/// on their parent's target are skipped. New operations come ahead of the
/// existing actions.
pub fn keep_together(
    actions: Vec<Action>,
    config: &PlanConfig,
    snapshots: &[&DirectorySnapshot],
) -> Vec<Action> {
    let mut taken = operation_sources(&actions);
    let mut companions: Vec<Action> = Vec::new();

    for op in actions.iter().filter_map(Action::as_file_operation) {
        let (Some(source_dir), Some(source_stem), Some(target_dir), Some(target_stem)) = (
            op.source.parent(),
            op.source.file_stem().map(|s| s.to_string_lossy().into_owned()),
            op.target.parent(),
            op.target.file_stem().map(|s| s.to_string_lossy().into_owned()),
        ) else {
            continue;
        };
        let prefix = format!("{}.", source_stem);

        for sibling in siblings(snapshots, source_dir) {
            let name = sibling.file_name();
            let Some(rest) = name.strip_prefix(&prefix) else {
                continue;
            };
            if sibling.path == op.source || taken.contains(&sibling.path) {
                continue;
            }
            let extension = sibling.extension();
            if config
                .keep_together_exclude
                .iter()
                .any(|e| e.eq_ignore_ascii_case(&extension))
            {
                continue;
            }

            let suffix = substitute_extension(rest, config);
            let target = target_dir.join(format!("{}.{}", target_stem, suffix));
            if target == op.target {
                continue;
            }

            debug!(
                companion = %sibling.path.display(),
                target = %target.display(),
                "Keeping companion with its episode"
            );
            taken.insert(sibling.path.clone());
            companions.push(Action::file(FileOperation {
                operation: op.operation,
                source: sibling.path.clone(),
                target,
                cleanup: op.cleanup,
                resolves: None,
                episode: None,
            }));
        }
    }

    companions.extend(actions);
    companions
}

/// Applies the configured extension substitution to the last extension of `suffix`.
fn substitute_extension(suffix: &str, config: &PlanConfig) -> String {
    let Some(substitution) = &config.keep_together_substitution else {
        return suffix.to_string();
    };
    match suffix.rsplit_once('.') {
        Some((head, ext)) if ext.eq_ignore_ascii_case(&substitution.from) => {
            format!("{}.{}", head, substitution.to)
        }
        None if suffix.eq_ignore_ascii_case(&substitution.from) => substitution.to.clone(),
        _ => suffix.to_string(),
    }
}

/// Deletions that tidy a search folder after its episodes were moved out.
///
/// For every move flagged [`CleanupPolicy::TidySourceFolder`], siblings with a
/// tidy extension that nothing else uses are deleted, and the folder itself is
/// removed when empty if configured. A search root and its ancestors are
/// never removed; inside them only siblings sharing the video's stem are
/// tidied.
pub fn tidy_up(
    actions: &[Action],
    config: &PlanConfig,
    snapshots: &[&DirectorySnapshot],
    search_roots: &[PathBuf],
) -> Vec<Action> {
    let sources = operation_sources(actions);
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut directories: Vec<PathBuf> = Vec::new();
    let mut deletions = Vec::new();

    for op in actions.iter().filter_map(Action::as_file_operation) {
        if op.operation != FileOpKind::Move || op.cleanup != Some(CleanupPolicy::TidySourceFolder)
        {
            continue;
        }
        let Some(directory) = op.source.parent() else {
            continue;
        };
        let protected = search_roots.iter().any(|root| root.starts_with(directory));
        let stem_prefix = op
            .source
            .file_stem()
            .map(|stem| format!("{}.", stem.to_string_lossy()));

        for sibling in siblings(snapshots, directory) {
            let extension = sibling.extension();
            let tidy = config
                .tidy_extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(&extension));
            if !tidy || sources.contains(&sibling.path) {
                continue;
            }
            if protected
                && !stem_prefix
                    .as_deref()
                    .is_some_and(|prefix| sibling.file_name().starts_with(prefix))
            {
                continue;
            }
            if seen.insert(sibling.path.clone()) {
                deletions.push(Action::delete_file(sibling.path.clone()));
            }
        }

        if protected {
            debug!(directory = %directory.display(), "Search root kept");
            continue;
        }
        if config.delete_empty_directories && !directories.iter().any(|d| d == directory) {
            directories.push(directory.to_path_buf());
        }
    }

    deletions.extend(directories.into_iter().map(Action::delete_directory));
    deletions
}
