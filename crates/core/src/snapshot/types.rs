//! Types for directory snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::matcher::normalize::simplify;

/// One file seen while enumerating a folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryCacheItem {
    pub path: PathBuf,
    /// Simplified file stem, ready for name comparisons.
    pub simplified_name: String,
    /// Size in bytes.
    pub length: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl DirectoryCacheItem {
    pub fn new(path: impl Into<PathBuf>, length: u64, modified: Option<DateTime<Utc>>) -> Self {
        let path = path.into();
        let simplified_name = path
            .file_stem()
            .map(|s| simplify(&s.to_string_lossy()))
            .unwrap_or_default();
        Self {
            path,
            simplified_name,
            length,
            modified,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Lower-cased extension without the dot. Empty when there is none.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }
}

/// A failure enumerating part of a folder tree. The rest of the tree is still enumerated.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotError {
    /// A configured root does not exist or is not a directory.
    #[error("Folder not found: {path}")]
    RootNotFound { path: PathBuf },

    /// A directory or file could not be read due to permissions.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Any other enumeration failure (path too long, I/O error, link loop).
    #[error("Failed to read {path}: {message}")]
    Unreadable { path: PathBuf, message: String },
}

/// Snapshot enumeration options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotOptions {
    pub follow_links: bool,
    pub max_depth: usize,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            follow_links: false,
            max_depth: 32,
        }
    }
}

/// Immutable set of files found under some roots, indexed by path and by folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    items: Vec<DirectoryCacheItem>,
    by_path: BTreeMap<PathBuf, usize>,
    by_directory: BTreeMap<PathBuf, Vec<usize>>,
}

impl DirectorySnapshot {
    /// Builds a snapshot from items. Items are ordered by path; duplicates keep the first.
    pub fn from_items(items: impl IntoIterator<Item = DirectoryCacheItem>) -> Self {
        let mut items: Vec<DirectoryCacheItem> = items.into_iter().collect();
        items.sort_by(|a, b| a.path.cmp(&b.path));
        items.dedup_by(|a, b| a.path == b.path);

        let mut by_path = BTreeMap::new();
        let mut by_directory: BTreeMap<PathBuf, Vec<usize>> = BTreeMap::new();
        for (index, item) in items.iter().enumerate() {
            by_path.insert(item.path.clone(), index);
            by_directory
                .entry(item.directory().to_path_buf())
                .or_default()
                .push(index);
        }

        Self {
            items,
            by_path,
            by_directory,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[DirectoryCacheItem] {
        &self.items
    }

    pub fn get(&self, path: &Path) -> Option<&DirectoryCacheItem> {
        self.by_path.get(path).map(|&i| &self.items[i])
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.by_path.contains_key(path)
    }

    /// Files directly inside `directory`, ordered by path.
    pub fn files_in<'a>(
        &'a self,
        directory: &Path,
    ) -> impl Iterator<Item = &'a DirectoryCacheItem> + 'a {
        self.by_directory
            .get(directory)
            .into_iter()
            .flatten()
            .map(move |&i| &self.items[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(path: &str) -> DirectoryCacheItem {
        DirectoryCacheItem::new(path, 100, None)
    }

    #[test]
    fn test_item_accessors() {
        let item = item("/dl/Foo.US.S02E05.MKV");
        assert_eq!(item.file_name(), "Foo.US.S02E05.MKV");
        assert_eq!(item.stem(), "Foo.US.S02E05");
        assert_eq!(item.extension(), "mkv");
        assert_eq!(item.simplified_name, "foo us s02e05");
        assert_eq!(item.directory(), Path::new("/dl"));
    }

    #[test]
    fn test_snapshot_orders_and_indexes() {
        let snapshot = DirectorySnapshot::from_items(vec![
            item("/dl/b.mkv"),
            item("/dl/a.mkv"),
            item("/dl/sub/c.mkv"),
            item("/dl/a.mkv"),
        ]);
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.items()[0].path, PathBuf::from("/dl/a.mkv"));
        assert!(snapshot.contains(Path::new("/dl/sub/c.mkv")));
        assert!(snapshot.get(Path::new("/dl/missing.mkv")).is_none());

        let names: Vec<String> = snapshot
            .files_in(Path::new("/dl"))
            .map(|i| i.file_name())
            .collect();
        assert_eq!(names, vec!["a.mkv", "b.mkv"]);
    }
}
