//! The final, ordered action plan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

use super::companions::{keep_together, tidy_up};
use super::order::{dedupe, finalize};
use super::types::{Action, ActionGroup, ActionKind, MissingEpisode};
use crate::config::PlanConfig;
use crate::metrics;
use crate::snapshot::DirectorySnapshot;

/// Ordered list of actions produced by one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub actions: Vec<Action>,
}

impl ActionPlan {
    /// Builds the final plan from raw scan actions.
    ///
    /// Companions are added first, then the list is finalized (dedupe,
    /// copy/move decision, ordering) and tidy-up deletions for the resulting
    /// moves are appended. `search_roots` are never scheduled for deletion.
    pub fn build(
        actions: Vec<Action>,
        config: &PlanConfig,
        snapshots: &[&DirectorySnapshot],
        search_roots: &[PathBuf],
    ) -> Self {
        let actions = if config.keep_together {
            keep_together(actions, config, snapshots)
        } else {
            actions
        };

        let mut actions = finalize(actions, config.preserve_originals);
        let deletions = tidy_up(&actions, config, snapshots, search_roots);
        actions.extend(deletions);
        let actions = dedupe(actions);

        let plan = Self { actions };
        for (group, count) in plan.count_by_group() {
            metrics::PLANNED_ACTIONS
                .with_label_values(&[group_label(group)])
                .inc_by(count as u64);
        }
        info!(actions = plan.len(), "Action plan built");
        plan
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Action> {
        self.actions.iter()
    }

    /// Episodes still reported missing.
    pub fn missing(&self) -> impl Iterator<Item = &MissingEpisode> {
        self.actions.iter().filter_map(|a| match &a.kind {
            ActionKind::MissingEpisode(m) => Some(m),
            _ => None,
        })
    }

    pub fn count_by_group(&self) -> BTreeMap<ActionGroup, usize> {
        let mut counts = BTreeMap::new();
        for action in &self.actions {
            *counts.entry(action.group()).or_insert(0) += 1;
        }
        counts
    }

    /// Pretty JSON rendering. Identical plans render byte-identical.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn group_label(group: ActionGroup) -> &'static str {
    match group {
        ActionGroup::Missing => "missing",
        ActionGroup::Copy => "copy",
        ActionGroup::Move => "move",
        ActionGroup::Rename => "rename",
        ActionGroup::Download => "download",
        ActionGroup::WriteMetadata => "write_metadata",
        ActionGroup::Timestamp => "timestamp",
        ActionGroup::Fetch => "fetch",
        ActionGroup::Delete => "delete",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{CleanupPolicy, FileOpKind, FileOperation};
    use crate::snapshot::DirectoryCacheItem;

    #[test]
    fn test_build_moves_companions_and_tidies() {
        let snapshot = DirectorySnapshot::from_items(
            ["/dl/x/a.mkv", "/dl/x/a.srt", "/dl/x/a.nfo"]
                .iter()
                .map(|p| DirectoryCacheItem::new(*p, 10, None)),
        );
        let mut op = FileOperation::new(FileOpKind::Copy, "/dl/x/a.mkv", "/lib/A.mkv");
        op.cleanup = Some(CleanupPolicy::TidySourceFolder);

        let config = PlanConfig {
            tidy_extensions: vec!["nfo".to_string()],
            ..PlanConfig::default()
        };
        let plan = ActionPlan::build(vec![Action::file(op)], &config, &[&snapshot], &[]);

        let groups: Vec<ActionGroup> = plan.iter().map(Action::group).collect();
        assert_eq!(
            groups,
            vec![ActionGroup::Move, ActionGroup::Move, ActionGroup::Delete]
        );
        assert_eq!(plan.count_by_group()[&ActionGroup::Move], 2);
    }

    #[test]
    fn test_to_json_is_deterministic() {
        let plan = ActionPlan {
            actions: vec![Action::delete_file("/dl/a.nfo")],
        };
        assert_eq!(plan.to_json().unwrap(), plan.clone().to_json().unwrap());
    }
}
