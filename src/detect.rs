//! Decides whether two successive [`Snapshot`]s may be reconciled by patching the rendered list in place.

use crate::snapshot::{SectionKind, Snapshot, Task, TaskId, TaskWindow, UserContext};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

/// Tunables of the partial update path.
///
/// Deserialises from a card's options, with missing fields taking their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialUpdatePolicy {
	/// The largest number of added plus removed tasks (across both sections) that is still patched rather than re-rendered.
	pub max_partial_changes: usize,
	/// How long a removed task's element stays in the DOM marked as exiting. Should match the stylesheet's transition.
	pub removal_delay_ms: u32,
}

impl PartialUpdatePolicy {
	pub const DEFAULT_MAX_PARTIAL_CHANGES: usize = 3;
	pub const DEFAULT_REMOVAL_DELAY_MS: u32 = 300;
}

impl Default for PartialUpdatePolicy {
	fn default() -> Self {
		Self {
			max_partial_changes: Self::DEFAULT_MAX_PARTIAL_CHANGES,
			removal_delay_ms: Self::DEFAULT_REMOVAL_DELAY_MS,
		}
	}
}

/// The structural half of change detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector {
	policy: PartialUpdatePolicy,
}

impl ChangeDetector {
	#[must_use]
	pub fn new(policy: PartialUpdatePolicy) -> Self {
		Self { policy }
	}

	#[must_use]
	pub fn policy(&self) -> &PartialUpdatePolicy {
		&self.policy
	}

	/// Whether `new` may be applied to a list rendered from `old` by patching instead of a full re-render.
	///
	/// This is `false` on first load (either side missing), on a switch into or out of the defaults plan,
	/// on any change to the [`UserContext`], when a section appears or disappears,
	/// and when more than [`PartialUpdatePolicy::max_partial_changes`] tasks were added or removed in total.
	#[must_use]
	#[instrument(level = "trace", skip(old, new))]
	pub fn can_attempt_partial_update(&self, old: Option<&Snapshot>, new: Option<&Snapshot>) -> bool {
		let (old, new) = match (old, new) {
			(Some(old), Some(new)) => (old, new),
			_ => {
				trace!("No previous snapshot to patch against.");
				return false;
			}
		};

		if old.using_defaults != new.using_defaults {
			debug!(old = old.using_defaults, new = new.using_defaults, "Defaults plan switched.");
			return false;
		}

		if !user_context_equal(old.user_context.as_ref(), new.user_context.as_ref()) {
			debug!("User context changed.");
			return false;
		}

		for section in SectionKind::ALL {
			let was_empty = old.section(section).is_empty();
			let is_empty = new.section(section).is_empty();
			if was_empty != is_empty {
				debug!(%section, was_empty, is_empty, "Section appeared or disappeared.");
				return false;
			}
		}

		let change_count: usize = SectionKind::ALL.into_iter().map(|section| added_and_removed_count(old.section(section), new.section(section))).sum();
		if change_count > self.policy.max_partial_changes {
			debug!(change_count, max = self.policy.max_partial_changes, "Too many added or removed tasks to patch.");
			return false;
		}

		trace!(change_count, "Partial update possible.");
		true
	}
}

fn ids(tasks: &[Task]) -> HashSet<&TaskId> {
	tasks.iter().map(|task| &task.id).collect()
}

fn added_and_removed_count(old: &[Task], new: &[Task]) -> usize {
	let old_ids = ids(old);
	let new_ids = ids(new);
	old_ids.difference(&new_ids).count() + new_ids.difference(&old_ids).count()
}

/// Missing on both sides is equal, missing on only one side is not.
#[must_use]
pub fn user_context_equal(old: Option<&UserContext>, new: Option<&UserContext>) -> bool {
	match (old, new) {
		(None, None) => true,
		(Some(old), Some(new)) => old.timezone == new.timezone && old.daily_reset_time == new.daily_reset_time && old.current_logical_date == new.current_logical_date,
		_ => false,
	}
}

fn sort_key(task: &Task) -> String {
	format!("{}_{}_{}", task.id, task.completed.unwrap_or(false), task.outstanding_occurrences.unwrap_or(0))
}

/// Cheap equality of two task lists: same length and the same multiset of `"{id}_{completed}_{outstanding_occurrences}"` keys.
///
/// Both key lists are sorted as strings and compared pairwise, so order within a list doesn't matter.
/// Fields other than those three are not looked at.
#[must_use]
pub fn task_lists_equal(old: &[Task], new: &[Task]) -> bool {
	if old.len() != new.len() {
		return false;
	}

	let mut old_keys: Vec<_> = old.iter().map(sort_key).collect();
	let mut new_keys: Vec<_> = new.iter().map(sort_key).collect();
	old_keys.sort_unstable();
	new_keys.sort_unstable();
	old_keys == new_keys
}

/// Full content equality of two tasks as far as rendering is concerned.
///
/// Missing values only equal missing values here. Windows are compared with [`windows_equal`].
#[must_use]
pub fn task_equals(old: &Task, new: &Task) -> bool {
	old.id == new.id
		&& old.name == new.name
		&& old.completed == new.completed
		&& old.outstanding_occurrences == new.outstanding_occurrences
		&& old.required_occurrences == new.required_occurrences
		&& old.recommendation_score == new.recommendation_score
		&& old.task_nudges == new.task_nudges
		&& windows_equal(old.windows.as_deref(), new.windows.as_deref())
}

/// Positional comparison of `completed` and `label`.
///
/// Other window fields such as start and end times are ignored.
#[must_use]
pub fn windows_equal(old: Option<&[TaskWindow]>, new: Option<&[TaskWindow]>) -> bool {
	match (old, new) {
		(None, None) => true,
		(Some(old), Some(new)) => old.len() == new.len() && old.iter().zip(new).all(|(old, new)| old.completed == new.completed && old.label == new.label),
		_ => false,
	}
}
