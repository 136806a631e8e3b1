//! Identity-based diff of two [`Snapshot`]s.

use crate::{
	detect::task_equals,
	snapshot::{SectionKind, Snapshot, Task, TaskId},
};
use hashbrown::{HashMap, HashSet};
use serde::Serialize;
use tracing::{instrument, trace};

/// Added, removed and updated tasks per section.
///
/// Removed tasks are in the old snapshot's order, added and updated ones in the new snapshot's order.
/// Updated tasks are the new versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Changes {
	pub removed_self_care_tasks: Vec<Task>,
	pub removed_tasks: Vec<Task>,
	pub added_self_care_tasks: Vec<Task>,
	pub added_tasks: Vec<Task>,
	pub updated_self_care_tasks: Vec<Task>,
	pub updated_tasks: Vec<Task>,
}

struct SectionChanges {
	removed: Vec<Task>,
	added: Vec<Task>,
	updated: Vec<Task>,
}

/// Matches tasks by `id` only. There is no rename or move detection.
fn diff_section(old: &[Task], new: &[Task]) -> SectionChanges {
	let old_by_id: HashMap<&TaskId, &Task> = old.iter().map(|task| (&task.id, task)).collect();
	let new_ids: HashSet<&TaskId> = new.iter().map(|task| &task.id).collect();

	let removed = old.iter().filter(|task| !new_ids.contains(&task.id)).cloned().collect();

	let mut added = Vec::new();
	let mut updated = Vec::new();
	for task in new {
		match old_by_id.get(&task.id) {
			None => added.push(task.clone()),
			Some(old_task) if !task_equals(old_task, task) => updated.push(task.clone()),
			Some(_) => (),
		}
	}

	SectionChanges { removed, added, updated }
}

/// Computes the edit script from `old` to `new`, one section at a time.
#[must_use]
#[instrument(level = "trace", skip(old, new))]
pub fn identify_changes(old: &Snapshot, new: &Snapshot) -> Changes {
	let self_care = diff_section(old.section(SectionKind::SelfCare), new.section(SectionKind::SelfCare));
	let tasks = diff_section(old.section(SectionKind::Task), new.section(SectionKind::Task));

	let changes = Changes {
		removed_self_care_tasks: self_care.removed,
		removed_tasks: tasks.removed,
		added_self_care_tasks: self_care.added,
		added_tasks: tasks.added,
		updated_self_care_tasks: self_care.updated,
		updated_tasks: tasks.updated,
	};
	trace!(
		removed = changes.removed_self_care_tasks.len() + changes.removed_tasks.len(),
		added = changes.added_self_care_tasks.len() + changes.added_tasks.len(),
		updated = changes.updated_self_care_tasks.len() + changes.updated_tasks.len(),
		"Identified changes."
	);
	changes
}

impl Changes {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.removed_self_care_tasks.is_empty()
			&& self.removed_tasks.is_empty()
			&& self.added_self_care_tasks.is_empty()
			&& self.added_tasks.is_empty()
			&& self.updated_self_care_tasks.is_empty()
			&& self.updated_tasks.is_empty()
	}

	#[must_use]
	pub fn has_additions(&self) -> bool {
		!self.added_self_care_tasks.is_empty() || !self.added_tasks.is_empty()
	}

	/// Removed tasks of both sections, self-care first.
	pub fn removed(&self) -> impl Iterator<Item = (SectionKind, &Task)> {
		tagged(&self.removed_self_care_tasks, &self.removed_tasks)
	}

	/// Added tasks of both sections, self-care first.
	pub fn added(&self) -> impl Iterator<Item = (SectionKind, &Task)> {
		tagged(&self.added_self_care_tasks, &self.added_tasks)
	}

	/// Updated tasks (new versions) of both sections, self-care first.
	pub fn updated(&self) -> impl Iterator<Item = (SectionKind, &Task)> {
		tagged(&self.updated_self_care_tasks, &self.updated_tasks)
	}

	/// Total number of added, removed and updated tasks.
	#[must_use]
	pub fn change_count(&self) -> usize {
		self.removed().count() + self.added().count() + self.updated().count()
	}
}

fn tagged<'a>(self_care: &'a [Task], tasks: &'a [Task]) -> impl Iterator<Item = (SectionKind, &'a Task)> {
	self_care
		.iter()
		.map(|task| (SectionKind::SelfCare, task))
		.chain(tasks.iter().map(|task| (SectionKind::Task, task)))
}
