use crate::{
	changes::Changes,
	snapshot::{Snapshot, Task, TaskKey},
};
use hashbrown::HashMap;
use tracing::trace;

/// Resolves rendered elements' [`TaskKey`]s back to the task data they were rendered from.
///
/// Owned by a single card. Entries are replaced wholesale on full renders, updated in place on patches,
/// and released when a removed task's element is detached.
#[derive(Debug, Default)]
pub struct TaskLookup {
	entries: HashMap<TaskKey, Task>,
}

impl TaskLookup {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces all entries with the tasks of `snapshot`.
	pub fn rebuild(&mut self, snapshot: &Snapshot) {
		self.entries.clear();
		self.entries.extend(snapshot.iter_sections().map(|(section, task)| (TaskKey::new(section, &task.id), task.clone())));
		trace!("Task lookup rebuilt with {} entries.", self.entries.len());
	}

	/// Stores the new versions of all updated tasks in `changes`.
	pub fn apply_updates(&mut self, changes: &Changes) {
		for (section, task) in changes.updated() {
			self.entries.insert(TaskKey::new(section, &task.id), task.clone());
		}
	}

	#[must_use]
	pub fn get(&self, key: &TaskKey) -> Option<&Task> {
		self.entries.get(key)
	}

	pub fn release(&mut self, key: &TaskKey) -> Option<Task> {
		self.entries.remove(key)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
