//! Applies [`Changes`] to a rendered task list without re-rendering it.
//!
//! Removals are animated out and handled here. Updates are left to [`PatchHooks`].
//! Additions are never spliced in: [`PatchApplier::apply_partial_updates`] reports them so the caller falls back to a full render.

use crate::{
	changes::Changes,
	snapshot::{Snapshot, Task, TaskKey},
};
use tracing::{debug, instrument, trace, warn};

/// The rendered side of a task list card.
pub trait TaskListView {
	/// Puts the element rendered for `key` into its exiting state.
	///
	/// Returns `false` iff no such element is currently rendered.
	fn mark_exiting(&mut self, key: &TaskKey) -> bool;

	/// Creates the deferred half of a removal: once called, it detaches the element rendered for `key`
	/// (as of now, not as of when it runs) and releases `key`'s task data.
	fn removal(&self, key: &TaskKey) -> Box<dyn FnOnce()>;

	/// Stores the new versions of updated tasks, so that event handlers resolve keys to current data.
	fn update_data(&mut self, changes: &Changes) {
		let _ = changes;
	}

	/// Regenerates all markup for `snapshot` and rebuilds the task data lookup.
	///
	/// Returns `false` iff rendering failed and the previous markup is still in place.
	fn render_full(&mut self, snapshot: &Snapshot) -> bool;
}

/// Card-specific parts of a partial update. Both methods do nothing by default.
pub trait PatchHooks {
	/// Refreshes section-level chrome like empty-state messages and counts. Called once per patch.
	fn update_section_states(&mut self, changes: &Changes) {
		let _ = changes;
	}

	/// Patches the elements of updated tasks in place. Only called if there were no additions.
	fn update_task_elements(&mut self, changes: &Changes) {
		let _ = changes;
	}
}

/// [`PatchHooks`] that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;
impl PatchHooks for NoHooks {}

/// Runs removals after a delay, keyed so that a pending removal can be superseded or cancelled.
pub trait RemovalScheduler {
	/// Runs `removal` after `delay_ms`, replacing any removal already pending for `key`.
	fn schedule(&mut self, key: TaskKey, delay_ms: u32, removal: Box<dyn FnOnce()>);

	/// Drops the pending removal for `key`, if any, without running it.
	///
	/// Returns whether one was pending.
	fn cancel(&mut self, key: &TaskKey) -> bool;

	/// Drops all pending removals without running them.
	fn cancel_all(&mut self);

	/// How many removals are pending.
	fn pending(&self) -> usize;
}

#[derive(Debug)]
pub struct PatchApplier<S: RemovalScheduler> {
	scheduler: S,
	removal_delay_ms: u32,
}

impl<S: RemovalScheduler> PatchApplier<S> {
	#[must_use]
	pub fn new(scheduler: S, removal_delay_ms: u32) -> Self {
		Self { scheduler, removal_delay_ms }
	}

	#[must_use]
	pub fn scheduler(&self) -> &S {
		&self.scheduler
	}

	pub fn cancel_removal(&mut self, key: &TaskKey) -> bool {
		self.scheduler.cancel(key)
	}

	pub fn cancel_all_removals(&mut self) {
		self.scheduler.cancel_all()
	}

	/// Patches `view` to reflect `changes`.
	///
	/// Each removed task's element is marked as exiting right away and detached after the removal delay.
	/// This doesn't wait for the delay to pass.
	///
	/// Returns `false` if the caller must fall back to a full render, which is the case iff any task was added.
	#[instrument(level = "debug", skip(self, changes, view, hooks))]
	pub fn apply_partial_updates(&mut self, changes: &Changes, view: &mut impl TaskListView, hooks: &mut impl PatchHooks) -> bool {
		for (section, task) in changes.removed() {
			let key = TaskKey::new(section, &task.id);
			trace!(%key, name = ?logged_name(task), "Removing task.");
			if view.mark_exiting(&key) {
				let removal = view.removal(&key);
				self.scheduler.schedule(key, self.removal_delay_ms, removal);
			} else {
				warn!(%key, "No rendered element found for removed task.");
			}
		}

		hooks.update_section_states(changes);

		if changes.has_additions() {
			debug!(
				self_care = changes.added_self_care_tasks.len(),
				tasks = changes.added_tasks.len(),
				"Tasks were added. A full render is required."
			);
			return false;
		}

		view.update_data(changes);
		hooks.update_task_elements(changes);
		true
	}
}

fn logged_name(task: &Task) -> Option<&str> {
	if cfg!(feature = "dangerous-logging") {
		task.name.as_deref()
	} else {
		None
	}
}
