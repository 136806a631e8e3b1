//! The refresh cycle of a task list card: detection, identification, application, fallback.

use crate::{
	changes::identify_changes,
	detect::{ChangeDetector, PartialUpdatePolicy},
	patch::{PatchApplier, PatchHooks, RemovalScheduler, TaskListView},
	snapshot::Snapshot,
};
use core::fmt::{self, Display, Formatter};
use tracing::{debug, info, instrument, warn};

/// How a [`TaskListCard::refresh`] brought the rendering up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
	/// Nothing rendered differs. The snapshot is the new baseline.
	Unchanged,
	/// The rendering was patched in place.
	Patched,
	/// Everything was re-rendered.
	FullRender,
	/// Rendering failed. The previous baseline is kept, so the next refresh compares against what is still shown.
	Failed,
}

impl RenderOutcome {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Unchanged => "unchanged",
			Self::Patched => "patched",
			Self::FullRender => "full",
			Self::Failed => "failed",
		}
	}
}

impl Display for RenderOutcome {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Owns the previous snapshot of one card and decides per refresh between patching and re-rendering.
#[derive(Debug)]
pub struct TaskListCard<V: TaskListView, S: RemovalScheduler, H: PatchHooks> {
	view: V,
	hooks: H,
	detector: ChangeDetector,
	applier: PatchApplier<S>,
	previous: Option<Snapshot>,
}

impl<V: TaskListView, S: RemovalScheduler, H: PatchHooks> TaskListCard<V, S, H> {
	#[must_use]
	pub fn new(view: V, scheduler: S, hooks: H, policy: PartialUpdatePolicy) -> Self {
		Self {
			view,
			hooks,
			detector: ChangeDetector::new(policy),
			applier: PatchApplier::new(scheduler, policy.removal_delay_ms),
			previous: None,
		}
	}

	#[must_use]
	pub fn view(&self) -> &V {
		&self.view
	}

	#[must_use]
	pub fn hooks(&self) -> &H {
		&self.hooks
	}

	#[must_use]
	pub fn scheduler(&self) -> &S {
		self.applier.scheduler()
	}

	/// The last accepted snapshot.
	#[must_use]
	pub fn previous(&self) -> Option<&Snapshot> {
		self.previous.as_ref()
	}

	/// Brings the rendering up to date with a freshly fetched `snapshot`.
	#[instrument(skip(self, snapshot))]
	pub fn refresh(&mut self, snapshot: Snapshot) -> RenderOutcome {
		let outcome = if self.detector.can_attempt_partial_update(self.previous.as_ref(), Some(&snapshot)) {
			self.patch_or_render(&snapshot)
		} else {
			self.render_full(&snapshot)
		};

		if outcome == RenderOutcome::Failed {
			warn!("Keeping the previous snapshot as baseline.");
		} else {
			self.previous = Some(snapshot);
		}
		debug!(%outcome, "Refreshed.");
		outcome
	}

	fn patch_or_render(&mut self, snapshot: &Snapshot) -> RenderOutcome {
		let previous = match self.previous.as_ref() {
			Some(previous) => previous,
			None => return self.render_full(snapshot),
		};

		let changes = identify_changes(previous, snapshot);
		if changes.is_empty() {
			return RenderOutcome::Unchanged;
		}

		if self.applier.apply_partial_updates(&changes, &mut self.view, &mut self.hooks) {
			RenderOutcome::Patched
		} else {
			self.render_full(snapshot)
		}
	}

	fn render_full(&mut self, snapshot: &Snapshot) -> RenderOutcome {
		// Stale removals would otherwise release the task data of a task that was just re-rendered.
		self.applier.cancel_all_removals();
		if self.view.render_full(snapshot) {
			RenderOutcome::FullRender
		} else {
			RenderOutcome::Failed
		}
	}

	/// Forgets the baseline, so the next refresh renders fully.
	pub fn invalidate(&mut self) {
		self.previous = None;
	}

	/// Tears the card down: pending removals are dropped and the baseline is forgotten.
	pub fn disconnect(&mut self) {
		info!("Disconnecting task list card.");
		self.applier.cancel_all_removals();
		self.previous = None;
	}
}
