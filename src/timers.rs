use crate::{patch::RemovalScheduler, snapshot::TaskKey};
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
};
use hashbrown::HashMap;
use std::rc::{Rc, Weak};
use tracing::{error, instrument, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast};

struct PendingRemoval {
	handle: i32,
	removal: Box<dyn FnOnce()>,
	timeout: Closure<dyn FnMut()>,
}

#[derive(Default)]
struct TimerState {
	pending: HashMap<TaskKey, PendingRemoval>,
	/// Closures of timeouts that have fired. These can't be dropped from inside their own invocation.
	spent: Vec<Closure<dyn FnMut()>>,
}

impl TimerState {
	fn finish(&mut self, key: &TaskKey) -> Option<Box<dyn FnOnce()>> {
		let PendingRemoval { removal, timeout, .. } = self.pending.remove(key)?;
		self.spent.push(timeout);
		Some(removal)
	}
}

/// A [`RemovalScheduler`] backed by the window's `setTimeout`.
///
/// Each pending removal keeps its [`Closure`] alive until it fires or is cancelled.
/// Dropping the scheduler clears every pending timeout, so a torn-down card leaves no timers behind.
pub struct TimeoutScheduler {
	state: Rc<RefCell<TimerState>>,
}

impl Debug for TimeoutScheduler {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("TimeoutScheduler").field("pending", &self.pending()).finish_non_exhaustive()
	}
}

impl Default for TimeoutScheduler {
	fn default() -> Self {
		Self::new()
	}
}

impl TimeoutScheduler {
	#[must_use]
	pub fn new() -> Self {
		Self {
			state: Rc::new(RefCell::new(TimerState::default())),
		}
	}

	fn timeout_closure(state: Weak<RefCell<TimerState>>, key: TaskKey) -> Closure<dyn FnMut()> {
		Closure::once(move || {
			let state = match state.upgrade() {
				Some(state) => state,
				None => return trace!(%key, "Removal timer fired after its scheduler was dropped."),
			};
			// The borrow must end before the removal runs.
			let removal = state.borrow_mut().finish(&key);
			match removal {
				Some(removal) => {
					trace!(%key, "Running deferred removal.");
					removal()
				}
				None => warn!(%key, "Removal timer fired without a pending removal."),
			}
		})
	}
}

impl RemovalScheduler for TimeoutScheduler {
	#[instrument(skip(self, removal))]
	fn schedule(&mut self, key: TaskKey, delay_ms: u32, removal: Box<dyn FnOnce()>) {
		if self.cancel(&key) {
			trace!(%key, "Replaced pending removal.");
		}
		self.state.borrow_mut().spent.clear();

		let window = match web_sys::window() {
			Some(window) => window,
			None => {
				error!(%key, "No window to schedule a removal timer on. Removing immediately.");
				return removal();
			}
		};

		let timeout = Self::timeout_closure(Rc::downgrade(&self.state), key.clone());
		let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
		match window.set_timeout_with_callback_and_timeout_and_arguments_0(timeout.as_ref().unchecked_ref(), delay) {
			Ok(handle) => {
				trace!(%key, handle, "Scheduled removal.");
				self.state.borrow_mut().pending.insert(key, PendingRemoval { handle, removal, timeout });
			}
			Err(error) => {
				error!(%key, ?error, "Failed to schedule a removal timer. Removing immediately.");
				removal()
			}
		}
	}

	fn cancel(&mut self, key: &TaskKey) -> bool {
		let pending = self.state.borrow_mut().pending.remove(key);
		match pending {
			Some(pending) => {
				clear_timeout(pending.handle);
				trace!(%key, "Cancelled pending removal.");
				true
			}
			None => false,
		}
	}

	fn cancel_all(&mut self) {
		let mut state = self.state.borrow_mut();
		state.spent.clear();
		let pending: Vec<_> = state.pending.drain().collect();
		drop(state);

		if !pending.is_empty() {
			trace!("Cancelling {} pending removal(s).", pending.len());
		}
		for (_, pending) in pending {
			clear_timeout(pending.handle)
		}
	}

	fn pending(&self) -> usize {
		self.state.borrow().pending.len()
	}
}

impl Drop for TimeoutScheduler {
	fn drop(&mut self) {
		self.cancel_all()
	}
}

fn clear_timeout(handle: i32) {
	match web_sys::window() {
		Some(window) => window.clear_timeout_with_handle(handle),
		None => error!(handle, "No window to clear a removal timer on."),
	}
}
