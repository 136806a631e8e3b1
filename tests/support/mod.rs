#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};
use task_tracker_dom::{Changes, PatchHooks, RemovalScheduler, Snapshot, TaskKey, TaskListView};

/// Everything a [`FakeView`] was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
	Exiting(String),
	Removed(String),
	DataUpdated(usize),
	FullRender(usize),
}

/// A rendered list kept as a set of keys.
#[derive(Debug, Clone, Default)]
pub struct FakeView {
	pub rendered: Rc<RefCell<Vec<String>>>,
	pub events: Rc<RefCell<Vec<ViewEvent>>>,
	pub fail_renders: bool,
}

impl FakeView {
	pub fn with_rendered(snapshot: &Snapshot) -> Self {
		let view = Self::default();
		*view.rendered.borrow_mut() = snapshot.task_keys().map(|key| key.to_string()).collect();
		view
	}

	pub fn events(&self) -> Vec<ViewEvent> {
		self.events.borrow().clone()
	}

	pub fn rendered(&self) -> Vec<String> {
		self.rendered.borrow().clone()
	}
}

impl TaskListView for FakeView {
	fn mark_exiting(&mut self, key: &TaskKey) -> bool {
		let found = self.rendered.borrow().iter().any(|rendered| rendered == key.as_str());
		if found {
			self.events.borrow_mut().push(ViewEvent::Exiting(key.to_string()));
		}
		found
	}

	fn removal(&self, key: &TaskKey) -> Box<dyn FnOnce()> {
		let rendered = Rc::clone(&self.rendered);
		let events = Rc::clone(&self.events);
		let key = key.to_string();
		Box::new(move || {
			rendered.borrow_mut().retain(|rendered| *rendered != key);
			events.borrow_mut().push(ViewEvent::Removed(key));
		})
	}

	fn update_data(&mut self, changes: &Changes) {
		self.events.borrow_mut().push(ViewEvent::DataUpdated(changes.updated().count()));
	}

	fn render_full(&mut self, snapshot: &Snapshot) -> bool {
		if self.fail_renders {
			return false;
		}
		let keys: Vec<_> = snapshot.task_keys().map(|key| key.to_string()).collect();
		self.events.borrow_mut().push(ViewEvent::FullRender(keys.len()));
		*self.rendered.borrow_mut() = keys;
		true
	}
}

struct Pending {
	key: TaskKey,
	delay_ms: u32,
	removal: Box<dyn FnOnce()>,
}

/// A [`RemovalScheduler`] whose timers only fire when told to.
#[derive(Clone, Default)]
pub struct ManualScheduler {
	pending: Rc<RefCell<Vec<Pending>>>,
}

impl ManualScheduler {
	pub fn pending_keys(&self) -> Vec<String> {
		self.pending.borrow().iter().map(|pending| pending.key.to_string()).collect()
	}

	pub fn delays(&self) -> Vec<u32> {
		self.pending.borrow().iter().map(|pending| pending.delay_ms).collect()
	}

	/// Runs all pending removals as if their timers elapsed.
	pub fn fire_all(&self) {
		let pending: Vec<_> = self.pending.borrow_mut().drain(..).collect();
		for pending in pending {
			(pending.removal)()
		}
	}
}

impl RemovalScheduler for ManualScheduler {
	fn schedule(&mut self, key: TaskKey, delay_ms: u32, removal: Box<dyn FnOnce()>) {
		self.cancel(&key);
		self.pending.borrow_mut().push(Pending { key, delay_ms, removal });
	}

	fn cancel(&mut self, key: &TaskKey) -> bool {
		let mut pending = self.pending.borrow_mut();
		let before = pending.len();
		pending.retain(|pending| pending.key != *key);
		pending.len() != before
	}

	fn cancel_all(&mut self) {
		self.pending.borrow_mut().clear()
	}

	fn pending(&self) -> usize {
		self.pending.borrow().len()
	}
}

/// [`PatchHooks`] counting their calls.
#[derive(Debug, Default)]
pub struct CountingHooks {
	pub section_states: usize,
	pub task_elements: usize,
}

impl PatchHooks for CountingHooks {
	fn update_section_states(&mut self, _changes: &Changes) {
		self.section_states += 1
	}

	fn update_task_elements(&mut self, _changes: &Changes) {
		self.task_elements += 1
	}
}
