use crate::{
	changes::Changes,
	locate::{find_task_element, rendered_task_keys, EXITING_CLASS},
	lookup::TaskLookup,
	patch::TaskListView,
	snapshot::{Snapshot, Task, TaskKey},
};
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
};
use std::rc::Rc;
use tracing::{error, instrument, trace, trace_span, warn};
use wasm_bindgen::JsValue;

/// Produces a card's list markup for a snapshot. Every task's root element must carry its [`TaskKey`] in
/// [`TASK_KEY_ATTRIBUTE`](`crate::locate::TASK_KEY_ATTRIBUTE`).
pub type RenderFn = Box<dyn FnMut(&Snapshot) -> Result<String, JsValue>>;

/// A [`TaskListView`] over the child nodes of a container element.
pub struct DomTaskList {
	container: web_sys::Element,
	render: RenderFn,
	lookup: Rc<RefCell<TaskLookup>>,
}

impl Debug for DomTaskList {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("DomTaskList")
			.field("container", &self.container)
			.field("lookup", &self.lookup)
			.finish_non_exhaustive()
	}
}

impl DomTaskList {
	#[must_use]
	pub fn new(container: web_sys::Element, render: RenderFn) -> Self {
		Self {
			container,
			render,
			lookup: Rc::default(),
		}
	}

	#[must_use]
	pub fn container(&self) -> &web_sys::Element {
		&self.container
	}

	/// The task a rendered element's key currently resolves to, for use in event handlers.
	#[must_use]
	pub fn task(&self, key: &TaskKey) -> Option<Task> {
		self.lookup.borrow().get(key).cloned()
	}
}

impl TaskListView for DomTaskList {
	fn mark_exiting(&mut self, key: &TaskKey) -> bool {
		match find_task_element(&self.container, key) {
			Some(element) => {
				if let Err(error) = element.class_list().add_1(EXITING_CLASS) {
					warn!(%key, ?error, "Failed to mark task element as exiting.");
				}
				true
			}
			None => false,
		}
	}

	fn removal(&self, key: &TaskKey) -> Box<dyn FnOnce()> {
		let element = find_task_element(&self.container, key);
		let lookup = Rc::downgrade(&self.lookup);
		let key = key.clone();
		Box::new(move || {
			let span = trace_span!("Deferred removal", %key);
			let _enter = span.enter();
			match element {
				Some(element) => element.remove(),
				None => warn!("Task element was already gone."),
			}
			if let Some(lookup) = lookup.upgrade() {
				if lookup.borrow_mut().release(&key).is_none() {
					trace!("No task data to release.");
				}
			}
		})
	}

	fn update_data(&mut self, changes: &Changes) {
		self.lookup.borrow_mut().apply_updates(changes)
	}

	#[instrument(skip(self, snapshot))]
	fn render_full(&mut self, snapshot: &Snapshot) -> bool {
		let markup = match (self.render)(snapshot) {
			Ok(markup) => markup,
			Err(error) => {
				error!(?error, "Rendering failed. Keeping the previous markup.");
				return false;
			}
		};
		self.container.set_inner_html(&markup);
		self.lookup.borrow_mut().rebuild(snapshot);

		let rendered = rendered_task_keys(&self.container).len();
		let expected = self.lookup.borrow().len();
		if rendered != expected {
			warn!(
				rendered,
				expected, "Rendered task element count doesn't match the snapshot. Elements without a task key can't be patched."
			);
		}
		true
	}
}
