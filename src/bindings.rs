//! The JavaScript-facing entry point a card's refresh routine drives.

use crate::{
	card::TaskListCard,
	changes::Changes,
	detect::PartialUpdatePolicy,
	dom::DomTaskList,
	patch::PatchHooks,
	snapshot::{Snapshot, TaskKey},
	timers::TimeoutScheduler,
};
use js_sys::{Function, Reflect, JSON};
use serde::Serialize;
use tracing::{error, warn};
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};

fn to_js(value: &impl Serialize) -> Result<JsValue, JsValue> {
	let json = serde_json::to_string(value).map_err(|error| JsValue::from_str(&format!("task-tracker-dom: Serialisation failed: {}", error)))?;
	JSON::parse(&json)
}

/// [`PatchHooks`] calling optional JavaScript functions with the serialised [`Changes`].
#[derive(Debug, Default)]
pub struct JsHooks {
	on_section_states: Option<Function>,
	on_task_updates: Option<Function>,
}

impl JsHooks {
	fn from_options(options: &JsValue) -> Self {
		let function = |name: &str| -> Option<Function> {
			if !options.is_object() {
				return None;
			}
			let value = Reflect::get(options, &JsValue::from_str(name)).ok()?;
			if value.is_undefined() || value.is_null() {
				return None;
			}
			match value.dyn_into::<Function>() {
				Ok(function) => Some(function),
				Err(value) => {
					warn!(name, ?value, "Ignoring hook option that isn't a function.");
					None
				}
			}
		};

		Self {
			on_section_states: function("on_section_states"),
			on_task_updates: function("on_task_updates"),
		}
	}

	fn call(name: &str, hook: Option<&Function>, changes: &Changes) {
		let hook = match hook {
			Some(hook) => hook,
			None => return,
		};
		let result = to_js(changes).and_then(|changes| hook.call1(&JsValue::UNDEFINED, &changes));
		if let Err(error) = result {
			error!(name, ?error, "Hook threw.");
		}
	}
}

impl PatchHooks for JsHooks {
	fn update_section_states(&mut self, changes: &Changes) {
		Self::call("on_section_states", self.on_section_states.as_ref(), changes)
	}

	fn update_task_elements(&mut self, changes: &Changes) {
		Self::call("on_task_updates", self.on_task_updates.as_ref(), changes)
	}
}

/// Drives the task list of one card.
///
/// ```js
/// const controller = new TaskListController(listElement, (plan) => renderTasks(plan), { removal_delay_ms: 300 });
/// controller.refresh(await fetchPlan()); // "unchanged", "patched", "full" or "failed"
/// // on disconnectedCallback:
/// controller.disconnect();
/// ```
#[wasm_bindgen]
pub struct TaskListController {
	card: TaskListCard<DomTaskList, TimeoutScheduler, JsHooks>,
}

#[wasm_bindgen]
impl TaskListController {
	/// `render` receives the plan object and returns the list markup.
	/// `options` may set `max_partial_changes`, `removal_delay_ms`, `on_section_states` and `on_task_updates`.
	///
	/// # Errors
	///
	/// Iff `options` is neither absent nor a valid options object.
	#[wasm_bindgen(constructor)]
	pub fn new(container: web_sys::Element, render: Function, options: JsValue) -> Result<TaskListController, JsValue> {
		let policy = if options.is_undefined() || options.is_null() {
			PartialUpdatePolicy::default()
		} else {
			let json = JSON::stringify(&options)?
				.as_string()
				.ok_or_else(|| JsValue::from_str("task-tracker-dom: Invalid options: not representable as JSON."))?;
			serde_json::from_str(&json).map_err(|error| JsValue::from_str(&format!("task-tracker-dom: Invalid options: {}", error)))?
		};
		let hooks = JsHooks::from_options(&options);

		let view = DomTaskList::new(
			container,
			Box::new(move |snapshot: &Snapshot| -> Result<String, JsValue> {
				let markup = render.call1(&JsValue::UNDEFINED, &to_js(snapshot)?)?;
				markup.as_string().ok_or_else(|| JsValue::from_str("task-tracker-dom: `render` must return a string."))
			}),
		);

		Ok(Self {
			card: TaskListCard::new(view, TimeoutScheduler::new(), hooks, policy),
		})
	}

	/// Updates the list for a freshly fetched plan object and returns how.
	///
	/// # Errors
	///
	/// Iff `snapshot` isn't a plan object.
	pub fn refresh(&mut self, snapshot: &JsValue) -> Result<String, JsValue> {
		let snapshot = Snapshot::from_js(snapshot)?;
		Ok(self.card.refresh(snapshot).as_str().to_owned())
	}

	/// The current data of the task rendered under `key`, or `undefined`.
	///
	/// # Errors
	///
	/// Iff the task can't be converted.
	#[wasm_bindgen(js_name = taskForKey)]
	pub fn task_for_key(&self, key: &str) -> Result<JsValue, JsValue> {
		let task = TaskKey::parse(key).and_then(|key| self.card.view().task(&key));
		match task {
			Some(task) => to_js(&task),
			None => Ok(JsValue::UNDEFINED),
		}
	}

	/// Forces the next refresh to render fully, for example after the card's config changed.
	pub fn invalidate(&mut self) {
		self.card.invalidate()
	}

	/// Drops pending removals. Call from the card's `disconnectedCallback`.
	pub fn disconnect(&mut self) {
		self.card.disconnect()
	}
}
