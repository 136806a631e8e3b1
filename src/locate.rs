//! Finding rendered task elements by their [`TaskKey`].
//!
//! Renderers mark each task's root element with a [`TASK_KEY_ATTRIBUTE`] holding the task key.

use crate::snapshot::TaskKey;
use tracing::error;
use wasm_bindgen::JsCast;
use web_sys::{Element, NodeList};

/// Attribute naming the [`TaskKey`] a task element was rendered for.
pub const TASK_KEY_ATTRIBUTE: &str = "data-task-key";

/// Class marking an element whose removal transition is running.
pub const EXITING_CLASS: &str = "exiting";

/// An attribute selector matching exactly `key`, with quotes and backslashes escaped.
#[must_use]
pub fn task_selector(key: &TaskKey) -> String {
	let mut selector = String::with_capacity(key.as_str().len() + TASK_KEY_ATTRIBUTE.len() + 6);
	selector.push('[');
	selector.push_str(TASK_KEY_ATTRIBUTE);
	selector.push_str("=\"");
	for c in key.as_str().chars() {
		if matches!(c, '"' | '\\') {
			selector.push('\\');
		}
		selector.push(c);
	}
	selector.push_str("\"]");
	selector
}

/// The element rendered for `key` inside `container`, if any.
pub fn find_task_element(container: &Element, key: &TaskKey) -> Option<Element> {
	match container.query_selector(&task_selector(key)) {
		Ok(element) => element,
		Err(error) => {
			error!(%key, ?error, "Task element lookup failed.");
			None
		}
	}
}

/// The [`TASK_KEY_ATTRIBUTE`] values of all task elements inside `container`, in document order.
pub fn rendered_task_keys(container: &Element) -> Vec<String> {
	let elements: NodeList = match container.query_selector_all(&format!("[{}]", TASK_KEY_ATTRIBUTE)) {
		Ok(elements) => elements,
		Err(error) => {
			error!(?error, "Task element enumeration failed.");
			return Vec::new();
		}
	};

	(0..elements.length())
		.filter_map(|i| elements.item(i))
		.filter_map(|node| node.dyn_into::<Element>().ok())
		.filter_map(|element| element.get_attribute(TASK_KEY_ATTRIBUTE))
		.collect()
}
