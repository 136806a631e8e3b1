//! The plan data a task list card renders, as returned by the host's recommendation service.
//!
//! Only the fields that take part in change detection are modelled. Unknown fields in the service response are ignored.

use core::fmt::{self, Display, Formatter};
use serde::{Deserialize, Deserializer, Serialize};
use wasm_bindgen::JsValue;

/// `null` decodes like a missing field.
fn null_as_default<'de, D: Deserializer<'de>, T: Default + Deserialize<'de>>(deserializer: D) -> Result<T, D::Error> {
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One fetched plan: two task sections plus the context they were computed in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
	/// Whether the host fell back to its reduced "defaults" plan, which renders with a different structure.
	#[serde(default, deserialize_with = "null_as_default")]
	pub using_defaults: bool,
	#[serde(default)]
	pub user_context: Option<UserContext>,
	/// [`None`] if the section was missing from the response, which is distinct from an empty section.
	///
	/// All comparisons in this crate treat a missing section like an empty one.
	#[serde(default)]
	pub self_care: Option<Vec<Task>>,
	#[serde(default)]
	pub tasks: Option<Vec<Task>>,
}

impl Snapshot {
	/// Parses a service response body.
	///
	/// # Errors
	///
	/// Iff `json` isn't a plan object.
	pub fn from_json(json: &str) -> serde_json::Result<Self> {
		serde_json::from_str(json)
	}

	/// Converts a plan object received from JavaScript.
	///
	/// # Errors
	///
	/// Iff `value` can't be serialised to JSON or isn't a plan object (`undefined` included).
	/// The error is a JavaScript string suitable for throwing.
	pub fn from_js(value: &JsValue) -> Result<Self, JsValue> {
		let json = js_sys::JSON::stringify(value)?
			.as_string()
			.ok_or_else(|| JsValue::from_str("task-tracker-dom: Invalid snapshot: not representable as JSON."))?;
		Self::from_json(&json).map_err(|error| JsValue::from_str(&format!("task-tracker-dom: Invalid snapshot: {}", error)))
	}

	/// The tasks of `section`, empty if the section is missing.
	#[must_use]
	pub fn section(&self, section: SectionKind) -> &[Task] {
		match section {
			SectionKind::SelfCare => self.self_care.as_deref(),
			SectionKind::Task => self.tasks.as_deref(),
		}
		.unwrap_or_default()
	}

	/// Iterates over all tasks of both sections together with the section each is listed in.
	pub fn iter_sections(&self) -> impl Iterator<Item = (SectionKind, &Task)> {
		SectionKind::ALL.into_iter().flat_map(move |section| self.section(section).iter().map(move |task| (section, task)))
	}

	/// Iterates over the keys under which this snapshot's tasks are rendered.
	pub fn task_keys(&self) -> impl Iterator<Item = TaskKey> + '_ {
		self.iter_sections().map(|(section, task)| TaskKey::new(section, &task.id))
	}
}

/// The user's date/time settings the host bucketed due dates with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
	#[serde(default)]
	pub timezone: Option<String>,
	#[serde(default)]
	pub daily_reset_time: Option<String>,
	#[serde(default)]
	pub current_logical_date: Option<String>,
}

/// A task's identity. The host uses integers, but strings are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
	Number(i64),
	Text(String),
}

impl Display for TaskId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			TaskId::Number(number) => Display::fmt(number, f),
			TaskId::Text(text) => f.write_str(text),
		}
	}
}

impl From<i64> for TaskId {
	fn from(number: i64) -> Self {
		Self::Number(number)
	}
}

impl From<i32> for TaskId {
	fn from(number: i32) -> Self {
		Self::Number(number.into())
	}
}

impl From<&str> for TaskId {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

/// The part of a task entity that is relevant to diffing.
///
/// Optional fields stay optional: a missing `completed` is not the same value as `false` to [`task_equals`](`crate::detect::task_equals`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
	pub id: TaskId,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub completed: Option<bool>,
	#[serde(default)]
	pub outstanding_occurrences: Option<i64>,
	#[serde(default)]
	pub required_occurrences: Option<i64>,
	#[serde(default)]
	pub recommendation_score: Option<f64>,
	#[serde(default)]
	pub task_nudges: Option<Vec<serde_json::Value>>,
	#[serde(default)]
	pub windows: Option<Vec<TaskWindow>>,
	/// The host's entity type name, for example `"SelfCareTask"`.
	#[serde(default)]
	pub task_type: Option<String>,
}

impl Task {
	/// A task with only its identity set.
	#[must_use]
	pub fn new(id: impl Into<TaskId>) -> Self {
		Self {
			id: id.into(),
			name: None,
			completed: None,
			outstanding_occurrences: None,
			required_occurrences: None,
			recommendation_score: None,
			task_nudges: None,
			windows: None,
			task_type: None,
		}
	}

	#[must_use]
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	#[must_use]
	pub fn with_completed(mut self, completed: bool) -> Self {
		self.completed = Some(completed);
		self
	}

	#[must_use]
	pub fn with_windows(mut self, windows: Vec<TaskWindow>) -> Self {
		self.windows = Some(windows);
		self
	}
}

/// A schedulable time slot of a task ("Morning", "Evening", …), each completed separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskWindow {
	#[serde(default, deserialize_with = "null_as_default")]
	pub completed: bool,
	#[serde(default, deserialize_with = "null_as_default")]
	pub label: String,
	#[serde(default)]
	pub start: Option<String>,
	#[serde(default)]
	pub end: Option<String>,
}

impl TaskWindow {
	#[must_use]
	pub fn new(label: impl Into<String>, completed: bool) -> Self {
		Self {
			completed,
			label: label.into(),
			start: None,
			end: None,
		}
	}
}

/// One of the two categorical task groupings of a [`Snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
	SelfCare,
	Task,
}

impl SectionKind {
	pub const ALL: [SectionKind; 2] = [SectionKind::SelfCare, SectionKind::Task];

	/// The prefix used in [`TaskKey`]s.
	///
	/// Note the asymmetric naming: the host's `"SelfCareTask"` entities are listed under `self_care`.
	#[must_use]
	pub fn as_key(self) -> &'static str {
		match self {
			Self::SelfCare => "self_care",
			Self::Task => "task",
		}
	}
}

impl Display for SectionKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_key())
	}
}

/// `"{section}_{id}"`: the key a task's rendered element and lookup entry are stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskKey(String);

impl TaskKey {
	#[must_use]
	pub fn new(section: SectionKind, id: &TaskId) -> Self {
		Self(format!("{}_{}", section.as_key(), id))
	}

	/// Accepts a key read back from a rendered element, if it has a known section prefix.
	#[must_use]
	pub fn parse(key: &str) -> Option<Self> {
		SectionKind::ALL
			.into_iter()
			.any(|section| key.strip_prefix(section.as_key()).map_or(false, |rest| rest.len() > 1 && rest.starts_with('_')))
			.then(|| Self(key.to_owned()))
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for TaskKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
