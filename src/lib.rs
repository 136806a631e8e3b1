#![doc(html_root_url = "https://docs.rs/task-tracker-dom/0.0.1")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod bindings;
pub mod card;
pub mod changes;
pub mod detect;
pub mod dom;
pub mod locate;
pub mod lookup;
pub mod patch;
pub mod snapshot;
pub mod timers;

pub use card::{RenderOutcome, TaskListCard};
pub use changes::{identify_changes, Changes};
pub use detect::{ChangeDetector, PartialUpdatePolicy};
pub use patch::{PatchApplier, PatchHooks, RemovalScheduler, TaskListView};
pub use snapshot::{SectionKind, Snapshot, Task, TaskId, TaskKey, TaskWindow, UserContext};
