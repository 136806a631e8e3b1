mod support;

use support::{CountingHooks, FakeView, ManualScheduler, ViewEvent};
use task_tracker_dom::{
	identify_changes, Changes, PartialUpdatePolicy, PatchApplier, RemovalScheduler, RenderOutcome, Snapshot, Task, TaskListCard, UserContext,
};

fn tasks(ids: &[i64]) -> Option<Vec<Task>> {
	Some(ids.iter().map(|&id| Task::new(id)).collect())
}

fn snapshot(self_care: &[i64], task_ids: &[i64]) -> Snapshot {
	Snapshot {
		self_care: tasks(self_care),
		tasks: tasks(task_ids),
		..Snapshot::default()
	}
}

fn card(scheduler: &ManualScheduler) -> TaskListCard<FakeView, ManualScheduler, CountingHooks> {
	TaskListCard::new(FakeView::default(), scheduler.clone(), CountingHooks::default(), PartialUpdatePolicy::default())
}

#[test]
fn removals_are_marked_then_deferred() {
	let old = snapshot(&[1, 2], &[3]);
	let mut view = FakeView::with_rendered(&old);
	let scheduler = ManualScheduler::default();
	let mut applier = PatchApplier::new(scheduler.clone(), 300);
	let mut hooks = CountingHooks::default();

	let changes = Changes {
		removed_self_care_tasks: vec![Task::new(2)],
		removed_tasks: vec![Task::new(3)],
		updated_tasks: vec![Task::new(1).with_name("Renamed")],
		..Changes::default()
	};
	assert!(applier.apply_partial_updates(&changes, &mut view, &mut hooks));

	assert_eq!(hooks.section_states, 1);
	assert_eq!(hooks.task_elements, 1);
	assert_eq!(scheduler.pending_keys(), ["self_care_2", "task_3"]);
	assert_eq!(scheduler.delays(), [300, 300]);
	assert_eq!(view.rendered(), ["self_care_1", "self_care_2", "task_3"]);
	assert_eq!(
		view.events(),
		[ViewEvent::Exiting("self_care_2".to_owned()), ViewEvent::Exiting("task_3".to_owned()), ViewEvent::DataUpdated(1)]
	);

	scheduler.fire_all();
	assert_eq!(view.rendered(), ["self_care_1"]);
	assert_eq!(scheduler.pending(), 0);
}

#[test]
fn additions_force_fallback() {
	let old = snapshot(&[1, 2], &[3]);
	let mut view = FakeView::with_rendered(&old);
	let scheduler = ManualScheduler::default();
	let mut applier = PatchApplier::new(scheduler.clone(), 300);

	for changes in [
		Changes {
			added_tasks: vec![Task::new(9)],
			removed_tasks: vec![Task::new(3)],
			updated_self_care_tasks: vec![Task::new(1).with_completed(true)],
			..Changes::default()
		},
		Changes {
			added_self_care_tasks: vec![Task::new(8)],
			..Changes::default()
		},
	] {
		let mut hooks = CountingHooks::default();
		assert!(!applier.apply_partial_updates(&changes, &mut view, &mut hooks));
		assert_eq!(hooks.section_states, 1);
		assert_eq!(hooks.task_elements, 0);
	}

	// Removals are still started before the fallback is reported.
	assert_eq!(scheduler.pending_keys(), ["task_3"]);
	assert!(!view.events().contains(&ViewEvent::DataUpdated(1)));
}

#[test]
fn missing_elements_are_skipped() {
	let mut view = FakeView::default();
	let scheduler = ManualScheduler::default();
	let mut applier = PatchApplier::new(scheduler.clone(), 300);
	let mut hooks = CountingHooks::default();

	let changes = Changes {
		removed_tasks: vec![Task::new(3)],
		..Changes::default()
	};
	assert!(applier.apply_partial_updates(&changes, &mut view, &mut hooks));
	assert_eq!(scheduler.pending(), 0);
	assert_eq!(hooks.section_states, 1);
}

#[test]
fn first_refresh_renders_fully() {
	let scheduler = ManualScheduler::default();
	let mut card = card(&scheduler);

	assert_eq!(card.refresh(snapshot(&[1], &[2, 3])), RenderOutcome::FullRender);
	assert_eq!(card.view().rendered(), ["self_care_1", "task_2", "task_3"]);
	assert_eq!(card.previous(), Some(&snapshot(&[1], &[2, 3])));
}

#[test]
fn same_snapshot_is_unchanged() {
	let scheduler = ManualScheduler::default();
	let mut card = card(&scheduler);

	card.refresh(snapshot(&[1], &[2, 3]));
	assert_eq!(card.refresh(snapshot(&[1], &[2, 3])), RenderOutcome::Unchanged);
	assert_eq!(card.view().events(), [ViewEvent::FullRender(3)]);
	assert_eq!(card.hooks().section_states, 0);
}

#[test]
fn rapid_completions_are_patched() {
	let scheduler = ManualScheduler::default();
	let mut card = card(&scheduler);

	card.refresh(snapshot(&[1, 2], &[3, 4, 5]));
	assert_eq!(card.refresh(snapshot(&[1, 2], &[4, 5])), RenderOutcome::Patched);
	assert_eq!(card.refresh(snapshot(&[2], &[5])), RenderOutcome::Patched);
	assert_eq!(scheduler.pending_keys(), ["task_3", "self_care_1", "task_4"]);
	assert_eq!(card.hooks().section_states, 2);

	scheduler.fire_all();
	assert_eq!(card.view().rendered(), ["self_care_2", "task_5"]);
	assert_eq!(card.previous(), Some(&snapshot(&[2], &[5])));
}

#[test]
fn updates_are_patched() {
	let scheduler = ManualScheduler::default();
	let mut card = card(&scheduler);

	card.refresh(Snapshot {
		tasks: Some(vec![Task::new(2).with_name("Old"), Task::new(3)]),
		..Snapshot::default()
	});
	let outcome = card.refresh(Snapshot {
		tasks: Some(vec![Task::new(2).with_name("New"), Task::new(3)]),
		..Snapshot::default()
	});
	assert_eq!(outcome, RenderOutcome::Patched);
	assert_eq!(card.hooks().task_elements, 1);
	assert_eq!(card.view().events().last(), Some(&ViewEvent::DataUpdated(1)));
}

#[test]
fn too_many_changes_render_fully() {
	let scheduler = ManualScheduler::default();
	let mut card = card(&scheduler);

	card.refresh(snapshot(&[9], &[1, 2, 3, 4, 5]));
	assert_eq!(card.refresh(snapshot(&[9], &[5])), RenderOutcome::FullRender);
	assert_eq!(scheduler.pending(), 0);
	assert_eq!(card.hooks().section_states, 0);
}

#[test]
fn structural_changes_render_fully() {
	let scheduler = ManualScheduler::default();
	let mut card = card(&scheduler);
	let base = Snapshot {
		user_context: Some(UserContext {
			timezone: Some("Europe/Berlin".to_owned()),
			daily_reset_time: Some("04:00".to_owned()),
			current_logical_date: Some("2024-05-01".to_owned()),
		}),
		..snapshot(&[1], &[2])
	};

	card.refresh(base.clone());
	let next_day = Snapshot {
		user_context: Some(UserContext {
			current_logical_date: Some("2024-05-02".to_owned()),
			..base.user_context.clone().unwrap()
		}),
		..base.clone()
	};
	assert_eq!(card.refresh(next_day.clone()), RenderOutcome::FullRender);
	assert_eq!(card.refresh(Snapshot { using_defaults: true, ..next_day.clone() }), RenderOutcome::FullRender);
	assert_eq!(card.refresh(Snapshot { using_defaults: true, self_care: None, ..next_day }), RenderOutcome::FullRender);
}

#[test]
fn reappearing_task_cancels_its_removal() {
	let scheduler = ManualScheduler::default();
	let mut card = card(&scheduler);

	card.refresh(snapshot(&[1], &[2, 3]));
	assert_eq!(card.refresh(snapshot(&[1], &[2])), RenderOutcome::Patched);
	assert_eq!(scheduler.pending_keys(), ["task_3"]);

	// Task 3 comes back before its removal timer fired.
	assert_eq!(card.refresh(snapshot(&[1], &[2, 3])), RenderOutcome::FullRender);
	assert_eq!(scheduler.pending(), 0);
	scheduler.fire_all();
	assert_eq!(card.view().rendered(), ["self_care_1", "task_2", "task_3"]);
}

#[test]
fn failed_render_keeps_baseline() {
	let scheduler = ManualScheduler::default();
	let view = FakeView {
		fail_renders: true,
		..FakeView::default()
	};
	let mut card = TaskListCard::new(view, scheduler, CountingHooks::default(), PartialUpdatePolicy::default());

	assert_eq!(card.refresh(snapshot(&[1], &[2])), RenderOutcome::Failed);
	assert_eq!(card.previous(), None);
}

#[test]
fn disconnect_drops_pending_removals() {
	let scheduler = ManualScheduler::default();
	let mut card = card(&scheduler);

	card.refresh(snapshot(&[1], &[2, 3]));
	card.refresh(snapshot(&[1], &[2]));
	assert_eq!(scheduler.pending(), 1);

	card.disconnect();
	assert_eq!(scheduler.pending(), 0);
	assert_eq!(card.previous(), None);
	assert_eq!(card.refresh(snapshot(&[1], &[2])), RenderOutcome::FullRender);
}

#[test]
fn custom_policy_is_used() {
	let scheduler = ManualScheduler::default();
	let policy = PartialUpdatePolicy {
		max_partial_changes: 1,
		removal_delay_ms: 150,
	};
	let mut card = TaskListCard::new(FakeView::default(), scheduler.clone(), CountingHooks::default(), policy);

	card.refresh(snapshot(&[1], &[2, 3, 4]));
	assert_eq!(card.refresh(snapshot(&[1], &[2, 3])), RenderOutcome::Patched);
	assert_eq!(scheduler.delays(), [150]);
	assert_eq!(card.refresh(snapshot(&[1], &[3, 5])), RenderOutcome::FullRender);
}

#[test]
fn policy_reads_from_card_options() {
	let policy: PartialUpdatePolicy = serde_json::from_str(r#"{ "removal_delay_ms": 500, "title": "Chores" }"#).unwrap();
	assert_eq!(policy.removal_delay_ms, 500);
	assert_eq!(policy.max_partial_changes, PartialUpdatePolicy::DEFAULT_MAX_PARTIAL_CHANGES);
}

#[test]
fn identical_snapshots_have_no_changes() {
	let snapshot = Snapshot::from_json(
		r#"{
			"self_care": [{ "id": 1, "windows": [{ "label": "Morning", "completed": false }] }],
			"tasks": [{ "id": 2, "task_nudges": [{ "text": "Overdue" }] }]
		}"#,
	)
	.unwrap();
	assert!(identify_changes(&snapshot, &snapshot.clone()).is_empty());
}

#[test]
fn invalidate_forces_full_render() {
	let scheduler = ManualScheduler::default();
	let mut card = card(&scheduler);

	card.refresh(snapshot(&[1], &[2]));
	card.invalidate();
	assert_eq!(card.previous(), None);
	assert_eq!(card.refresh(snapshot(&[1], &[2])), RenderOutcome::FullRender);
	assert_eq!(card.view().events(), [ViewEvent::FullRender(2), ViewEvent::FullRender(2)]);
}
