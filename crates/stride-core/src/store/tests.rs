use std::{sync::Arc, thread};

use jiff::{SignedDuration, Timestamp};
use tempfile::TempDir;

use super::*;

fn open_memory() -> (Arc<MemoryBackend>, EntityStore) {
    let backend = Arc::new(MemoryBackend::new());
    let store = EntityStore::open(Arc::clone(&backend)).unwrap();
    (backend, store)
}

fn step_at(goal_id: &str, text: &str, offset_secs: i64) -> Step {
    let mut step = Step::new(goal_id, text);
    step.created_at = Timestamp::from_second(1_700_000_000 + offset_secs).unwrap();
    step
}

#[test]
fn test_open_initializes_empty_collections() {
    let (backend, store) = open_memory();
    assert_eq!(backend.save_count(), 3);
    assert_eq!(backend.load_users().unwrap(), Some(Vec::new()));
    assert!(store.list_goals_for_user("anyone").is_empty());
}

#[test]
fn test_get_missing_is_not_found() {
    let (_backend, store) = open_memory();
    assert!(matches!(
        store.get_user("nobody"),
        Err(CoachError::NotFound { entity: "User", .. })
    ));
    assert!(matches!(
        store.get_goal("nothing"),
        Err(CoachError::NotFound { entity: "Goal", .. })
    ));
}

#[test]
fn test_create_twice_is_already_exists() {
    let (_backend, store) = open_memory();
    let user = User::new("u1", "Ann");
    store.create_user(user.clone()).unwrap();
    assert!(matches!(
        store.create_user(user),
        Err(CoachError::AlreadyExists { entity: "User", .. })
    ));
}

#[test]
fn test_update_missing_is_not_found() {
    let (_backend, store) = open_memory();
    let step = Step::new("g1", "orphan");
    assert!(matches!(
        store.update_step(step),
        Err(CoachError::NotFound { entity: "Step", .. })
    ));
}

#[test]
fn test_update_goal_stamps_updated_at() {
    let (_backend, store) = open_memory();
    let mut goal = Goal::new("u1", "Run", "Run a marathon");
    goal.created_at = Timestamp::from_second(1_600_000_000).unwrap();
    goal.updated_at = goal.created_at;
    store.create_goal(goal.clone()).unwrap();

    let stored = store.update_goal(goal.clone()).unwrap();
    assert!(stored.updated_at > goal.updated_at);
    assert_eq!(store.get_goal(&goal.id).unwrap().updated_at, stored.updated_at);
}

#[test]
fn test_failed_save_leaves_memory_unchanged() {
    let (backend, store) = open_memory();
    let goal = Goal::new("u1", "Write", "Write a short story");
    store.create_goal(goal.clone()).unwrap();

    backend.fail_writes(true);
    let mut renamed = goal.clone();
    renamed.title = "Changed".to_string();
    assert!(matches!(
        store.update_goal(renamed),
        Err(CoachError::Persistence { .. })
    ));
    assert!(store.create_goal(Goal::new("u1", "Other", "other")).is_err());

    assert_eq!(store.get_goal(&goal.id).unwrap().title, "Write");
    assert_eq!(store.list_goals_for_user("u1").len(), 1);
}

#[test]
fn test_list_goals_for_user_in_creation_order() {
    let (_backend, store) = open_memory();
    let mut titles = Vec::new();
    for (i, title) in ["first", "second", "third"].iter().enumerate() {
        let mut goal = Goal::new("u1", *title, *title);
        goal.created_at = Timestamp::from_second(1_700_000_000 - i as i64 * 60).unwrap();
        titles.push(goal.title.clone());
        store.create_goal(goal).unwrap();
    }
    store.create_goal(Goal::new("u2", "theirs", "theirs")).unwrap();

    let listed: Vec<String> = store
        .list_goals_for_user("u1")
        .into_iter()
        .map(|g| g.title)
        .collect();
    titles.reverse();
    assert_eq!(listed, titles);
}

#[test]
fn test_list_steps_oldest_first_and_empty_for_unknown_goal() {
    let (_backend, store) = open_memory();
    store.create_step(step_at("g1", "later", 20)).unwrap();
    store.create_step(step_at("g1", "earlier", 10)).unwrap();
    store.create_step(step_at("g2", "other goal", 0)).unwrap();

    let texts: Vec<String> = store
        .list_steps_for_goal("g1")
        .into_iter()
        .map(|s| s.text)
        .collect();
    assert_eq!(texts, ["earlier", "later"]);
    assert!(store.list_steps_for_goal("missing").is_empty());
}

#[test]
fn test_current_step_and_no_current_step() {
    let (_backend, store) = open_memory();
    assert!(matches!(
        store.current_step("g1"),
        Err(CoachError::NoCurrentStep { .. })
    ));

    let first = step_at("g1", "first", 0);
    let second = step_at("g1", "second", 1);
    store.create_step(first.clone()).unwrap();
    store.create_step(second.clone()).unwrap();
    assert_eq!(store.current_step("g1").unwrap().id, first.id);

    let done = store.complete_current_step("g1").unwrap();
    assert_eq!(done.id, first.id);
    assert!(done.is_completed());
    assert_eq!(store.current_step("g1").unwrap().id, second.id);

    store.complete_current_step("g1").unwrap();
    assert!(matches!(
        store.complete_current_step("g1"),
        Err(CoachError::NoCurrentStep { .. })
    ));
}

#[test]
fn test_delete_goal_cascades_to_steps() {
    let (backend, store) = open_memory();
    let goal = Goal::new("u1", "Garden", "Grow tomatoes");
    let keep = Goal::new("u1", "Keep", "Stays");
    store.create_goal(goal.clone()).unwrap();
    store.create_goal(keep.clone()).unwrap();
    for i in 0..3 {
        store.create_step(step_at(&goal.id, "s", i)).unwrap();
    }
    store.create_step(step_at(&keep.id, "kept", 0)).unwrap();

    let (deleted, removed) = store.delete_goal(&goal.id).unwrap();
    assert_eq!(deleted.id, goal.id);
    assert_eq!(removed, 3);
    assert!(store.get_goal(&goal.id).is_err());
    assert!(store.list_steps_for_goal(&goal.id).is_empty());
    assert_eq!(store.list_steps_for_goal(&keep.id).len(), 1);

    let persisted = backend.load_steps().unwrap().unwrap();
    assert_eq!(persisted.len(), 1);
    assert!(matches!(
        store.delete_goal(&goal.id),
        Err(CoachError::NotFound { entity: "Goal", .. })
    ));
}

#[test]
fn test_delete_goal_failing_step_save_keeps_goal_and_steps() {
    let (backend, store) = open_memory();
    let goal = Goal::new("u1", "Garden", "Grow tomatoes");
    store.create_goal(goal.clone()).unwrap();
    for i in 0..3 {
        store.create_step(step_at(&goal.id, "s", i)).unwrap();
    }

    backend.fail_step_writes(true);
    assert!(matches!(
        store.delete_goal(&goal.id),
        Err(CoachError::Persistence { .. })
    ));
    assert_eq!(store.get_goal(&goal.id).unwrap(), goal);
    assert_eq!(store.list_steps_for_goal(&goal.id).len(), 3);
    let durable_goals = backend.load_goals().unwrap().unwrap();
    assert!(durable_goals.iter().any(|g| g.id == goal.id));
    assert_eq!(backend.load_steps().unwrap().unwrap().len(), 3);

    backend.fail_step_writes(false);
    let (_, removed) = store.delete_goal(&goal.id).unwrap();
    assert_eq!(removed, 3);
    assert!(backend.load_goals().unwrap().unwrap().is_empty());
    assert!(backend.load_steps().unwrap().unwrap().is_empty());
}

#[test]
fn test_concurrent_writers_persist_every_record() {
    let (backend, store) = open_memory();

    thread::scope(|scope| {
        for worker in 0..8 {
            let store = &store;
            scope.spawn(move || {
                let goal = Goal::new("u1", format!("Goal {worker}"), "Keep going");
                store.create_goal(goal.clone()).unwrap();
                for i in 0..5 {
                    store.create_step(step_at(&goal.id, "s", i)).unwrap();
                }
            });
        }
    });

    let goals = store.list_goals_for_user("u1");
    assert_eq!(goals.len(), 8);
    let reopened = EntityStore::open(Arc::clone(&backend)).unwrap();
    assert_eq!(reopened.list_goals_for_user("u1"), goals);
    for goal in &goals {
        let steps = store.list_steps_for_goal(&goal.id);
        assert_eq!(steps.len(), 5);
        assert_eq!(reopened.list_steps_for_goal(&goal.id), steps);
    }
}

#[test]
fn test_racing_completions_finish_each_step_once() {
    let (_backend, store) = open_memory();
    for i in 0..3 {
        store.create_step(step_at("g1", "s", i)).unwrap();
    }

    let outcomes: Vec<Result<Step>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| store.complete_current_step("g1")))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut completed: Vec<String> = outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().ok().map(|step| step.id.clone()))
        .collect();
    completed.sort();
    completed.dedup();
    assert_eq!(completed.len(), 3);
    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 3);
    assert!(outcomes
        .iter()
        .filter_map(|o| o.as_ref().err())
        .all(|e| matches!(e, CoachError::NoCurrentStep { .. })));
    assert!(store.list_steps_for_goal("g1").iter().all(Step::is_completed));
}

#[test]
fn test_reopen_from_seeded_backend() {
    let user = User::new("u1", "Ann");
    let goal = Goal::new("u1", "Bake", "Bake bread");
    let step = Step::new(&goal.id, "Buy flour");
    let backend =
        MemoryBackend::with_snapshot(vec![user.clone()], vec![goal.clone()], vec![step.clone()]);

    let store = EntityStore::open(backend).unwrap();
    assert_eq!(store.get_user("u1").unwrap(), user);
    assert_eq!(store.get_goal(&goal.id).unwrap(), goal);
    assert_eq!(store.current_step(&goal.id).unwrap(), step);
}

#[test]
fn test_json_backend_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let mut goal = Goal::new("u1", "Swim", "Swim 1 km");
    goal.add_clarification("Level?", "Beginner");
    let mut step = Step::new(&goal.id, "Find a pool");
    step.created_at = step
        .created_at
        .checked_add(SignedDuration::from_nanos(1))
        .unwrap();
    step.rephrase("Find an indoor pool", "It is winter");

    {
        let store = EntityStore::open(JsonFileBackend::new(temp_dir.path()).unwrap()).unwrap();
        store.create_user(User::new("u1", "Ann")).unwrap();
        store.create_goal(goal.clone()).unwrap();
        store.create_step(step.clone()).unwrap();
    }

    for file in ["users.json", "goals.json", "steps.json"] {
        assert!(temp_dir.path().join(file).exists(), "{file} missing");
    }

    let store = EntityStore::open(JsonFileBackend::new(temp_dir.path()).unwrap()).unwrap();
    assert_eq!(store.get_goal(&goal.id).unwrap(), goal);
    assert_eq!(store.get_step(&step.id).unwrap(), step);
    assert_eq!(store.get_user("u1").unwrap().display_name, "Ann");
}

#[test]
fn test_json_backend_rejects_corrupt_file() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("goals.json"), "[{ not json").unwrap();
    let result = EntityStore::open(JsonFileBackend::new(temp_dir.path()).unwrap());
    assert!(matches!(result, Err(CoachError::Persistence { .. })));
}
