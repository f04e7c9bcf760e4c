//! Integration tests for goal, task, and subtask CRUD operations.
//!
//! Each test runs against its own temporary database inside the shared
//! PostgreSQL instance provided by `execplan-test-utils`.

use execplan_db::models::TaskStatus;
use execplan_db::pool;
use execplan_db::queries::tasks::CompletionOutcome;
use execplan_db::queries::{goals, subtasks, tasks};
use execplan_test_utils::{TestDb, seed_goal};

fn titles(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// -----------------------------------------------------------------------
// Goals
// -----------------------------------------------------------------------

#[tokio::test]
async fn insert_and_get_goal() {
    let db = TestDb::new().await;

    let goal = goals::insert_goal(&db.pool, "Learn guitar")
        .await
        .expect("insert_goal should succeed");
    assert_eq!(goal.title, "Learn guitar");

    let fetched = goals::get_goal(&db.pool, goal.id)
        .await
        .unwrap()
        .expect("goal should exist");
    assert_eq!(fetched.id, goal.id);
    assert_eq!(fetched.title, "Learn guitar");

    let tree = goals::get_goal_tree(&db.pool, goal.id)
        .await
        .unwrap()
        .expect("goal tree should exist");
    assert!(tree.tasks.is_empty());

    db.teardown().await;
}

#[tokio::test]
async fn goal_ids_are_unique() {
    let db = TestDb::new().await;

    let a = goals::insert_goal(&db.pool, "same title").await.unwrap();
    let b = goals::insert_goal(&db.pool, "same title").await.unwrap();
    assert_ne!(a.id, b.id);

    db.teardown().await;
}

#[tokio::test]
async fn get_missing_goal_returns_none() {
    let db = TestDb::new().await;

    assert!(goals::get_goal(&db.pool, 424242).await.unwrap().is_none());
    assert!(goals::get_goal_tree(&db.pool, 424242).await.unwrap().is_none());

    db.teardown().await;
}

#[tokio::test]
async fn list_goal_trees_attaches_children_in_order() {
    let db = TestDb::new().await;

    let (first, _, _) = seed_goal(
        &db.pool,
        "Learn guitar",
        &["Buy a guitar", "Learn basic chords"],
        &["Research models", "Visit a store"],
    )
    .await;
    let (second, _, _) = seed_goal(&db.pool, "Run a marathon", &[], &[]).await;

    let trees = goals::list_goal_trees(&db.pool).await.unwrap();
    assert_eq!(trees.len(), 2);
    assert_eq!(trees[0].goal.id, first.id);
    assert_eq!(trees[1].goal.id, second.id);

    let task_titles: Vec<&str> = trees[0].tasks.iter().map(|t| t.task.title.as_str()).collect();
    assert_eq!(task_titles, ["Buy a guitar", "Learn basic chords"]);
    for task in &trees[0].tasks {
        let sub_titles: Vec<&str> = task.subtasks.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(sub_titles, ["Research models", "Visit a store"]);
        assert!(task.subtasks.iter().all(|s| s.task_id == task.task.id));
    }
    assert!(trees[1].tasks.is_empty());

    db.teardown().await;
}

#[tokio::test]
async fn delete_goal_removes_whole_tree() {
    let db = TestDb::new().await;

    let (doomed, doomed_tasks, _) =
        seed_goal(&db.pool, "Doomed", &["a", "b"], &["x", "y", "z"]).await;
    let (kept, _, _) = seed_goal(&db.pool, "Kept", &["c"], &["w"]).await;

    let deleted = goals::delete_goal(&db.pool, doomed.id).await.unwrap();
    assert!(deleted);

    assert!(goals::get_goal(&db.pool, doomed.id).await.unwrap().is_none());
    for task in &doomed_tasks {
        assert!(tasks::get_task(&db.pool, task.id).await.unwrap().is_none());
        assert_eq!(subtasks::count_subtasks(&db.pool, task.id).await.unwrap(), 0);
    }

    let trees = goals::list_goal_trees(&db.pool).await.unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].goal.id, kept.id);
    assert_eq!(trees[0].tasks.len(), 1);
    assert_eq!(trees[0].tasks[0].subtasks.len(), 1);

    let counts = pool::table_counts(&db.pool).await.unwrap();
    assert_eq!(
        counts,
        vec![
            ("goals".to_string(), 1),
            ("tasks".to_string(), 1),
            ("subtasks".to_string(), 1),
        ]
    );

    db.teardown().await;
}

#[tokio::test]
async fn delete_missing_goal_changes_nothing() {
    let db = TestDb::new().await;

    seed_goal(&db.pool, "Untouched", &["a"], &["x"]).await;

    let deleted = goals::delete_goal(&db.pool, 999_999).await.unwrap();
    assert!(!deleted);

    let trees = goals::list_goal_trees(&db.pool).await.unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].tasks.len(), 1);

    db.teardown().await;
}

// -----------------------------------------------------------------------
// Tasks
// -----------------------------------------------------------------------

#[tokio::test]
async fn inserted_tasks_start_pending() {
    let db = TestDb::new().await;

    let goal = goals::insert_goal(&db.pool, "Learn guitar").await.unwrap();
    let inserted = tasks::insert_tasks(
        &db.pool,
        goal.id,
        &titles(&["Buy a guitar", "Learn basic chords"]),
    )
    .await
    .unwrap();

    assert_eq!(inserted.len(), 2);
    for task in &inserted {
        assert_eq!(task.goal_id, goal.id);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.time_spent, 0);
        assert!(task.problems.is_none());
        assert!(task.insights.is_none());
        assert!(task.completed_at.is_none());
    }

    let listed = tasks::list_tasks_for_goal(&db.pool, goal.id).await.unwrap();
    let listed_titles: Vec<&str> = listed.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(listed_titles, ["Buy a guitar", "Learn basic chords"]);

    db.teardown().await;
}

#[tokio::test]
async fn insert_tasks_with_empty_list_is_noop() {
    let db = TestDb::new().await;

    let goal = goals::insert_goal(&db.pool, "Nothing yet").await.unwrap();
    let inserted = tasks::insert_tasks(&db.pool, goal.id, &[]).await.unwrap();
    assert!(inserted.is_empty());

    db.teardown().await;
}

#[tokio::test]
async fn insert_tasks_for_missing_goal_fails() {
    let db = TestDb::new().await;

    let result = tasks::insert_tasks(&db.pool, 31337, &titles(&["orphan"])).await;
    assert!(result.is_err(), "foreign key should reject orphan task");

    db.teardown().await;
}

#[tokio::test]
async fn complete_task_records_fields_once() {
    let db = TestDb::new().await;

    let (_, seeded, _) = seed_goal(&db.pool, "Goal", &["Buy a guitar"], &[]).await;
    let task_id = seeded[0].id;

    let outcome = tasks::complete_task(
        &db.pool,
        task_id,
        45,
        Some("store was closed"),
        Some("call ahead"),
    )
    .await
    .unwrap();

    let completed = match outcome {
        CompletionOutcome::Completed(task) => task,
        other => panic!("expected Completed, got {other:?}"),
    };
    assert_eq!(completed.status, TaskStatus::Completed);
    assert_eq!(completed.time_spent, 45);
    assert_eq!(completed.problems.as_deref(), Some("store was closed"));
    assert_eq!(completed.insights.as_deref(), Some("call ahead"));
    assert!(completed.completed_at.is_some());

    // A second completion must not overwrite the recorded values.
    let again = tasks::complete_task(&db.pool, task_id, 5, None, None)
        .await
        .unwrap();
    assert!(matches!(again, CompletionOutcome::AlreadyCompleted(_)));

    let stored = tasks::get_task(&db.pool, task_id).await.unwrap().unwrap();
    assert_eq!(stored.time_spent, 45);
    assert_eq!(stored.problems.as_deref(), Some("store was closed"));

    db.teardown().await;
}

#[tokio::test]
async fn complete_missing_task_reports_not_found() {
    let db = TestDb::new().await;

    let outcome = tasks::complete_task(&db.pool, 777, 10, None, None)
        .await
        .unwrap();
    assert!(matches!(outcome, CompletionOutcome::NotFound));

    db.teardown().await;
}

#[tokio::test]
async fn negative_time_spent_is_rejected_by_schema() {
    let db = TestDb::new().await;

    let (_, seeded, _) = seed_goal(&db.pool, "Goal", &["t"], &[]).await;
    let result = tasks::complete_task(&db.pool, seeded[0].id, -1, None, None).await;
    assert!(result.is_err(), "CHECK constraint should reject negative time");

    db.teardown().await;
}

// -----------------------------------------------------------------------
// Subtasks
// -----------------------------------------------------------------------

#[tokio::test]
async fn insert_and_list_subtasks() {
    let db = TestDb::new().await;

    let (_, seeded, _) = seed_goal(&db.pool, "Goal", &["Buy a guitar"], &[]).await;
    let task_id = seeded[0].id;

    let inserted = subtasks::insert_subtasks(
        &db.pool,
        task_id,
        &titles(&["Research models", "Visit a store", "Compare prices"]),
    )
    .await
    .unwrap();
    assert_eq!(inserted.len(), 3);
    assert!(inserted.iter().all(|s| !s.is_completed));

    let listed = subtasks::list_subtasks_for_task(&db.pool, task_id)
        .await
        .unwrap();
    let listed_titles: Vec<&str> = listed.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(listed_titles, ["Research models", "Visit a store", "Compare prices"]);
    assert_eq!(subtasks::count_subtasks(&db.pool, task_id).await.unwrap(), 3);

    db.teardown().await;
}

#[tokio::test]
async fn toggle_subtask_is_idempotent() {
    let db = TestDb::new().await;

    let (_, _, seeded) = seed_goal(&db.pool, "Goal", &["t"], &["s"]).await;
    let id = seeded[0].id;

    assert!(subtasks::set_subtask_completed(&db.pool, id, true).await.unwrap());
    assert!(subtasks::set_subtask_completed(&db.pool, id, true).await.unwrap());
    let stored = subtasks::get_subtask(&db.pool, id).await.unwrap().unwrap();
    assert!(stored.is_completed);

    assert!(subtasks::set_subtask_completed(&db.pool, id, false).await.unwrap());
    let stored = subtasks::get_subtask(&db.pool, id).await.unwrap().unwrap();
    assert!(!stored.is_completed);

    db.teardown().await;
}

#[tokio::test]
async fn toggle_missing_subtask_returns_false() {
    let db = TestDb::new().await;

    let found = subtasks::set_subtask_completed(&db.pool, 4040, true)
        .await
        .unwrap();
    assert!(!found);

    db.teardown().await;
}
