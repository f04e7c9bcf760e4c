//! Shared test utilities for execution planner integration tests.
//!
//! Provides one PostgreSQL server per test binary and a fresh, migrated
//! database per test.
//!
//! Two modes:
//! - **`EXECPLAN_TEST_PG_URL`** set: use that server directly (for CI
//!   services or a locally running postgres). The URL must not include a
//!   database name.
//! - **No env var**: start a container via testcontainers, shared per binary
//!   through a `OnceCell`.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::ContainerAsync;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use execplan_db::models::{Goal, SubTask, Task};
use execplan_db::pool;
use execplan_db::queries::{goals, subtasks, tasks};

struct SharedPg {
    base_url: String,
    /// Keeps the container alive. `None` when using an external server.
    _container: Option<ContainerAsync<Postgres>>,
}

static SHARED_PG: OnceCell<SharedPg> = OnceCell::const_new();

async fn init_shared_pg() -> SharedPg {
    if let Ok(url) = std::env::var("EXECPLAN_TEST_PG_URL") {
        return SharedPg {
            base_url: url.trim_end_matches('/').to_owned(),
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("17")
        .start()
        .await
        .expect("failed to start PostgreSQL container");

    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get mapped port");

    SharedPg {
        base_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

/// Base URL (server root, no database name) of the shared PostgreSQL.
pub async fn pg_url() -> &'static str {
    let shared = SHARED_PG.get_or_init(init_shared_pg).await;
    &shared.base_url
}

async fn connect(url: &str, max_connections: u32) -> PgPool {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to {url}: {e}"))
}

/// A uniquely-named, migrated database that lives for one test.
///
/// Call [`TestDb::teardown`] at the end of the test; a panicking test leaks
/// its database until the container goes away.
pub struct TestDb {
    pub pool: PgPool,
    pub name: String,
}

impl TestDb {
    /// Create the database and apply all migrations.
    pub async fn new() -> Self {
        let base_url = pg_url().await;
        let name = format!("execplan_test_{}", Uuid::new_v4().simple());

        let maint = connect(&format!("{base_url}/postgres"), 1).await;
        maint
            .execute(format!("CREATE DATABASE {name}").as_str())
            .await
            .unwrap_or_else(|e| panic!("failed to create temp database {name}: {e}"));
        maint.close().await;

        let pool = connect(&format!("{base_url}/{name}"), 5).await;
        pool::run_migrations(&pool)
            .await
            .expect("migrations should succeed");

        Self { pool, name }
    }

    /// Close the pool and drop the database.
    pub async fn teardown(self) {
        self.pool.close().await;

        let base_url = pg_url().await;
        let maint = connect(&format!("{base_url}/postgres"), 1).await;
        let terminate = format!(
            "SELECT pg_terminate_backend(pid) \
             FROM pg_stat_activity \
             WHERE datname = '{}' AND pid <> pg_backend_pid()",
            self.name
        );
        let _ = maint.execute(terminate.as_str()).await;
        let _ = maint
            .execute(format!("DROP DATABASE IF EXISTS {}", self.name).as_str())
            .await;
        maint.close().await;
    }
}

/// Fixture: a goal with the given task titles, each task carrying the same
/// `subtask_titles`.
pub async fn seed_goal(
    pool: &PgPool,
    title: &str,
    task_titles: &[&str],
    subtask_titles: &[&str],
) -> (Goal, Vec<Task>, Vec<SubTask>) {
    let goal = goals::insert_goal(pool, title)
        .await
        .expect("insert_goal should succeed");

    let task_titles: Vec<String> = task_titles.iter().map(|s| s.to_string()).collect();
    let inserted_tasks = tasks::insert_tasks(pool, goal.id, &task_titles)
        .await
        .expect("insert_tasks should succeed");

    let subtask_titles: Vec<String> = subtask_titles.iter().map(|s| s.to_string()).collect();
    let mut inserted_subtasks = Vec::new();
    for task in &inserted_tasks {
        let mut rows = subtasks::insert_subtasks(pool, task.id, &subtask_titles)
            .await
            .expect("insert_subtasks should succeed");
        inserted_subtasks.append(&mut rows);
    }

    (goal, inserted_tasks, inserted_subtasks)
}
