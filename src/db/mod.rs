use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{already_exists, not_found, AppError};
use crate::models::{
    CalendarEvent, Client, Deliverable, Project, ProjectCard, ProjectListItem, Resource, Setting,
    Task, TaskListItem, TaskStatus, Technology, User,
};

/// Every table in the schema, parents before children
pub const TABLES: &[&str] = &[
    "users",
    "clients",
    "projects",
    "tasks",
    "deliverables",
    "resources",
    "technologies",
    "project_technologies",
    "tags",
    "task_tags",
    "calendar_events",
    "settings",
];

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout_secs))
            .connect(config.database_url())
            .await?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the migrations embedded from `migrations/`
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("database schema is up to date");
        Ok(())
    }

    pub async fn server_version(&self) -> Result<String> {
        let version = sqlx::query_scalar::<_, String>("SELECT version()")
            .fetch_one(&self.pool)
            .await?;

        Ok(version)
    }

    pub async fn count_rows(&self, table: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Row counts for every table in `TABLES`, in the same order
    pub async fn table_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        let mut counts = Vec::with_capacity(TABLES.len());
        for table in TABLES {
            counts.push((*table, self.count_rows(table).await?));
        }
        Ok(counts)
    }

    // User and client lookups
    pub async fn load_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    pub async fn load_clients(&self) -> Result<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    // Project operations
    pub async fn load_projects(&self) -> Result<Vec<ProjectListItem>> {
        let projects = sqlx::query_as::<_, ProjectListItem>(
            r#"
            SELECT
                p.*,
                c.name AS client_name,
                u.name AS owner_name
            FROM projects p
            JOIN clients c ON c.id = p.client_id
            LEFT JOIN users u ON u.id = p.owner_id
            ORDER BY p.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    pub async fn get_project(&self, id: i32) -> Result<Project> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found("project", id))
    }

    pub async fn create_project(&self, project: &Project) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO projects (client_id, owner_id, name, description, status, start_date, due_date, budget)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(project.client_id)
        .bind(project.owner_id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.status)
        .bind(project.start_date)
        .bind(project.due_date)
        .bind(project.budget)
        .fetch_one(&self.pool)
        .await
        .map_err(already_exists(duplicate_project(project)))?;

        info!(project_id = id, name = %project.name, "created project");
        Ok(id)
    }

    pub async fn update_project(&self, project: &Project) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET client_id = $1, owner_id = $2, name = $3, description = $4,
                status = $5, start_date = $6, due_date = $7, budget = $8
            WHERE id = $9
            "#,
        )
        .bind(project.client_id)
        .bind(project.owner_id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.status)
        .bind(project.start_date)
        .bind(project.due_date)
        .bind(project.budget)
        .bind(project.id)
        .execute(&self.pool)
        .await
        .map_err(already_exists(duplicate_project(project)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound { entity: "project", id: project.id }.into());
        }

        info!(project_id = project.id, "updated project");
        Ok(())
    }

    /// Insert when `id` is 0, update otherwise. Returns the project id.
    pub async fn save_project(&self, project: &Project) -> Result<i32> {
        if project.id == 0 {
            self.create_project(project).await
        } else {
            self.update_project(project).await?;
            Ok(project.id)
        }
    }

    /// Tasks, deliverables, resources, events and links go with it (`ON DELETE CASCADE`)
    pub async fn delete_project(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound { entity: "project", id }.into());
        }

        info!(project_id = id, "deleted project");
        Ok(())
    }

    /// Projects with everything the overview page shows. Overdue counts are relative to `today`.
    pub async fn load_project_cards(&self, today: NaiveDate) -> Result<Vec<ProjectCard>> {
        let mut cards: Vec<ProjectCard> = self
            .load_projects()
            .await?
            .into_iter()
            .map(ProjectCard::new)
            .collect();
        let index: HashMap<i32, usize> = cards
            .iter()
            .enumerate()
            .map(|(i, card)| (card.id(), i))
            .collect();

        let status_counts = sqlx::query_as::<_, (i32, String, i64)>(
            "SELECT project_id, status, COUNT(*) FROM tasks GROUP BY project_id, status",
        )
        .fetch_all(&self.pool)
        .await?;
        for (project_id, status, count) in status_counts {
            if let (Some(&i), Ok(status)) = (index.get(&project_id), status.parse::<TaskStatus>()) {
                cards[i].counts.add(status, count);
            }
        }

        let overdue = sqlx::query_as::<_, (i32, i64)>(
            r#"
            SELECT project_id, COUNT(*)
            FROM tasks
            WHERE due_date < $1 AND status <> 'done'
            GROUP BY project_id
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        for (project_id, count) in overdue {
            if let Some(&i) = index.get(&project_id) {
                cards[i].counts.overdue = count;
            }
        }

        let deliverables = sqlx::query_as::<_, Deliverable>(
            "SELECT * FROM deliverables ORDER BY due_date ASC NULLS LAST, name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        for deliverable in deliverables {
            if let Some(&i) = index.get(&deliverable.project_id) {
                cards[i].deliverables.push(deliverable);
            }
        }

        let technologies = sqlx::query_as::<_, (i32, i32, String, String)>(
            r#"
            SELECT pt.project_id, t.id, t.name, t.category
            FROM project_technologies pt
            JOIN technologies t ON t.id = pt.technology_id
            ORDER BY t.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        for (project_id, id, name, category) in technologies {
            if let Some(&i) = index.get(&project_id) {
                cards[i].technologies.push(Technology { id, name, category });
            }
        }

        let resources = sqlx::query_as::<_, Resource>("SELECT * FROM resources ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        for resource in resources {
            if let Some(&i) = index.get(&resource.project_id) {
                cards[i].resources.push(resource);
            }
        }

        debug!(projects = cards.len(), "loaded project cards");
        Ok(cards)
    }

    // Task operations
    pub async fn load_tasks_by_project(&self, project_id: i32) -> Result<Vec<TaskListItem>> {
        let tasks = sqlx::query_as::<_, TaskListItem>(
            r#"
            SELECT
                t.*,
                u.name AS assignee_name,
                COALESCE(
                    ARRAY_AGG(g.name ORDER BY g.name) FILTER (WHERE g.name IS NOT NULL),
                    '{}'
                ) AS tags
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assignee_id
            LEFT JOIN task_tags tt ON tt.task_id = t.id
            LEFT JOIN tags g ON g.id = tt.tag_id
            WHERE t.project_id = $1
            GROUP BY t.id, u.name
            ORDER BY t.due_date ASC NULLS LAST, t.id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    pub async fn get_task(&self, id: i32) -> Result<Task> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found("task", id))
    }

    pub async fn create_task(&self, task: &Task) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO tasks (project_id, assignee_id, title, description, status, priority, due_date, estimated_hours)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(task.project_id)
        .bind(task.assignee_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.status)
        .bind(&task.priority)
        .bind(task.due_date)
        .bind(task.estimated_hours)
        .fetch_one(&self.pool)
        .await
        .map_err(already_exists(duplicate_task(task)))?;

        info!(task_id = id, project_id = task.project_id, "created task");
        Ok(id)
    }

    pub async fn update_task(&self, task: &Task) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET assignee_id = $1, title = $2, description = $3, status = $4,
                priority = $5, due_date = $6, estimated_hours = $7
            WHERE id = $8
            "#,
        )
        .bind(task.assignee_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.status)
        .bind(&task.priority)
        .bind(task.due_date)
        .bind(task.estimated_hours)
        .bind(task.id)
        .execute(&self.pool)
        .await
        .map_err(already_exists(duplicate_task(task)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound { entity: "task", id: task.id }.into());
        }

        info!(task_id = task.id, "updated task");
        Ok(())
    }

    /// Insert when `id` is 0, update otherwise. Returns the task id.
    pub async fn save_task(&self, task: &Task) -> Result<i32> {
        if task.id == 0 {
            self.create_task(task).await
        } else {
            self.update_task(task).await?;
            Ok(task.id)
        }
    }

    pub async fn set_task_status(&self, id: i32, status: TaskStatus) -> Result<()> {
        let result = sqlx::query("UPDATE tasks SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound { entity: "task", id }.into());
        }

        debug!(task_id = id, status = status.as_str(), "changed task status");
        Ok(())
    }

    pub async fn delete_task(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound { entity: "task", id }.into());
        }

        info!(task_id = id, "deleted task");
        Ok(())
    }

    // Calendar
    pub async fn load_upcoming_events(
        &self,
        from: DateTime<Utc>,
        days: i64,
    ) -> Result<Vec<CalendarEvent>> {
        let until = from + chrono::Duration::days(days);
        let events = sqlx::query_as::<_, CalendarEvent>(
            r#"
            SELECT * FROM calendar_events
            WHERE ends_at >= $1 AND starts_at < $2
            ORDER BY starts_at ASC
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    // Settings
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    pub async fn load_settings(&self) -> Result<Vec<Setting>> {
        let settings =
            sqlx::query_as::<_, Setting>("SELECT key, value FROM settings ORDER BY key ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(settings)
    }
}

fn duplicate_project(project: &Project) -> String {
    format!("a project named '{}' already exists", project.name)
}

fn duplicate_task(task: &Task) -> String {
    format!("this project already has a task titled '{}'", task.title)
}

/// Initialize the database connection pool
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;
    debug!(max_connections = config.db_max_connections, "database pool ready");
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::testing::scratch_database;
    use super::*;
    use crate::models::TaskCounts;
    use crate::seed::{default_fixtures, seed};

    const MISSING_ID: i32 = i32::MAX;

    async fn seeded() -> (tokio::sync::MutexGuard<'static, ()>, Database, NaiveDate) {
        let (guard, db) = scratch_database().await;
        let today = Utc::now().date_naive();
        seed(&db, &default_fixtures(), today, true).await.unwrap();
        (guard, db, today)
    }

    async fn project_id(db: &Database, name: &str) -> i32 {
        db.load_projects()
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.project.name == name)
            .map(|p| p.project.id)
            .unwrap()
    }

    fn is_not_found(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<AppError>(), Some(AppError::NotFound { .. }))
    }

    fn is_validation(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<AppError>(), Some(AppError::Validation(_)))
    }

    fn new_task(project_id: i32, title: &str) -> Task {
        Task {
            id: 0,
            project_id,
            assignee_id: None,
            title: title.to_string(),
            description: String::new(),
            status: TaskStatus::Todo.as_str().to_string(),
            priority: "medium".to_string(),
            due_date: None,
            estimated_hours: 1.0,
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_project_card_counts_match_task_rows() {
        let (_guard, db, today) = seeded().await;
        let cards = db.load_project_cards(today).await.unwrap();
        assert_eq!(cards.len(), 3);

        for card in &cards {
            let mut expected = TaskCounts::default();
            for item in db.load_tasks_by_project(card.id()).await.unwrap() {
                expected.add(item.task.status(), 1);
                if item.task.is_overdue(today) {
                    expected.overdue += 1;
                }
            }
            assert_eq!(card.counts, expected, "counts for {}", card.item.project.name);
        }

        let total_tasks: i64 = cards.iter().map(|c| c.counts.total()).sum();
        assert_eq!(total_tasks, 12);
        assert_eq!(cards.iter().map(|c| c.deliverables.len()).sum::<usize>(), 6);
        assert_eq!(cards.iter().map(|c| c.resources.len()).sum::<usize>(), 5);
        assert!(cards.iter().any(|c| c.counts.overdue > 0));
    }

    #[tokio::test]
    #[ignore]
    async fn test_task_tags_are_aggregated_by_name() {
        let (_guard, db, _) = seeded().await;
        let fixtures = default_fixtures();

        for fixture in fixtures.tasks {
            let id = project_id(&db, fixture.project).await;
            let tasks = db.load_tasks_by_project(id).await.unwrap();
            let item = tasks.iter().find(|t| t.task.title == fixture.title).unwrap();

            let mut expected: Vec<String> = fixture.tags.iter().map(|t| t.to_string()).collect();
            expected.sort();
            assert_eq!(item.tags, expected, "tags for {}", fixture.title);
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_deleting_a_project_removes_its_tasks() {
        let (_guard, db, _) = seeded().await;
        let mut project = db.get_project(project_id(&db, "Storefront Revamp").await).await.unwrap();
        project.id = 0;
        project.name = "Storefront Revamp II".to_string();
        let id = db.save_project(&project).await.unwrap();
        let task_id = db.create_task(&new_task(id, "Carry over backlog")).await.unwrap();

        db.delete_project(id).await.unwrap();

        assert!(is_not_found(&db.get_task(task_id).await.unwrap_err()));
        assert!(is_not_found(&db.get_project(id).await.unwrap_err()));
    }

    #[tokio::test]
    #[ignore]
    async fn test_deleting_a_user_unassigns_their_tasks() {
        let (_guard, db, _) = seeded().await;
        let user_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO users (name, email, role) VALUES ('Temp Contractor', 'temp@nexuspm.dev', 'member') RETURNING id",
        )
        .fetch_one(db.get_pool())
        .await
        .unwrap();

        let mut task = new_task(project_id(&db, "Fleet Tracker").await, "Contractor handover");
        task.assignee_id = Some(user_id);
        let task_id = db.create_task(&task).await.unwrap();

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(db.get_pool())
            .await
            .unwrap();

        assert_eq!(db.get_task(task_id).await.unwrap().assignee_id, None);
    }

    #[tokio::test]
    #[ignore]
    async fn test_upcoming_events_window() {
        let (_guard, db, _) = seeded().await;
        let now = Utc::now();
        let events = [
            ("window: finished", now - chrono::Duration::days(3), now - chrono::Duration::days(2)),
            ("window: ongoing", now - chrono::Duration::hours(1), now + chrono::Duration::hours(1)),
            ("window: tomorrow", now + chrono::Duration::days(1), now + chrono::Duration::days(1) + chrono::Duration::hours(1)),
            ("window: too far", now + chrono::Duration::days(20), now + chrono::Duration::days(20) + chrono::Duration::hours(1)),
        ];
        for (title, starts_at, ends_at) in events {
            sqlx::query("INSERT INTO calendar_events (title, starts_at, ends_at) VALUES ($1, $2, $3)")
                .bind(title)
                .bind(starts_at)
                .bind(ends_at)
                .execute(db.get_pool())
                .await
                .unwrap();
        }

        let titles: Vec<String> = db
            .load_upcoming_events(now, 14)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .filter(|t| t.starts_with("window: "))
            .collect();
        assert_eq!(titles, vec!["window: ongoing", "window: tomorrow"]);
    }

    #[tokio::test]
    #[ignore]
    async fn test_missing_rows_are_not_found() {
        let (_guard, db, _) = seeded().await;
        let mut project = db.get_project(project_id(&db, "Fleet Tracker").await).await.unwrap();
        project.id = MISSING_ID;
        let mut task = new_task(project_id(&db, "Fleet Tracker").await, "Ghost");
        task.id = MISSING_ID;

        assert!(is_not_found(&db.update_project(&project).await.unwrap_err()));
        assert!(is_not_found(&db.delete_project(MISSING_ID).await.unwrap_err()));
        assert!(is_not_found(&db.update_task(&task).await.unwrap_err()));
        assert!(is_not_found(&db.set_task_status(MISSING_ID, TaskStatus::Done).await.unwrap_err()));
        assert!(is_not_found(&db.delete_task(MISSING_ID).await.unwrap_err()));
    }

    #[tokio::test]
    #[ignore]
    async fn test_duplicate_names_are_validation_errors() {
        let (_guard, db, _) = seeded().await;
        let fleet = project_id(&db, "Fleet Tracker").await;

        let mut copy = db.get_project(fleet).await.unwrap();
        copy.id = 0;
        let err = db.save_project(&copy).await.unwrap_err();
        assert!(is_validation(&err));
        assert!(err.to_string().contains("Fleet Tracker"));

        assert!(is_validation(&db.create_task(&new_task(fleet, "Route history API")).await.unwrap_err()));

        let id = db.create_task(&new_task(fleet, "Rename me")).await.unwrap();
        let mut renamed = db.get_task(id).await.unwrap();
        renamed.title = "Live map view".to_string();
        assert!(is_validation(&db.save_task(&renamed).await.unwrap_err()));
    }

    #[tokio::test]
    #[ignore]
    async fn test_settings_round_trip() {
        let (_guard, db, _) = seeded().await;
        let settings = db.load_settings().await.unwrap();
        assert_eq!(settings.len(), 4);
        let company = settings.iter().find(|s| s.key == crate::models::COMPANY_NAME).unwrap();
        assert_eq!(db.get_setting(crate::models::COMPANY_NAME).await.unwrap(), Some(company.value.clone()));
        assert_eq!(db.get_setting("no.such.key").await.unwrap(), None);
    }
}

/// Shared setup for the `#[ignore]`d tests that need a scratch Postgres
#[cfg(test)]
pub(crate) mod testing {
    use sqlx::PgPool;
    use tokio::sync::{Mutex, MutexGuard};

    use super::Database;

    // These tests truncate and reseed shared tables, so they take turns.
    static LOCK: Mutex<()> = Mutex::const_new(());

    pub async fn scratch_database() -> (MutexGuard<'static, ()>, Database) {
        let guard = LOCK.lock().await;
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = Database::from_pool(PgPool::connect(&url).await.unwrap());
        db.migrate().await.unwrap();
        (guard, db)
    }
}
