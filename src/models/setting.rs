/// Company name shown in the dashboard header
pub const COMPANY_NAME: &str = "company.name";
/// Status filter the task list opens with (`all` or a task status)
pub const DEFAULT_TASK_FILTER: &str = "dashboard.default_task_filter";

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Setting {
    pub key: String,
    pub value: String,
}
