use chrono::NaiveDate;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Task {
    pub id: i32,
    pub project_id: i32,
    pub assignee_id: Option<i32>,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: f64,
}

impl Task {
    pub fn status(&self) -> TaskStatus {
        self.status.parse().unwrap_or(TaskStatus::Todo)
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority.parse().unwrap_or(TaskPriority::Medium)
    }

    /// Past due and not finished. A task due today is not overdue.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => due < today && self.status() != TaskStatus::Done,
            None => false,
        }
    }
}

/// A task row with its assignee name and tag names
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct TaskListItem {
    #[sqlx(flatten)]
    pub task: Task,
    pub assignee_name: Option<String>,
    pub tags: Vec<String>,
}

text_enum! {
    TaskStatus {
        Todo => ("todo", "To Do"),
        InProgress => ("in_progress", "In Progress"),
        Review => ("review", "Review"),
        Done => ("done", "Done"),
    }
}

impl TaskStatus {
    /// Board order, wrapping from done back to todo
    pub fn next(&self) -> TaskStatus {
        match self {
            TaskStatus::Todo => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Review,
            TaskStatus::Review => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Todo,
        }
    }
}

text_enum! {
    TaskPriority {
        Low => ("low", "Low"),
        Medium => ("medium", "Medium"),
        High => ("high", "High"),
        Urgent => ("urgent", "Urgent"),
    }
}
