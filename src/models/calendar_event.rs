use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct CalendarEvent {
    pub id: i32,
    pub project_id: Option<i32>,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub all_day: bool,
}

impl CalendarEvent {
    pub fn when(&self) -> String {
        if self.all_day {
            format!("{} (all day)", self.starts_at.format("%a %Y-%m-%d"))
        } else {
            format!(
                "{} {}-{}",
                self.starts_at.format("%a %Y-%m-%d"),
                self.starts_at.format("%H:%M"),
                self.ends_at.format("%H:%M")
            )
        }
    }
}
