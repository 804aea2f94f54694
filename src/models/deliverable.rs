use chrono::NaiveDate;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Deliverable {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub status: String,
}

impl Deliverable {
    pub fn status(&self) -> DeliverableStatus {
        self.status.parse().unwrap_or(DeliverableStatus::Pending)
    }
}

text_enum! {
    DeliverableStatus {
        Pending => ("pending", "Pending"),
        InProgress => ("in_progress", "In Progress"),
        Delivered => ("delivered", "Delivered"),
        Accepted => ("accepted", "Accepted"),
    }
}
