use chrono::NaiveDate;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Project {
    pub id: i32,
    pub client_id: i32,
    pub owner_id: Option<i32>,
    pub name: String,
    pub description: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub budget: f64,
}

impl Project {
    pub fn status(&self) -> ProjectStatus {
        self.status.parse().unwrap_or(ProjectStatus::Planning)
    }

    pub fn date_range(&self) -> String {
        match self.due_date {
            Some(due) => format!(
                "{} to {}",
                self.start_date.format("%Y-%m-%d"),
                due.format("%Y-%m-%d")
            ),
            None => format!("{} to Open", self.start_date.format("%Y-%m-%d")),
        }
    }
}

/// A project row joined with the names the overview table shows
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct ProjectListItem {
    #[sqlx(flatten)]
    pub project: Project,
    pub client_name: String,
    pub owner_name: Option<String>,
}

text_enum! {
    ProjectStatus {
        Planning => ("planning", "Planning"),
        Active => ("active", "Active"),
        OnHold => ("on_hold", "On Hold"),
        Completed => ("completed", "Completed"),
        Cancelled => ("cancelled", "Cancelled"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(due_date: Option<NaiveDate>) -> Project {
        Project {
            id: 1,
            client_id: 1,
            owner_id: None,
            name: "Atlas".to_string(),
            description: String::new(),
            status: "on_hold".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            due_date,
            budget: 0.0,
        }
    }

    #[test]
    fn test_status_parses_db_value() {
        assert_eq!(project(None).status(), ProjectStatus::OnHold);
        assert_eq!(ProjectStatus::OnHold.label(), "On Hold");
        assert!("paused".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_date_range() {
        assert_eq!(project(None).date_range(), "2024-03-01 to Open");
        let due = NaiveDate::from_ymd_opt(2024, 6, 30);
        assert_eq!(project(due).date_range(), "2024-03-01 to 2024-06-30");
    }
}
