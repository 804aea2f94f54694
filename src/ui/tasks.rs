use anyhow::Result;
use chrono::{NaiveDate, Utc};
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::db::Database;
use crate::models::{TaskListItem, TaskPriority, TaskStatus, DEFAULT_TASK_FILTER};
use crate::ui::components::{next_index, previous_index, render_delete_confirmation};

// Represents the state of the task list screen
pub struct TasksState {
    project_id: i32,
    project_name: String,
    tasks: Vec<TaskListItem>,
    filter: Option<TaskStatus>,
    today: NaiveDate,
    table_state: TableState,
    show_delete_confirmation: bool,
}

impl TasksState {
    pub fn new(
        project_id: i32,
        project_name: String,
        tasks: Vec<TaskListItem>,
        filter: Option<TaskStatus>,
        today: NaiveDate,
    ) -> Self {
        let mut state = Self {
            project_id,
            project_name,
            tasks,
            filter,
            today,
            table_state: TableState::default(),
            show_delete_confirmation: false,
        };
        state.reset_selection();
        state
    }

    fn reset_selection(&mut self) {
        let first = if self.visible().is_empty() { None } else { Some(0) };
        self.table_state.select(first);
    }

    /// Tasks that pass the current status filter
    pub fn visible(&self) -> Vec<&TaskListItem> {
        self.tasks
            .iter()
            .filter(|t| self.filter.is_none_or(|f| t.task.status() == f))
            .collect()
    }

    /// All → each status in board order → All
    pub fn cycle_filter(&mut self) {
        self.filter = match self.filter {
            None => TaskStatus::ALL.first().copied(),
            Some(current) => {
                let i = TaskStatus::ALL.iter().position(|s| *s == current).unwrap_or(0);
                TaskStatus::ALL.get(i + 1).copied()
            }
        };
        self.reset_selection();
    }

    pub fn filter(&self) -> Option<TaskStatus> {
        self.filter
    }

    pub fn select_task(&mut self, task_id: i32) {
        if let Some(i) = self.visible().iter().position(|t| t.task.id == task_id) {
            self.table_state.select(Some(i));
        }
    }

    pub fn next(&mut self) {
        let i = next_index(self.table_state.selected(), self.visible().len());
        self.table_state.select(i);
    }

    pub fn previous(&mut self) {
        let i = previous_index(self.table_state.selected(), self.visible().len());
        self.table_state.select(i);
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    pub fn selected_task(&self) -> Option<&TaskListItem> {
        let visible = self.visible();
        self.table_state.selected().and_then(|i| visible.get(i).copied())
    }

    pub fn selected_task_id(&self) -> Option<i32> {
        self.selected_task().map(|t| t.task.id)
    }

    pub fn project_id(&self) -> i32 {
        self.project_id
    }
}

pub enum TaskAction {
    Back,
    NewTask(i32),         // Contains project_id
    EditTask(i32),        // Contains task_id
    DeleteTask(i32),      // Contains task_id
    SetStatus(i32, TaskStatus),
}

/// `all` (or anything unrecognised) means no filter
pub fn parse_filter(value: &str) -> Option<TaskStatus> {
    value.trim().parse().ok()
}

/// Load a project's tasks, opening with the configured default filter
pub async fn load_tasks_state(db: &Database, project_id: i32) -> Result<TasksState> {
    let project = db.get_project(project_id).await?;
    let tasks = db.load_tasks_by_project(project_id).await?;
    let filter = db
        .get_setting(DEFAULT_TASK_FILTER)
        .await?
        .and_then(|value| parse_filter(&value));

    Ok(TasksState::new(project_id, project.name, tasks, filter, Utc::now().date_naive()))
}

/// Reload after a change, keeping the filter and the highlighted task
pub async fn reload_tasks_state(db: &Database, state: &TasksState) -> Result<TasksState> {
    let tasks = db.load_tasks_by_project(state.project_id).await?;
    let mut reloaded = TasksState::new(
        state.project_id,
        state.project_name.clone(),
        tasks,
        state.filter,
        Utc::now().date_naive(),
    );
    if let Some(id) = state.selected_task_id() {
        reloaded.select_task(id);
    }
    Ok(reloaded)
}

fn priority_color(priority: TaskPriority) -> Color {
    match priority {
        TaskPriority::Low => Color::Gray,
        TaskPriority::Medium => Color::White,
        TaskPriority::High => Color::Yellow,
        TaskPriority::Urgent => Color::Red,
    }
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::White,
        TaskStatus::InProgress => Color::Cyan,
        TaskStatus::Review => Color::Magenta,
        TaskStatus::Done => Color::Green,
    }
}

fn row_style(overdue: bool) -> Style {
    if overdue {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

pub fn render_tasks<B: Backend>(frame: &mut Frame<B>, state: &mut TasksState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let header = Row::new(vec!["Title", "Status", "Priority", "Assignee", "Due", "Tags"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = state
        .visible()
        .into_iter()
        .map(|item| {
            let task = &item.task;
            let overdue = task.is_overdue(state.today);
            let due = task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            // Overdue rows are red throughout, so the per-column colours are skipped
            let (status_style, priority_style) = if overdue {
                (Style::default(), Style::default())
            } else {
                (
                    Style::default().fg(status_color(task.status())),
                    Style::default().fg(priority_color(task.priority())),
                )
            };

            Row::new(vec![
                Cell::from(task.title.clone()),
                Cell::from(task.status().label()).style(status_style),
                Cell::from(task.priority().label()).style(priority_style),
                Cell::from(item.assignee_name.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(due),
                Cell::from(item.tags.join(", ")),
            ])
            .style(row_style(overdue))
        })
        .collect();

    let filter_label = state.filter.map(|f| f.label()).unwrap_or("All");
    let title = format!(
        "Tasks: {} [{}] ({} of {})",
        state.project_name,
        filter_label,
        rows.len(),
        state.tasks.len()
    );

    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(12),
        Constraint::Percentage(10),
        Constraint::Percentage(16),
        Constraint::Percentage(12),
        Constraint::Percentage(20),
    ];
    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .widths(&widths)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(table, chunks[0], &mut state.table_state);

    let buttons_text = if state.selected_task().is_some() {
        "<N> New | <E> Edit | <D> Delete | <Space> Advance status | <F> Filter | <Esc> Back"
    } else {
        "<N> New | <F> Filter | <Esc> Back"
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[1]);

    if state.show_delete_confirmation {
        render_delete_confirmation(frame, "task", "Its tag assignments will also be removed.");
    }
}

pub fn handle_key(state: &mut TasksState, key: KeyCode) -> Option<TaskAction> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.toggle_delete_confirmation();
                return state.selected_task_id().map(TaskAction::DeleteTask);
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                state.toggle_delete_confirmation();
            }
            _ => {}
        }
        return None;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => Some(TaskAction::Back),
        KeyCode::Char('n') => Some(TaskAction::NewTask(state.project_id)),
        KeyCode::Char('e') => state.selected_task_id().map(TaskAction::EditTask),
        KeyCode::Char('d') => {
            if state.selected_task().is_some() {
                state.toggle_delete_confirmation();
            }
            None
        }
        KeyCode::Char('f') => {
            state.cycle_filter();
            None
        }
        KeyCode::Char(' ') => state
            .selected_task()
            .map(|t| TaskAction::SetStatus(t.task.id, t.task.status().next())),
        KeyCode::Down => {
            state.next();
            None
        }
        KeyCode::Up => {
            state.previous();
            None
        }
        _ => None,
    }
}

pub fn handle_input(state: &mut TasksState) -> Result<Option<TaskAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;

    fn item(id: i32, status: &str) -> TaskListItem {
        TaskListItem {
            task: Task {
                id,
                project_id: 7,
                assignee_id: None,
                title: format!("Task {}", id),
                description: String::new(),
                status: status.to_string(),
                priority: "medium".to_string(),
                due_date: None,
                estimated_hours: 1.0,
            },
            assignee_name: None,
            tags: Vec::new(),
        }
    }

    fn state(filter: Option<TaskStatus>) -> TasksState {
        TasksState::new(
            7,
            "Atlas".to_string(),
            vec![item(1, "todo"), item(2, "done"), item(3, "todo"), item(4, "review")],
            filter,
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
        )
    }

    #[test]
    fn test_filter_cycle_visits_every_status() {
        let mut state = state(None);
        let mut seen = vec![state.filter()];
        for _ in 0..5 {
            handle_key(&mut state, KeyCode::Char('f'));
            seen.push(state.filter());
        }
        assert_eq!(
            seen,
            vec![
                None,
                Some(TaskStatus::Todo),
                Some(TaskStatus::InProgress),
                Some(TaskStatus::Review),
                Some(TaskStatus::Done),
                None,
            ]
        );
    }

    #[test]
    fn test_filter_limits_visible_tasks() {
        let state = state(Some(TaskStatus::Todo));
        let ids: Vec<i32> = state.visible().iter().map(|t| t.task.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(state.selected_task_id(), Some(1));

        let empty = self::state(Some(TaskStatus::InProgress));
        assert!(empty.visible().is_empty());
        assert_eq!(empty.selected_task_id(), None);
    }

    #[test]
    fn test_space_advances_status() {
        let mut state = state(None);
        state.select_task(4);
        match handle_key(&mut state, KeyCode::Char(' ')) {
            Some(TaskAction::SetStatus(id, status)) => {
                assert_eq!(id, 4);
                assert_eq!(status, TaskStatus::Done);
            }
            _ => panic!("expected a status change"),
        }

        state.select_task(2);
        assert!(matches!(
            handle_key(&mut state, KeyCode::Char(' ')),
            Some(TaskAction::SetStatus(2, TaskStatus::Todo))
        ));
    }

    #[test]
    fn test_selection_follows_filtered_rows() {
        let mut state = state(Some(TaskStatus::Todo));
        handle_key(&mut state, KeyCode::Down);
        assert_eq!(state.selected_task_id(), Some(3));
        assert!(matches!(handle_key(&mut state, KeyCode::Char('e')), Some(TaskAction::EditTask(3))));
    }

    #[test]
    fn test_delete_and_back() {
        let mut state = state(None);
        handle_key(&mut state, KeyCode::Char('d'));
        assert!(matches!(handle_key(&mut state, KeyCode::Char('y')), Some(TaskAction::DeleteTask(1))));
        assert!(matches!(handle_key(&mut state, KeyCode::Esc), Some(TaskAction::Back)));
        assert!(matches!(handle_key(&mut state, KeyCode::Char('n')), Some(TaskAction::NewTask(7))));
    }

    #[test]
    fn test_parse_filter_setting() {
        assert_eq!(parse_filter("all"), None);
        assert_eq!(parse_filter("in_progress"), Some(TaskStatus::InProgress));
        assert_eq!(parse_filter(" review "), Some(TaskStatus::Review));
    }

    #[test]
    fn test_overdue_rows_are_red() {
        let mut late = item(5, "in_progress");
        late.task.due_date = NaiveDate::from_ymd_opt(2024, 5, 9);
        let state = TasksState::new(7, "Atlas".to_string(), vec![late], None, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());

        let overdue = state.visible()[0].task.is_overdue(state.today);
        assert!(overdue);
        assert_eq!(row_style(overdue).fg, Some(Color::Red));
        assert_eq!(row_style(false), Style::default());
    }
}
