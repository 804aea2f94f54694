use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::error::AppError;
use crate::models::{Task, TaskPriority, TaskStatus, User};
use crate::ui::components::{cycle, cycle_id, date_input::DateInputState, edit_text};

pub enum TaskWizardAction {
    Cancel,
    Save(Task),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum TaskField {
    Title,
    Description,
    Status,
    Priority,
    Assignee,
    DueDate,
    EstimatedHours,
}

const FIELDS: [TaskField; 7] = [
    TaskField::Title,
    TaskField::Description,
    TaskField::Status,
    TaskField::Priority,
    TaskField::Assignee,
    TaskField::DueDate,
    TaskField::EstimatedHours,
];

impl TaskField {
    fn label(&self) -> &'static str {
        match self {
            TaskField::Title => "Title",
            TaskField::Description => "Description",
            TaskField::Status => "Status",
            TaskField::Priority => "Priority",
            TaskField::Assignee => "Assignee",
            TaskField::DueDate => "Due Date",
            TaskField::EstimatedHours => "Estimated Hours",
        }
    }

    fn is_choice(&self) -> bool {
        matches!(self, TaskField::Status | TaskField::Priority | TaskField::Assignee)
    }
}

pub struct TaskWizardState {
    pub task: Task,
    users: Vec<User>,
    pub current_field: TaskField,
    pub editing: bool,
    hours_input: String,
    due_date_state: DateInputState,
    error: Option<String>,
}

impl TaskWizardState {
    pub fn new(project_id: i32, users: Vec<User>) -> Self {
        let today = chrono::Local::now().date_naive();
        let task = Task {
            id: 0,
            project_id,
            assignee_id: None,
            title: String::new(),
            description: String::new(),
            status: TaskStatus::Todo.as_str().to_string(),
            priority: TaskPriority::Medium.as_str().to_string(),
            due_date: None,
            estimated_hours: 0.0,
        };

        Self {
            hours_input: String::new(),
            due_date_state: DateInputState::optional(None, today),
            task,
            users,
            current_field: TaskField::Title,
            editing: false,
            error: None,
        }
    }

    pub fn from_existing(task: Task, users: Vec<User>) -> Self {
        let fallback = task.due_date.unwrap_or_else(|| chrono::Local::now().date_naive());
        Self {
            hours_input: format_hours(task.estimated_hours),
            due_date_state: DateInputState::optional(task.due_date, fallback),
            task,
            users,
            current_field: TaskField::Title,
            editing: false,
            error: None,
        }
    }

    pub fn project_id(&self) -> i32 {
        self.task.project_id
    }

    /// Shown in place of the help line until the next edit
    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.current_field == TaskField::DueDate {
            self.due_date_state.toggle_editing();
        }
    }

    fn step_field(&mut self, forward: bool) {
        self.current_field = cycle(&FIELDS, self.current_field, forward);
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let forward = match key {
            KeyCode::Right => Some(true),
            KeyCode::Left => Some(false),
            _ => None,
        };

        match self.current_field {
            TaskField::Title => edit_text(&mut self.task.title, key),
            TaskField::Description => edit_text(&mut self.task.description, key),
            TaskField::EstimatedHours => match key {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => self.hours_input.push(c),
                KeyCode::Backspace => {
                    self.hours_input.pop();
                }
                _ => {}
            },
            TaskField::Status => {
                if let Some(forward) = forward {
                    let status = cycle(TaskStatus::ALL, self.task.status(), forward);
                    self.task.status = status.as_str().to_string();
                }
            }
            TaskField::Priority => {
                if let Some(forward) = forward {
                    let priority = cycle(TaskPriority::ALL, self.task.priority(), forward);
                    self.task.priority = priority.as_str().to_string();
                }
            }
            TaskField::Assignee => {
                if let Some(forward) = forward {
                    let ids: Vec<i32> = self.users.iter().map(|u| u.id).collect();
                    self.task.assignee_id = cycle_id(self.task.assignee_id, &ids, forward, true);
                }
            }
            TaskField::DueDate => {
                self.due_date_state.handle_input(key);
                self.task.due_date = self.due_date_state.date();
            }
        }
    }

    /// The task to save, or why it can't be saved. Blank hours mean zero.
    pub fn validate(&self) -> Result<Task, AppError> {
        if self.task.title.trim().is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }

        let hours = if self.hours_input.is_empty() {
            0.0
        } else {
            self.hours_input
                .parse::<f64>()
                .ok()
                .filter(|h| h.is_finite() && *h >= 0.0)
                .ok_or_else(|| {
                    AppError::Validation("estimated hours must be a non-negative number".to_string())
                })?
        };

        let mut task = self.task.clone();
        task.title = task.title.trim().to_string();
        task.estimated_hours = hours;
        Ok(task)
    }

    fn field_value(&self, field: TaskField) -> String {
        match field {
            TaskField::Title => self.task.title.clone(),
            TaskField::Description => self.task.description.clone(),
            TaskField::Status => self.task.status().label().to_string(),
            TaskField::Priority => self.task.priority().label().to_string(),
            TaskField::Assignee => self
                .task
                .assignee_id
                .and_then(|id| self.users.iter().find(|u| u.id == id))
                .map(|u| u.name.clone())
                .unwrap_or_else(|| "Unassigned".to_string()),
            TaskField::DueDate => self.due_date_state.get_display_string(),
            TaskField::EstimatedHours => self.hours_input.clone(),
        }
    }
}

fn format_hours(hours: f64) -> String {
    if hours == 0.0 {
        String::new()
    } else {
        hours.to_string()
    }
}

pub fn render_task_wizard<B: Backend>(f: &mut Frame<B>, state: &mut TaskWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(9),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.task.id == 0 { "New Task" } else { "Edit Task" };
    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = FIELDS
        .iter()
        .map(|field| {
            let selected = *field == state.current_field;
            let mut value = state.field_value(*field);
            if selected && state.editing && !field.is_choice() && *field != TaskField::DueDate {
                value.push('|');
            }

            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value_style = if selected && state.editing {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}: ", field.label()), label_style),
                Span::styled(value, value_style),
            ]))
        })
        .collect();
    let form = List::new(items).block(Block::default().borders(Borders::ALL).title("Task Details"));
    f.render_widget(form, chunks[1]);

    let (help_text, help_style) = match (&state.error, state.editing) {
        (Some(error), false) => (format!("Cannot save: {}", error), Style::default().fg(Color::Red)),
        (_, true) if state.current_field.is_choice() => {
            ("Left/Right - Choose | Enter - Done".to_string(), Style::default().fg(Color::Gray))
        }
        (_, true) if state.current_field == TaskField::DueDate => (
            "Type digits | Left/Right - Switch date part | Del - Clear | Enter - Done".to_string(),
            Style::default().fg(Color::Gray),
        ),
        (_, true) => ("Type to edit | Enter - Done".to_string(), Style::default().fg(Color::Gray)),
        (None, false) => (
            "Enter - Edit field | Up/Down - Navigate fields | S - Save task | Esc - Cancel".to_string(),
            Style::default().fg(Color::Gray),
        ),
    };
    let help = Paragraph::new(help_text)
        .style(help_style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

pub fn handle_key(state: &mut TaskWizardState, key: KeyCode) -> Option<TaskWizardAction> {
    match key {
        KeyCode::Esc => {
            if state.editing {
                state.toggle_editing();
            } else {
                return Some(TaskWizardAction::Cancel);
            }
        }
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.step_field(false),
        KeyCode::Down if !state.editing => state.step_field(true),
        KeyCode::Char('s') if !state.editing => match state.validate() {
            Ok(task) => return Some(TaskWizardAction::Save(task)),
            Err(err) => state.error = Some(err.to_string()),
        },
        _ if state.editing => {
            state.error = None;
            state.edit_current_field(key);
        }
        _ => {}
    }

    None
}

pub fn handle_input(state: &mut TaskWizardState) -> Result<Option<TaskWizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}
