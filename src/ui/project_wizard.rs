use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::error::AppError;
use crate::models::{Client, Project, ProjectStatus, User};
use crate::ui::components::{cycle, cycle_id, date_input::DateInputState, edit_text};

pub enum ProjectWizardAction {
    Cancel,
    Save(Project),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum ProjectField {
    Name,
    Description,
    Client,
    Owner,
    Status,
    StartDate,
    DueDate,
    Budget,
}

const FIELDS: [ProjectField; 8] = [
    ProjectField::Name,
    ProjectField::Description,
    ProjectField::Client,
    ProjectField::Owner,
    ProjectField::Status,
    ProjectField::StartDate,
    ProjectField::DueDate,
    ProjectField::Budget,
];

impl ProjectField {
    fn label(&self) -> &'static str {
        match self {
            ProjectField::Name => "Name",
            ProjectField::Description => "Description",
            ProjectField::Client => "Client",
            ProjectField::Owner => "Owner",
            ProjectField::Status => "Status",
            ProjectField::StartDate => "Start Date",
            ProjectField::DueDate => "Due Date",
            ProjectField::Budget => "Budget",
        }
    }
}

pub struct ProjectWizardState {
    pub project: Project,
    clients: Vec<Client>,
    users: Vec<User>,
    pub current_field: ProjectField,
    pub editing: bool,
    budget_input: String,
    start_date_state: DateInputState,
    due_date_state: DateInputState,
    error: Option<String>,
}

impl ProjectWizardState {
    pub fn new(clients: Vec<Client>, users: Vec<User>) -> Self {
        let today = chrono::Local::now().date_naive();
        let client_id = clients.first().map(|c| c.id).unwrap_or(0);

        Self::build(
            Project {
                id: 0,
                client_id,
                owner_id: None,
                name: String::new(),
                description: String::new(),
                status: ProjectStatus::Planning.as_str().to_string(),
                start_date: today,
                due_date: None,
                budget: 0.0,
            },
            clients,
            users,
        )
    }

    pub fn from_existing(project: Project, clients: Vec<Client>, users: Vec<User>) -> Self {
        Self::build(project, clients, users)
    }

    fn build(project: Project, clients: Vec<Client>, users: Vec<User>) -> Self {
        Self {
            budget_input: format!("{:.2}", project.budget),
            start_date_state: DateInputState::new(project.start_date),
            due_date_state: DateInputState::optional(project.due_date, project.start_date),
            project,
            clients,
            users,
            current_field: ProjectField::Name,
            editing: false,
            error: None,
        }
    }

    /// Shown in place of the help line until the next edit
    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        match self.current_field {
            ProjectField::StartDate => self.start_date_state.toggle_editing(),
            ProjectField::DueDate => self.due_date_state.toggle_editing(),
            _ => {}
        }
    }

    fn step_field(&mut self, forward: bool) {
        self.current_field = cycle(&FIELDS, self.current_field, forward);
    }

    fn client_name(&self) -> String {
        self.clients
            .iter()
            .find(|c| c.id == self.project.client_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "None (add a client first)".to_string())
    }

    fn owner_name(&self) -> String {
        self.project
            .owner_id
            .and_then(|id| self.users.iter().find(|u| u.id == id))
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "Unassigned".to_string())
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
            ProjectField::Name => edit_text(&mut self.project.name, key),
            ProjectField::Description => edit_text(&mut self.project.description, key),
            ProjectField::Budget => match key {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => self.budget_input.push(c),
                KeyCode::Backspace => {
                    self.budget_input.pop();
                }
                _ => {}
            },
            ProjectField::Client => {
                if let Some(forward) = forward {
                    let ids: Vec<i32> = self.clients.iter().map(|c| c.id).collect();
                    if let Some(id) = cycle_id(Some(self.project.client_id), &ids, forward, false) {
                        self.project.client_id = id;
                    }
                }
            }
            ProjectField::Owner => {
                if let Some(forward) = forward {
                    let ids: Vec<i32> = self.users.iter().map(|u| u.id).collect();
                    self.project.owner_id = cycle_id(self.project.owner_id, &ids, forward, true);
                }
            }
            ProjectField::Status => {
                if let Some(forward) = forward {
                    let status = cycle(ProjectStatus::ALL, self.project.status(), forward);
                    self.project.status = status.as_str().to_string();
                }
            }
            ProjectField::StartDate => {
                self.start_date_state.handle_input(key);
                if let Some(date) = self.start_date_state.date() {
                    self.project.start_date = date;
                }
            }
            ProjectField::DueDate => {
                self.due_date_state.handle_input(key);
                self.project.due_date = self.due_date_state.date();
            }
        }
    }

    /// The project to save, or why it can't be saved
    pub fn validate(&self) -> Result<Project, AppError> {
        if self.project.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }
        if !self.clients.iter().any(|c| c.id == self.project.client_id) {
            return Err(AppError::Validation("a client is required".to_string()));
        }
        if let Some(due) = self.project.due_date {
            if due < self.project.start_date {
                return Err(AppError::Validation("due date is before the start date".to_string()));
            }
        }
        let budget = self
            .budget_input
            .parse::<f64>()
            .ok()
            .filter(|b| b.is_finite() && *b >= 0.0)
            .ok_or_else(|| AppError::Validation("budget must be a non-negative number".to_string()))?;

        let mut project = self.project.clone();
        project.name = project.name.trim().to_string();
        project.budget = budget;
        Ok(project)
    }

    fn field_value(&self, field: ProjectField) -> String {
        match field {
            ProjectField::Name => self.project.name.clone(),
            ProjectField::Description => self.project.description.clone(),
            ProjectField::Client => self.client_name(),
            ProjectField::Owner => self.owner_name(),
            ProjectField::Status => self.project.status().label().to_string(),
            ProjectField::StartDate => self.start_date_state.get_display_string(),
            ProjectField::DueDate => self.due_date_state.get_display_string(),
            ProjectField::Budget => self.budget_input.clone(),
        }
    }
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.project.id == 0 {
        "New Project"
    } else {
        "Edit Project"
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let help_text = match (&state.error, state.editing) {
        (Some(error), false) => format!("Cannot save: {}", error),
        (_, true) => match state.current_field {
            ProjectField::Client | ProjectField::Owner | ProjectField::Status => {
                "Left/Right - Choose | Enter - Done".to_string()
            }
            ProjectField::StartDate => {
                "Type digits | Left/Right - Switch date part | Enter - Done".to_string()
            }
            ProjectField::DueDate => {
                "Type digits | Left/Right - Switch date part | Del - Clear | Enter - Done".to_string()
            }
            _ => "Type to edit | Enter - Done".to_string(),
        },
        (None, false) => {
            "Enter - Edit field | Up/Down - Navigate fields | S - Save project | Esc - Cancel".to_string()
        }
    };

    let help_style = if state.error.is_some() && !state.editing {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };
    let help = Paragraph::new(help_text)
        .style(help_style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &ProjectWizardState, area: Rect) {
    let items: Vec<ListItem> = FIELDS
        .iter()
        .map(|field| {
            let selected = *field == state.current_field;
            let mut value = state.field_value(*field);
            if selected && state.editing && !matches!(field, ProjectField::StartDate | ProjectField::DueDate) {
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

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Project Details"));

    f.render_widget(form_list, area);
}

pub fn handle_key(state: &mut ProjectWizardState, key: KeyCode) -> Option<ProjectWizardAction> {
    match key {
        KeyCode::Esc => {
            if state.editing {
                state.toggle_editing();
            } else {
                return Some(ProjectWizardAction::Cancel);
            }
        }
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.step_field(false),
        KeyCode::Down if !state.editing => state.step_field(true),
        KeyCode::Char('s') if !state.editing => match state.validate() {
            Ok(project) => return Some(ProjectWizardAction::Save(project)),
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

pub fn handle_input(state: &mut ProjectWizardState) -> Result<Option<ProjectWizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: i32, name: &str) -> Client {
        Client {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", id),
            phone: String::new(),
            company: None,
            notes: None,
        }
    }

    fn user(id: i32, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            email: format!("{}@nexuspm.dev", id),
            role: "member".to_string(),
        }
    }

    fn wizard() -> ProjectWizardState {
        ProjectWizardState::new(
            vec![client(1, "Acme"), client(2, "Bluebird")],
            vec![user(5, "Alex"), user(6, "Priya")],
        )
    }

    fn type_text(state: &mut ProjectWizardState, text: &str) {
        for c in text.chars() {
            handle_key(state, KeyCode::Char(c));
        }
    }

    fn go_to(state: &mut ProjectWizardState, field: ProjectField) {
        while state.current_field != field {
            handle_key(state, KeyCode::Down);
        }
    }

    #[test]
    fn test_new_project_requires_a_name() {
        let mut state = wizard();
        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        assert_eq!(state.error.as_deref(), Some("invalid input: name is required"));

        handle_key(&mut state, KeyCode::Enter);
        type_text(&mut state, "Atlas");
        handle_key(&mut state, KeyCode::Enter);

        match handle_key(&mut state, KeyCode::Char('s')) {
            Some(ProjectWizardAction::Save(project)) => {
                assert_eq!(project.id, 0);
                assert_eq!(project.name, "Atlas");
                assert_eq!(project.client_id, 1);
                assert_eq!(project.status(), ProjectStatus::Planning);
            }
            _ => panic!("expected save"),
        }
    }

    #[test]
    fn test_choice_fields_cycle() {
        let mut state = wizard();
        go_to(&mut state, ProjectField::Client);
        handle_key(&mut state, KeyCode::Enter);
        handle_key(&mut state, KeyCode::Right);
        assert_eq!(state.project.client_id, 2);
        handle_key(&mut state, KeyCode::Enter);

        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Enter);
        handle_key(&mut state, KeyCode::Right);
        assert_eq!(state.project.owner_id, Some(5));
        handle_key(&mut state, KeyCode::Left);
        handle_key(&mut state, KeyCode::Left);
        assert_eq!(state.project.owner_id, Some(6));
        handle_key(&mut state, KeyCode::Enter);

        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Enter);
        handle_key(&mut state, KeyCode::Left);
        assert_eq!(state.project.status(), ProjectStatus::Cancelled);
    }

    #[test]
    fn test_due_date_before_start_is_rejected() {
        let mut state = wizard();
        state.project.name = "Atlas".to_string();
        state.project.due_date = state.project.start_date.pred_opt();
        assert!(matches!(state.validate(), Err(AppError::Validation(msg)) if msg.contains("due date")));
    }

    #[test]
    fn test_budget_must_parse() {
        let mut state = wizard();
        state.project.name = "Atlas".to_string();
        go_to(&mut state, ProjectField::Budget);
        handle_key(&mut state, KeyCode::Enter);
        for _ in 0..8 {
            handle_key(&mut state, KeyCode::Backspace);
        }
        type_text(&mut state, "1.2.3");
        handle_key(&mut state, KeyCode::Enter);
        assert!(state.validate().is_err());

        handle_key(&mut state, KeyCode::Enter);
        for _ in 0..5 {
            handle_key(&mut state, KeyCode::Backspace);
        }
        type_text(&mut state, "2500.50");
        handle_key(&mut state, KeyCode::Enter);
        assert_eq!(state.validate().unwrap().budget, 2500.5);
    }

    #[test]
    fn test_no_clients_blocks_save() {
        let mut state = ProjectWizardState::new(Vec::new(), Vec::new());
        state.project.name = "Orphan".to_string();
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_field_navigation_wraps() {
        let mut state = wizard();
        handle_key(&mut state, KeyCode::Up);
        assert_eq!(state.current_field, ProjectField::Budget);
        handle_key(&mut state, KeyCode::Down);
        assert_eq!(state.current_field, ProjectField::Name);
    }

    #[test]
    fn test_rejected_save_keeps_form_open_with_message() {
        let mut state = wizard();
        state.project.name = "Fleet Tracker".to_string();
        state.set_error("invalid input: a project named 'Fleet Tracker' already exists".to_string());
        assert!(state.error.as_deref().is_some_and(|e| e.contains("already exists")));
        assert_eq!(state.project.name, "Fleet Tracker");

        handle_key(&mut state, KeyCode::Enter);
        handle_key(&mut state, KeyCode::Char('2'));
        assert!(state.error.is_none());
        assert_eq!(state.project.name, "Fleet Tracker2");
    }
}
