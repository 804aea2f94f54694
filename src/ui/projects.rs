use anyhow::Result;
use chrono::{NaiveDate, Utc};
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::db::Database;
use crate::models::{CalendarEvent, DashboardStats, ProjectCard, ProjectStatus, COMPANY_NAME};
use crate::ui::components::{next_index, previous_index, render_delete_confirmation};

/// How far ahead the events panel looks
pub const UPCOMING_EVENT_DAYS: i64 = 14;

// Represents the state of the project overview screen
pub struct ProjectsState {
    company_name: String,
    cards: Vec<ProjectCard>,
    stats: DashboardStats,
    events: Vec<CalendarEvent>,
    table_state: TableState,
    show_delete_confirmation: bool,
}

impl ProjectsState {
    pub fn new(company_name: String, cards: Vec<ProjectCard>, events: Vec<CalendarEvent>) -> Self {
        let mut table_state = TableState::default();
        if !cards.is_empty() {
            table_state.select(Some(0));
        }

        Self {
            company_name,
            stats: DashboardStats::compute(&cards),
            cards,
            events,
            table_state,
            show_delete_confirmation: false,
        }
    }

    /// Keep the highlight on `project_id` after a reload, if it still exists
    pub fn select_project(&mut self, project_id: i32) {
        if let Some(i) = self.cards.iter().position(|c| c.id() == project_id) {
            self.table_state.select(Some(i));
        }
    }

    pub fn next(&mut self) {
        let i = next_index(self.table_state.selected(), self.cards.len());
        self.table_state.select(i);
    }

    pub fn previous(&mut self) {
        let i = previous_index(self.table_state.selected(), self.cards.len());
        self.table_state.select(i);
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    pub fn selected_card(&self) -> Option<&ProjectCard> {
        self.table_state.selected().and_then(|i| self.cards.get(i))
    }

    pub fn selected_project_id(&self) -> Option<i32> {
        self.selected_card().map(|c| c.id())
    }

    pub fn stats(&self) -> &DashboardStats {
        &self.stats
    }
}

pub enum ProjectAction {
    Exit,
    NewProject,
    EditProject(i32),
    DeleteProject(i32),
    SelectProject(i32),
}

/// Load everything the overview shows
pub async fn load_projects_state(db: &Database) -> Result<ProjectsState> {
    let now = Utc::now();
    let cards = db.load_project_cards(now.date_naive()).await?;
    let events = db.load_upcoming_events(now, UPCOMING_EVENT_DAYS).await?;
    let company_name = db
        .load_settings()
        .await?
        .into_iter()
        .find(|s| s.key == COMPANY_NAME)
        .map(|s| s.value)
        .unwrap_or_else(|| "NexusPM".to_string());

    Ok(ProjectsState::new(company_name, cards, events))
}

fn status_color(status: ProjectStatus) -> Color {
    match status {
        ProjectStatus::Planning => Color::Cyan,
        ProjectStatus::Active => Color::Green,
        ProjectStatus::OnHold => Color::Yellow,
        ProjectStatus::Completed => Color::Blue,
        ProjectStatus::Cancelled => Color::DarkGray,
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn render_projects<B: Backend>(frame: &mut Frame<B>, state: &mut ProjectsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(7),
            Constraint::Length(3),
        ].as_ref())
        .split(frame.size());

    render_header(frame, state, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(chunks[1]);

    render_project_table(frame, state, body[0]);
    render_detail(frame, state, body[1]);
    render_events(frame, state, chunks[2]);

    let buttons_text = if state.selected_card().is_some() {
        "<N> New Project | <E> Edit | <D> Delete | <Enter> View Tasks | <Q> Quit"
    } else {
        "<N> New Project | <Q> Quit"
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[3]);

    if state.show_delete_confirmation {
        render_delete_confirmation(
            frame,
            "project",
            "Its tasks, deliverables, resources and events will also be deleted.",
        );
    }
}

fn render_header<B: Backend>(frame: &mut Frame<B>, state: &ProjectsState, area: Rect) {
    let stats = state.stats();
    let header = Paragraph::new(Spans::from(vec![
        Span::styled(
            format!("{} ", state.company_name),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "| Projects: {} ({} active) | Open tasks: {} | ",
            stats.total_projects, stats.active_projects, stats.open_tasks
        )),
        Span::styled(
            format!("Overdue: {}", stats.overdue_tasks),
            if stats.overdue_tasks > 0 {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            },
        ),
        Span::raw(format!(" | Complete: {}%", stats.completion_percent)),
    ]))
    .block(Block::default().title("Project Overview").borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn render_project_table<B: Backend>(frame: &mut Frame<B>, state: &mut ProjectsState, area: Rect) {
    let header = Row::new(vec!["Project", "Client", "Status", "Done", "Due"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = state
        .cards
        .iter()
        .map(|card| {
            let project = &card.item.project;
            let status = project.status();
            Row::new(vec![
                Cell::from(project.name.clone()),
                Cell::from(card.item.client_name.clone()),
                Cell::from(status.label()).style(Style::default().fg(status_color(status))),
                Cell::from(format!("{}%", card.counts.completion_percent())),
                Cell::from(format_date(project.due_date)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(24),
        Constraint::Percentage(16),
        Constraint::Percentage(10),
        Constraint::Percentage(20),
    ];
    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Projects").borders(Borders::ALL))
        .widths(&widths)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(table, area, &mut state.table_state);
}

fn render_detail<B: Backend>(frame: &mut Frame<B>, state: &ProjectsState, area: Rect) {
    let card = match state.selected_card() {
        Some(card) => card,
        None => {
            let empty = Paragraph::new("No projects yet. Press <N> to create one.")
                .block(Block::default().title("Details").borders(Borders::ALL));
            frame.render_widget(empty, area);
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),
            Constraint::Length(3),
            Constraint::Min(4),
        ].as_ref())
        .split(area);

    let project = &card.item.project;
    let label = Style::default().fg(Color::Yellow);
    let technologies = card
        .technologies
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let info = Paragraph::new(vec![
        Spans::from(vec![Span::styled("Client: ", label), Span::raw(card.item.client_name.clone())]),
        Spans::from(vec![
            Span::styled("Owner: ", label),
            Span::raw(card.item.owner_name.clone().unwrap_or_else(|| "Unassigned".to_string())),
        ]),
        Spans::from(vec![Span::styled("Dates: ", label), Span::raw(project.date_range())]),
        Spans::from(vec![Span::styled("Budget: ", label), Span::raw(format!("${:.2}", project.budget))]),
        Spans::from(vec![
            Span::styled("Tasks: ", label),
            Span::raw(format!(
                "{} to do, {} in progress, {} in review, {} done",
                card.counts.todo, card.counts.in_progress, card.counts.review, card.counts.done
            )),
        ]),
        Spans::from(vec![
            Span::styled("Stack: ", label),
            Span::raw(if technologies.is_empty() { "-".to_string() } else { technologies }),
        ]),
        Spans::from(Span::raw(project.description.clone())),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().title(project.name.clone()).borders(Borders::ALL));
    frame.render_widget(info, chunks[0]);

    let gauge = Gauge::default()
        .block(Block::default().title("Progress").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .percent(card.counts.completion_percent());
    frame.render_widget(gauge, chunks[1]);

    let mut items: Vec<ListItem> = card
        .deliverables
        .iter()
        .map(|d| {
            ListItem::new(Spans::from(vec![
                Span::raw(format!("◆ {} ", d.name)),
                Span::styled(format!("[{}]", d.status()), Style::default().fg(Color::Cyan)),
                Span::raw(format!(" due {}", format_date(d.due_date))),
            ]))
        })
        .collect();
    items.extend(card.resources.iter().map(|r| {
        ListItem::new(Spans::from(vec![
            Span::styled(format!("↗ {} ", r.name), Style::default().fg(Color::Gray)),
            Span::raw(r.url.clone()),
        ]))
    }));

    let list = List::new(items)
        .block(Block::default().title("Deliverables & Resources").borders(Borders::ALL));
    frame.render_widget(list, chunks[2]);
}

fn render_events<B: Backend>(frame: &mut Frame<B>, state: &ProjectsState, area: Rect) {
    let items: Vec<ListItem> = if state.events.is_empty() {
        vec![ListItem::new("Nothing scheduled")]
    } else {
        state
            .events
            .iter()
            .map(|e| {
                ListItem::new(Spans::from(vec![
                    Span::styled(format!("{:<28}", e.when()), Style::default().fg(Color::Yellow)),
                    Span::raw(e.title.clone()),
                ]))
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .title(format!("Next {} days", UPCOMING_EVENT_DAYS))
            .borders(Borders::ALL),
    );
    frame.render_widget(list, area);
}

/// Map one key press to an action, updating selection state in place
pub fn handle_key(state: &mut ProjectsState, key: KeyCode) -> Option<ProjectAction> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.toggle_delete_confirmation();
                return state.selected_project_id().map(ProjectAction::DeleteProject);
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                state.toggle_delete_confirmation();
            }
            _ => {}
        }
        return None;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => Some(ProjectAction::Exit),
        KeyCode::Char('n') => Some(ProjectAction::NewProject),
        KeyCode::Char('e') => state.selected_project_id().map(ProjectAction::EditProject),
        KeyCode::Char('d') => {
            if state.selected_card().is_some() {
                state.toggle_delete_confirmation();
            }
            None
        }
        KeyCode::Down => {
            state.next();
            None
        }
        KeyCode::Up => {
            state.previous();
            None
        }
        KeyCode::Enter => state.selected_project_id().map(ProjectAction::SelectProject),
        _ => None,
    }
}

pub fn handle_input(state: &mut ProjectsState) -> Result<Option<ProjectAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}
