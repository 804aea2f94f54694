mod cli;
mod config;
mod connection;
mod db;
mod deploy_check;
mod error;
mod logging;
mod models;
mod seed;
mod ui;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{error, info};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::error::validation_message;
use crate::logging::LogTarget;
use crate::seed::SeedOptions;
use crate::ui::{
    project_wizard::{handle_input as handle_project_wizard_input, render_project_wizard, ProjectWizardAction, ProjectWizardState},
    projects::{handle_input as handle_projects_input, load_projects_state, render_projects, ProjectAction, ProjectsState},
    task_wizard::{handle_input as handle_task_wizard_input, render_task_wizard, TaskWizardAction, TaskWizardState},
    tasks::{handle_input as handle_tasks_input, load_tasks_state, reload_tasks_state, render_tasks, TaskAction, TasksState},
};

// Represents the current screen in the app
enum AppScreen {
    Projects,
    Tasks(i32),      // Contains project_id
    ProjectWizard,
    TaskWizard(i32), // Contains project_id
}

// Main application state
struct AppState {
    db: db::Database,
    screen: AppScreen,
    projects_state: Option<ProjectsState>,
    tasks_state: Option<TasksState>,
    project_wizard_state: Option<ProjectWizardState>,
    task_wizard_state: Option<TaskWizardState>,
}

impl AppState {
    fn new(db: db::Database) -> Self {
        Self {
            db,
            screen: AppScreen::Projects,
            projects_state: None,
            tasks_state: None,
            project_wizard_state: None,
            task_wizard_state: None,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command_or_default() {
        Commands::VerifyDeploy { root } => {
            logging::init_default();
            deploy_check::run(root)
        }
        command => run_command(command).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run_command(command: &Commands) -> Result<()> {
    let config = config::init()?;

    if let Commands::Dashboard = command {
        logging::init(&config, LogTarget::File)?;
        return run_dashboard(&config).await;
    }
    logging::init(&config, LogTarget::Stderr)?;

    match command {
        Commands::Migrate => {
            let db = db::init(&config).await?;
            db.migrate().await?;
            println!("Migrations applied.");
            Ok(())
        }
        Commands::Seed { env, force, fresh } => {
            let options = SeedOptions {
                env: env.clone(),
                force: *force,
                fresh: *fresh,
            };
            seed::run(&config, options).await
        }
        Commands::TestConnection => connection::run(&config).await,
        Commands::Dashboard | Commands::VerifyDeploy { .. } => Ok(()),
    }
}

async fn run_dashboard(config: &Config) -> Result<()> {
    println!("Starting NexusPM...");
    let db = db::init(config).await?;
    info!(environment = %config.environment(), "dashboard starting");

    // Create app state
    let mut app_state = AppState::new(db);
    load_projects_screen(&mut app_state, None).await?;

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;
    info!("dashboard closed");
    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| match app_state.screen {
            AppScreen::Projects => {
                if let Some(state) = &mut app_state.projects_state {
                    render_projects(f, state);
                }
            }
            AppScreen::Tasks(_) => {
                if let Some(state) = &mut app_state.tasks_state {
                    render_tasks(f, state);
                }
            }
            AppScreen::ProjectWizard => {
                if let Some(state) = &mut app_state.project_wizard_state {
                    render_project_wizard(f, state);
                }
            }
            AppScreen::TaskWizard(_) => {
                if let Some(state) = &mut app_state.task_wizard_state {
                    render_task_wizard(f, state);
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Projects => handle_projects_screen(app_state).await?,
            AppScreen::Tasks(_) => handle_tasks_screen(app_state).await?,
            AppScreen::ProjectWizard => handle_project_wizard_screen(app_state).await?,
            AppScreen::TaskWizard(_) => handle_task_wizard_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn load_projects_screen(app_state: &mut AppState, select: Option<i32>) -> Result<()> {
    let mut state = load_projects_state(&app_state.db).await?;
    if let Some(project_id) = select {
        state.select_project(project_id);
    }

    app_state.projects_state = Some(state);
    app_state.screen = AppScreen::Projects;
    Ok(())
}

async fn load_tasks_screen(app_state: &mut AppState, project_id: i32, select: Option<i32>) -> Result<()> {
    let mut state = match &app_state.tasks_state {
        Some(current) if current.project_id() == project_id => reload_tasks_state(&app_state.db, current).await?,
        _ => load_tasks_state(&app_state.db, project_id).await?,
    };
    if let Some(task_id) = select {
        state.select_task(task_id);
    }

    app_state.tasks_state = Some(state);
    app_state.screen = AppScreen::Tasks(project_id);
    Ok(())
}

async fn handle_projects_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match app_state.projects_state.as_mut() {
        Some(state) => handle_projects_input(state)?,
        None => None,
    };

    match action {
        Some(ProjectAction::Exit) => return Ok(true),
        Some(ProjectAction::SelectProject(project_id)) => {
            app_state.tasks_state = Some(load_tasks_state(&app_state.db, project_id).await?);
            app_state.screen = AppScreen::Tasks(project_id);
        }
        Some(ProjectAction::DeleteProject(project_id)) => {
            app_state.db.delete_project(project_id).await?;
            load_projects_screen(app_state, None).await?;
        }
        Some(ProjectAction::EditProject(project_id)) => {
            let project = app_state.db.get_project(project_id).await?;
            let clients = app_state.db.load_clients().await?;
            let users = app_state.db.load_users().await?;

            app_state.project_wizard_state = Some(ProjectWizardState::from_existing(project, clients, users));
            app_state.screen = AppScreen::ProjectWizard;
        }
        Some(ProjectAction::NewProject) => {
            let clients = app_state.db.load_clients().await?;
            let users = app_state.db.load_users().await?;

            app_state.project_wizard_state = Some(ProjectWizardState::new(clients, users));
            app_state.screen = AppScreen::ProjectWizard;
        }
        None => {}
    }

    Ok(false)
}

async fn handle_tasks_screen(app_state: &mut AppState) -> Result<bool> {
    let (action, project_id) = match app_state.tasks_state.as_mut() {
        Some(state) => (handle_tasks_input(state)?, state.project_id()),
        None => return Ok(false),
    };

    match action {
        Some(TaskAction::Back) => {
            load_projects_screen(app_state, Some(project_id)).await?;
        }
        Some(TaskAction::SetStatus(task_id, status)) => {
            app_state.db.set_task_status(task_id, status).await?;
            load_tasks_screen(app_state, project_id, Some(task_id)).await?;
        }
        Some(TaskAction::DeleteTask(task_id)) => {
            app_state.db.delete_task(task_id).await?;
            load_tasks_screen(app_state, project_id, None).await?;
        }
        Some(TaskAction::EditTask(task_id)) => {
            let task = app_state.db.get_task(task_id).await?;
            let users = app_state.db.load_users().await?;

            app_state.task_wizard_state = Some(TaskWizardState::from_existing(task, users));
            app_state.screen = AppScreen::TaskWizard(project_id);
        }
        Some(TaskAction::NewTask(project_id)) => {
            let users = app_state.db.load_users().await?;

            app_state.task_wizard_state = Some(TaskWizardState::new(project_id, users));
            app_state.screen = AppScreen::TaskWizard(project_id);
        }
        None => {}
    }

    Ok(false)
}

async fn handle_project_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match app_state.project_wizard_state.as_mut() {
        Some(state) => handle_project_wizard_input(state)?,
        None => None,
    };

    match action {
        Some(ProjectWizardAction::Cancel) => {
            app_state.project_wizard_state = None;
            app_state.screen = AppScreen::Projects;
        }
        Some(ProjectWizardAction::Save(project)) => {
            let saved = app_state.db.save_project(&project).await;
            match saved {
                Ok(project_id) => {
                    app_state.project_wizard_state = None;
                    load_projects_screen(app_state, Some(project_id)).await?;
                }
                Err(err) => {
                    // Stay on the form so the user can fix the input
                    let message = validation_message(err)?;
                    if let Some(state) = app_state.project_wizard_state.as_mut() {
                        state.set_error(message);
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_task_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let (action, project_id) = match app_state.task_wizard_state.as_mut() {
        Some(state) => (handle_task_wizard_input(state)?, state.project_id()),
        None => return Ok(false),
    };

    match action {
        Some(TaskWizardAction::Cancel) => {
            app_state.task_wizard_state = None;
            app_state.screen = AppScreen::Tasks(project_id);
        }
        Some(TaskWizardAction::Save(task)) => {
            let saved = app_state.db.save_task(&task).await;
            match saved {
                Ok(task_id) => {
                    app_state.task_wizard_state = None;
                    load_tasks_screen(app_state, project_id, Some(task_id)).await?;
                }
                Err(err) => {
                    let message = validation_message(err)?;
                    if let Some(state) = app_state.task_wizard_state.as_mut() {
                        state.set_error(message);
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}
