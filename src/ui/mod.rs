pub mod components;
pub mod project_wizard;
pub mod projects;
pub mod task_wizard;
pub mod tasks;
