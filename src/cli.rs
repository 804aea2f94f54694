use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "nexus_pm")]
#[command(about = "Project management dashboard for a small software agency")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Open the terminal dashboard (default)
    Dashboard,

    /// Apply pending schema migrations
    Migrate,

    /// Load the sample agency data set
    Seed {
        /// Environment name to check instead of APP_ENV
        #[arg(long)]
        env: Option<String>,

        /// Seed even when the environment is not safe for seeding
        #[arg(long)]
        force: bool,

        /// Empty every table first
        #[arg(long)]
        fresh: bool,
    },

    /// Check that the database is reachable and report table sizes
    TestConnection,

    /// Run the pre-deploy checklist against a project checkout
    VerifyDeploy {
        /// Project root to inspect
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

impl Cli {
    pub fn command_or_default(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Dashboard)
    }
}
