use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log destination while the dashboard owns the terminal
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub db_connect_timeout_secs: u64,
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "nexus_pm.log".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    5
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are loaded first if the file exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn environment(&self) -> Environment {
        self.app_env.parse().unwrap_or_default()
    }
}

/// Deployment environment, used to gate destructive commands like seeding
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Staging,
    Production,
    Custom(String),
}

impl Environment {
    pub fn as_str(&self) -> &str {
        match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Staging => "staging",
            Environment::Production => "production",
            Environment::Custom(name) => name,
        }
    }

    /// Production and unknown environments require an explicit `--force`
    pub fn is_safe_for_seeding(&self) -> bool {
        matches!(
            self,
            Environment::Development | Environment::Testing | Environment::Staging
        )
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "testing" | "test" => Environment::Testing,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            custom => Environment::Custom(custom.to_string()),
        })
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}
