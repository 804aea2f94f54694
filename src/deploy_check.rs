//! Pre-deploy checklist.
//!
//! Inspects a checkout for the files a release build and the hosting
//! platform need. Critical findings fail the command (exit code 1);
//! warnings are printed but do not block a deploy.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, error};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub check: &'static str,
    pub message: String,
}

/// Result of one named check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub check: &'static str,
    pub finding: Option<Finding>,
}

impl CheckOutcome {
    fn pass(check: &'static str) -> Self {
        Self { check, finding: None }
    }

    fn fail(check: &'static str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            check,
            finding: Some(Finding { severity, check, message: message.into() }),
        }
    }
}

#[derive(Debug)]
pub struct DeployReport {
    pub root: PathBuf,
    pub outcomes: Vec<CheckOutcome>,
}

impl DeployReport {
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.outcomes.iter().filter_map(|o| o.finding.as_ref())
    }

    pub fn critical_count(&self) -> usize {
        self.findings().filter(|f| f.severity == Severity::Critical).count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings().filter(|f| f.severity == Severity::Warning).count()
    }

    pub fn is_deployable(&self) -> bool {
        self.critical_count() == 0
    }

    pub fn print(&self) {
        println!("Deploy checklist for {}", self.root.display());
        for outcome in &self.outcomes {
            match &outcome.finding {
                None => println!("  ✓ {}", outcome.check),
                Some(f) if f.severity == Severity::Critical => {
                    println!("  ✗ {}: {}", outcome.check, f.message)
                }
                Some(f) => println!("  ! {}: {}", outcome.check, f.message),
            }
        }
        println!(
            "{} check(s), {} critical, {} warning(s)",
            self.outcomes.len(),
            self.critical_count(),
            self.warning_count()
        );
    }
}

/// Runs the checklist against a project root
pub struct DeployChecker {
    root: PathBuf,
    database_url_set: bool,
}

impl DeployChecker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            database_url_set: std::env::var_os("DATABASE_URL").is_some(),
        }
    }

    /// Override the environment lookup, for tests
    pub fn with_database_url_set(mut self, set: bool) -> Self {
        self.database_url_set = set;
        self
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn run(&self) -> DeployReport {
        let outcomes = vec![
            self.check_manifest(),
            self.check_entry_point(),
            self.check_migrations(),
            self.check_env_example(),
            self.check_lockfile(),
            self.check_readme(),
            self.check_gitignore(),
            self.check_database_url(),
        ];

        for outcome in &outcomes {
            debug!(check = outcome.check, passed = outcome.finding.is_none(), "deploy check");
        }

        DeployReport { root: self.root.clone(), outcomes }
    }

    fn check_manifest(&self) -> CheckOutcome {
        const CHECK: &str = "Cargo.toml";
        let content = match fs::read_to_string(self.path("Cargo.toml")) {
            Ok(content) => content,
            Err(_) => return CheckOutcome::fail(CHECK, Severity::Critical, "missing Cargo.toml"),
        };

        let manifest: toml::Table = match content.parse() {
            Ok(manifest) => manifest,
            Err(err) => {
                return CheckOutcome::fail(CHECK, Severity::Critical, format!("Cargo.toml does not parse: {}", err))
            }
        };

        let has_name = manifest
            .get("package")
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .is_some_and(|n| !n.is_empty());
        if has_name {
            CheckOutcome::pass(CHECK)
        } else {
            CheckOutcome::fail(CHECK, Severity::Critical, "Cargo.toml has no package.name")
        }
    }

    fn check_entry_point(&self) -> CheckOutcome {
        const CHECK: &str = "src/main.rs";
        if self.path("src/main.rs").is_file() {
            CheckOutcome::pass(CHECK)
        } else {
            CheckOutcome::fail(CHECK, Severity::Critical, "missing binary entry point src/main.rs")
        }
    }

    fn check_migrations(&self) -> CheckOutcome {
        const CHECK: &str = "migrations";
        let entries = match fs::read_dir(self.path("migrations")) {
            Ok(entries) => entries,
            Err(_) => return CheckOutcome::fail(CHECK, Severity::Critical, "missing migrations/ directory"),
        };

        let has_sql = entries
            .filter_map(|e| e.ok())
            .any(|e| e.path().extension().is_some_and(|ext| ext == "sql"));
        if has_sql {
            CheckOutcome::pass(CHECK)
        } else {
            CheckOutcome::fail(CHECK, Severity::Critical, "migrations/ contains no .sql files")
        }
    }

    fn check_env_example(&self) -> CheckOutcome {
        const CHECK: &str = ".env.example";
        match fs::read_to_string(self.path(".env.example")) {
            Err(_) => CheckOutcome::fail(CHECK, Severity::Critical, "missing .env.example"),
            Ok(content) if !declares_var(&content, "DATABASE_URL") => CheckOutcome::fail(
                CHECK,
                Severity::Critical,
                ".env.example does not document DATABASE_URL",
            ),
            Ok(_) => CheckOutcome::pass(CHECK),
        }
    }

    fn check_lockfile(&self) -> CheckOutcome {
        optional_file(&self.root, "Cargo.lock", "builds are not reproducible without Cargo.lock")
    }

    fn check_readme(&self) -> CheckOutcome {
        optional_file(&self.root, "README.md", "missing README.md")
    }

    fn check_gitignore(&self) -> CheckOutcome {
        const CHECK: &str = ".gitignore";
        match fs::read_to_string(self.path(".gitignore")) {
            Err(_) => CheckOutcome::fail(CHECK, Severity::Warning, "missing .gitignore"),
            Ok(content) if !content.lines().any(|l| matches!(l.trim(), ".env" | "/.env")) => {
                CheckOutcome::fail(CHECK, Severity::Warning, ".env is not ignored")
            }
            Ok(_) => CheckOutcome::pass(CHECK),
        }
    }

    fn check_database_url(&self) -> CheckOutcome {
        const CHECK: &str = "DATABASE_URL";
        if self.database_url_set {
            CheckOutcome::pass(CHECK)
        } else {
            CheckOutcome::fail(
                CHECK,
                Severity::Warning,
                "DATABASE_URL is not set here; make sure the platform provides it",
            )
        }
    }
}

fn optional_file(root: &Path, name: &'static str, message: &str) -> CheckOutcome {
    if root.join(name).is_file() {
        CheckOutcome::pass(name)
    } else {
        CheckOutcome::fail(name, Severity::Warning, message)
    }
}

/// `KEY=...` on its own line, ignoring comments and an optional `export`
fn declares_var(content: &str, key: &str) -> bool {
    content.lines().map(str::trim).any(|line| {
        let line = line.strip_prefix("export ").unwrap_or(line);
        !line.starts_with('#')
            && line
                .split_once('=')
                .is_some_and(|(name, _)| name.trim() == key)
    })
}

/// Entry point for `nexus_pm verify-deploy`
pub fn run(root: &Path) -> Result<()> {
    let report = DeployChecker::new(root).run();
    report.print();

    if !report.is_deployable() {
        error!(critical = report.critical_count(), "deploy verification failed");
        return Err(AppError::DeployCheckFailed(report.critical_count()).into());
    }

    println!("Ready to deploy.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn complete_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "Cargo.toml", "[package]\nname = \"nexus_pm\"\nversion = \"0.1.0\"\n");
        write(root, "Cargo.lock", "version = 3\n");
        write(root, "src/main.rs", "fn main() {}\n");
        write(root, "migrations/20240115000000_init.sql", "CREATE TABLE users (id SERIAL);\n");
        write(root, ".env.example", "# local database\nDATABASE_URL=postgres://localhost/nexus\n");
        write(root, "README.md", "# NexusPM\n");
        write(root, ".gitignore", "/target\n.env\n");
        dir
    }

    fn check(dir: &TempDir) -> DeployReport {
        DeployChecker::new(dir.path()).with_database_url_set(true).run()
    }

    #[test]
    fn test_complete_project_passes() {
        let dir = complete_project();
        let report = check(&dir);
        assert!(report.is_deployable());
        assert_eq!(report.findings().count(), 0);
        assert!(run(dir.path()).is_ok());
    }

    #[test]
    fn test_missing_required_file_fails() {
        let dir = complete_project();
        fs::remove_file(dir.path().join("src/main.rs")).unwrap();

        let report = check(&dir);
        assert!(!report.is_deployable());
        assert_eq!(report.critical_count(), 1);

        let err = run(dir.path()).unwrap_err();
        assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::DeployCheckFailed(1))));
    }

    #[test]
    fn test_empty_directory_reports_every_critical_check() {
        let dir = TempDir::new().unwrap();
        let report = check(&dir);
        let critical: Vec<_> = report
            .findings()
            .filter(|f| f.severity == Severity::Critical)
            .map(|f| f.check)
            .collect();
        assert_eq!(critical, vec!["Cargo.toml", "src/main.rs", "migrations", ".env.example"]);
    }

    #[test]
    fn test_manifest_without_package_name() {
        let dir = complete_project();
        write(dir.path(), "Cargo.toml", "[workspace]\nmembers = []\n");
        let report = check(&dir);
        let finding = report.findings().next().unwrap();
        assert_eq!(finding.check, "Cargo.toml");
        assert_eq!(finding.message, "Cargo.toml has no package.name");
    }

    #[test]
    fn test_migrations_need_sql_files() {
        let dir = complete_project();
        fs::remove_file(dir.path().join("migrations/20240115000000_init.sql")).unwrap();
        write(dir.path(), "migrations/README", "schema lives here\n");
        assert_eq!(check(&dir).critical_count(), 1);
    }

    #[test]
    fn test_env_example_must_document_database_url() {
        let dir = complete_project();
        write(dir.path(), ".env.example", "# DATABASE_URL=postgres://localhost/nexus\nAPP_ENV=development\n");
        assert_eq!(check(&dir).critical_count(), 1);

        write(dir.path(), ".env.example", "export DATABASE_URL=postgres://localhost/nexus\n");
        assert_eq!(check(&dir).critical_count(), 0);
    }

    #[test]
    fn test_warnings_do_not_block_deploy() {
        let dir = complete_project();
        fs::remove_file(dir.path().join("README.md")).unwrap();
        fs::remove_file(dir.path().join("Cargo.lock")).unwrap();
        write(dir.path(), ".gitignore", "/target\n");

        let report = DeployChecker::new(dir.path()).with_database_url_set(false).run();
        assert!(report.is_deployable());
        assert_eq!(report.warning_count(), 4);
    }
}
