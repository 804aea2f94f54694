use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use url::Url;

use crate::config::Config;
use crate::db::{self, TABLES};

/// Replace the password in a connection URL with `****`
pub fn mask_database_url(url_str: &str) -> String {
    match Url::parse(url_str) {
        Ok(mut url) => {
            if url.password().is_some() && url.set_password(Some("****")).is_err() {
                return "<unprintable database url>".to_string();
            }
            url.to_string()
        }
        Err(_) => url_str.to_string(),
    }
}

/// Postgres `undefined_table`
const UNDEFINED_TABLE: &str = "42P01";

/// True only when the query failed because the table does not exist
pub fn is_missing_table(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .and_then(|e| e.code())
        .is_some_and(|code| code == UNDEFINED_TABLE)
}

/// Entry point for `nexus_pm test-connection`
pub async fn run(config: &Config) -> Result<()> {
    println!("Testing connection to {}", mask_database_url(config.database_url()));

    let timeout = Duration::from_secs(config.db_connect_timeout_secs);
    let db = tokio::time::timeout(timeout, db::init(config))
        .await
        .with_context(|| format!("timed out after {}s connecting to the database", timeout.as_secs()))?
        .context("could not connect to the database")?;

    let version = db.server_version().await?;
    info!(%version, "connected");
    println!("✓ Connected: {}", version);

    let mut missing = 0;
    println!("Tables:");
    for table in TABLES {
        match db.count_rows(table).await {
            Ok(count) => println!("  {:<22} {:>6} rows", table, count),
            Err(err) if is_missing_table(&err) => {
                missing += 1;
                warn!(table, "table does not exist");
                println!("  {:<22} missing", table);
            }
            Err(err) => {
                error!(table, error = %err, "could not count rows");
                return Err(err.context(format!("could not count rows in {}", table)));
            }
        }
    }

    if missing > 0 {
        error!(missing, "schema incomplete");
        println!("! {} table(s) missing; run `nexus_pm migrate`", missing);
    }

    Ok(())
}
