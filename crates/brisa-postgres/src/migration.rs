use crate::config::PostgresConfig;
use anyhow::{bail, Context, Result};
use std::process::Command;
use tracing::{debug, info};

/// Applies goose SQL migrations to the staging database by shelling out to
/// the goose binary.
pub struct MigrationRunner {
    goose_binary_path: String,
    migrations_dir: String,
    dsn: String,
}

impl MigrationRunner {
    pub fn new(config: &PostgresConfig) -> Self {
        Self {
            goose_binary_path: config.goose_binary_path.clone(),
            migrations_dir: config.migrations_dir.clone(),
            dsn: config.dsn(),
        }
    }

    /// Apply all pending migrations (`goose up`).
    pub async fn run_migrations(&self) -> Result<()> {
        info!(migrations_dir = %self.migrations_dir, "running staging store migrations");

        let output = Command::new(&self.goose_binary_path)
            .args(["-dir", &self.migrations_dir, "postgres", &self.dsn, "up"])
            .output()
            .context("failed to execute goose")?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("migration failed.\nstdout: {stdout}\nstderr: {stderr}");
        }

        debug!("migrations completed");
        Ok(())
    }
}
