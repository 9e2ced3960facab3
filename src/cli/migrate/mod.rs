//! Migrate command - applies pending schema migrations and exits

use clap::Args;
use tracing::{info, warn};

use super::bootstrap;
use crate::config::DatabaseBackend;
use crate::infrastructure::storage::{
    run_schema_migrations, schema_migrations, PostgresConfig, PostgresMigrator,
};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead of applying
    #[arg(long)]
    pub revert_last: bool,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = bootstrap()?;

    if config.database.backend == DatabaseBackend::Memory {
        info!("In-memory backend configured, nothing to migrate");
        return Ok(());
    }

    let pool = PostgresConfig::new(config.database.url.clone())
        .with_max_connections(1)
        .with_min_connections(0)
        .with_acquire_timeout(config.database.acquire_timeout_secs)
        .connect()
        .await?;

    let migrator = PostgresMigrator::new(pool.clone());

    if args.revert_last {
        let current = migrator.current_version().await?;
        let latest = schema_migrations()
            .into_iter()
            .find(|m| Some(m.version) == current);

        match latest {
            Some(migration) => {
                migrator.revert_migration(&migration).await?;
            }
            None => warn!(version = ?current, "No known migration to revert"),
        }
    } else {
        let applied = run_schema_migrations(&pool).await?;
        info!(applied, "Migrations complete");
    }

    let version = migrator.current_version().await?;
    info!(version = ?version, "Schema version");

    pool.close().await;
    Ok(())
}
