#![cfg(test)]
use configs::DatabaseConfig;
use migration::MigratorTrait;
use models::db::{connect_with_config, database_url};
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> DatabaseConfig {
    let mut cfg = DatabaseConfig { url: database_url(), ..Default::default() };
    cfg.max_connections = cfg.max_connections.max(10);
    cfg.min_connections = 1;
    cfg.connect_timeout_secs = 5;
    cfg.acquire_timeout_secs = 10;
    cfg
}

/// Fresh connection for the calling test's runtime; `Err` when no database is reachable.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    // Run migrations exactly once, with a throwaway connection
    let migrated = *MIGRATED
        .get_or_init(|| async {
            let db = match connect_with_config(&test_config()).await {
                Ok(db) => db,
                Err(e) => {
                    eprintln!("skip: cannot connect to db: {}", e);
                    return false;
                }
            };
            if let Err(e) = migration::Migrator::up(&db, None).await {
                eprintln!("skip: migrate up failed: {}", e);
                return false;
            }
            true
        })
        .await;
    if !migrated {
        anyhow::bail!("database unavailable");
    }

    let db = connect_with_config(&test_config()).await?;
    Ok(db)
}
