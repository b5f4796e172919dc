use std::{sync::Arc, time::Duration};

use axum::Router;
use configs::{AppConfig, DatabaseConfig};
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::subscription::repo::seaorm::SeaOrmSubscriptionRepository;
use service::subscription::repository::SubscriptionRepository;

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

const CONNECT_ATTEMPTS: u32 = 10;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Bind `host:port`; hostnames such as `localhost` are resolved.
async fn bind_listener(cfg: &AppConfig) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind((cfg.server.host.as_str(), cfg.server.port))
        .await
        .map_err(|e| StartupError::InvalidConfig(format!("bind {}:{}: {}", cfg.server.host, cfg.server.port, e)))?;
    Ok(listener)
}

/// Connect with linear backoff; the database may come up after the service.
async fn connect_with_retry(cfg: &DatabaseConfig) -> Result<DatabaseConnection, StartupError> {
    let mut last = String::new();
    for attempt in 0..CONNECT_ATTEMPTS {
        match models::db::connect_with_config(cfg).await {
            Ok(db) => return Ok(db),
            Err(e) => {
                last = e.to_string();
                let wait = Duration::from_secs(u64::from(2 * attempt + 1));
                warn!(attempt = attempt + 1, error = %e, wait_secs = wait.as_secs(), "database connect failed");
                if attempt + 1 < CONNECT_ATTEMPTS {
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
    Err(StartupError::Database { attempts: CONNECT_ATTEMPTS, last })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received, draining connections");
}

/// Build the app from `cfg` and serve until a shutdown signal arrives.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let db = connect_with_retry(&cfg.database).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!("migrations applied");
    }

    let repo: Arc<dyn SubscriptionRepository> = Arc::new(
        SeaOrmSubscriptionRepository::new(db.clone())
            .with_query_timeout(Duration::from_secs(cfg.database.query_timeout_secs)),
    );
    let app: Router = routes::build_router(ServerState::new(repo), build_cors());

    let listener = bind_listener(&cfg).await?;
    info!(addr = %listener.local_addr()?, "starting subscriptions server");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    if let Err(e) = db.close().await {
        warn!(error = %e, "closing database pool failed");
    }
    info!("server stopped");
    Ok(())
}
