use std::process::ExitCode;

use configs::{AppConfig, LogFormat};
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging(cfg: &AppConfig) {
    match cfg.log.format {
        LogFormat::Json => common::utils::logging::init_logging_json(Some(&cfg.log.level)),
        LogFormat::Compact => common::utils::logging::init_logging_compact(Some(&cfg.log.level)),
    }
    info!(service = "subscriptions", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> ExitCode {
    // .env must be loaded before RUST_LOG and DATABASE_URL are read
    dotenv().ok();

    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "subscriptions", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&cfg);

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "subscriptions",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "subscriptions", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "subscriptions",
        event = "start",
        %service_id,
        pid,
        version,
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "subscriptions service starting"
    );

    // server::run returns once the graceful shutdown has drained
    rt.block_on(async move {
        match server::run(cfg).await {
            Ok(()) => {
                info!(service = "subscriptions", event = "stop", %service_id, pid, "server stopped normally");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "subscriptions", event = "run_failed", error = %e, "server::run returned error");
                ExitCode::FAILURE
            }
        }
    })
}
