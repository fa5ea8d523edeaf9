use std::sync::Arc;

use tokio::sync::Notify;

use campus_portal::config::{AppState, Config};
use campus_portal::error::StartupError;
use campus_portal::logger::{self, ServerLogger};
use campus_portal::server;

/// Config file used when no path is given on the command line
const DEFAULT_CONFIG: &str = "config";

fn main() {
    if let Err(e) = start() {
        eprintln!("[FATAL] {e}");
        std::process::exit(1);
    }
}

fn start() -> Result<(), StartupError> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg).map_err(StartupError::Logger)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), StartupError> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &cfg);

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    let state = Arc::new(AppState::new(cfg, Arc::new(ServerLogger)));
    server::run(listener, state, shutdown).await;
    Ok(())
}
