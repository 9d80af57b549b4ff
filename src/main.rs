use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

mod api;
mod config;
mod content;
mod escape;
mod handler;
mod http;
mod logger;
mod relay;
mod server;

/// Config file used when none is named on the command line (extension optional)
const DEFAULT_CONFIG: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is normal; a broken one is worth a warning
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("[WARN] Failed to load .env: {e}");
        }
    }

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let mailer = Arc::new(relay::SmtpMailer::new(cfg.smtp.clone()));
    let state = Arc::new(config::AppState::new(&cfg, mailer));
    let active_connections = Arc::new(AtomicUsize::new(0));

    logger::log_server_start(&addr, &cfg);

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    // Forget idle callers once per window so the limiter stays small
    let sweep_state = Arc::clone(&state);
    let window = Duration::from_millis(cfg.rate_limit.window_ms);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(window);
        loop {
            ticker.tick().await;
            sweep_state.limiter.retain_recent();
        }
    });

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            active_connections,
            signals,
        ))
        .await
}
