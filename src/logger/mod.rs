//! Logger module
//!
//! Server lifecycle and diagnostic messages with a level filter, plus the
//! per-request access log. Falls back to stdout/stderr before `init`.

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        Level::parse(&config.logging.level),
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write(level: Level, message: &str) {
    let line = format!(
        "{} [{}] {message}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"),
        level.label()
    );
    match writer::get() {
        Some(w) => w.write(level, &line),
        None if level <= Level::Warn => eprintln!("{line}"),
        None if level == Level::Info => println!("{line}"),
        None => {}
    }
}

pub fn log_error(message: &str) {
    write(Level::Error, message);
}

pub fn log_warning(message: &str) {
    write(Level::Warn, message);
}

pub fn log_info(message: &str) {
    write(Level::Info, message);
}

pub fn log_debug(message: &str) {
    write(Level::Debug, message);
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    log_info("======================================");
    log_info(&format!("Site server listening on http://{addr}"));
    log_info(&format!("Site root: {}", config.site.root));
    log_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        log_info(&format!("Worker threads: {workers}"));
    }
    log_info(&format!(
        "API quota: {} requests per {} ms",
        config.rate_limit.max, config.rate_limit.window_ms
    ));
    match (config.mail.destination(), config.smtp.host.as_deref()) {
        (Some(dest), Some(host)) => {
            log_info(&format!("Quote requests relay to {dest} via {host}:{}", config.smtp.port));
        }
        (None, _) => log_warning("QUOTE_DEST not set: quote submissions will be rejected"),
        (_, None) => log_warning("SMTP_HOST not set: quote submissions will fail to send"),
    }
    log_info("======================================");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}
