// Configuration module entry point
// Loads layered configuration and owns the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, MailConfig, PerformanceConfig, RateLimitConfig,
    ServerConfig, SiteConfig, SmtpConfig,
};

/// Flat environment variables used by existing deployments, mapped onto
/// their nested configuration keys
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("RATE_WINDOW_MS", "rate_limit.window_ms"),
    ("RATE_MAX", "rate_limit.max"),
    ("SMTP_HOST", "smtp.host"),
    ("SMTP_PORT", "smtp.port"),
    ("SMTP_SECURE", "smtp.secure"),
    ("SMTP_USER", "smtp.user"),
    ("SMTP_PASS", "smtp.pass"),
    ("QUOTE_DEST", "mail.dest"),
    ("FROM_EMAIL", "mail.from"),
];

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load_from`] with an explicit lookup for the flat
    /// legacy variables
    pub fn load_with_env(
        config_path: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SITE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "sitequote")?
            .set_default("http.enable_cors", true)?
            .set_default("http.max_body_size", 102_400)? // 100KB
            .set_default("site.root", "public")?
            .set_default("site.data_file", "data.json")?
            .set_default("site.index_file", "index.html")?
            .set_default("rate_limit.window_ms", 60_000)?
            .set_default("rate_limit.max", 10)?
            .set_default("smtp.port", 587)?
            .set_default("smtp.secure", false)?;

        for (var, key) in LEGACY_ENV_KEYS {
            builder = builder.set_override_option(*key, lookup(var).filter(|v| !v.is_empty()))?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.rate_limit.max == 0 {
            return Err(config::ConfigError::Message(
                "rate_limit.max must be at least 1".to_string(),
            ));
        }
        if self.rate_limit.window_ms == 0 {
            return Err(config::ConfigError::Message(
                "rate_limit.window_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
