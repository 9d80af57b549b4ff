// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub site: SiteConfig,
    pub rate_limit: RateLimitConfig,
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Minimum level written: error, warn, info or debug
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

/// Where the site's files live
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Directory served as the document root
    pub root: String,
    /// Content document, relative to `root`
    pub data_file: String,
    /// Page template the sections are rendered into, relative to `root`
    pub index_file: String,
}

/// Fixed quota applied to every `/api/*` request, per caller
#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub window_ms: u64,
    pub max: u32,
}

/// SMTP relay settings
#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    /// Relay host; submissions fail with 500 while unset
    #[serde(default)]
    pub host: Option<String>,
    pub port: u16,
    /// Implicit TLS from the first byte (port 465 style)
    pub secure: bool,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub pass: Option<String>,
}

/// Envelope addresses for relayed submissions
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MailConfig {
    /// Destination mailbox; submissions fail with 500 while unset
    #[serde(default)]
    pub dest: Option<String>,
    /// Sender mailbox, falls back to `dest`
    #[serde(default)]
    pub from: Option<String>,
}

impl MailConfig {
    /// Sender address actually used on outgoing mail
    pub fn sender(&self) -> Option<&str> {
        self.from
            .as_deref()
            .filter(|f| !f.is_empty())
            .or_else(|| self.destination())
    }

    /// Configured destination, treating an empty value as unset
    pub fn destination(&self) -> Option<&str> {
        self.dest.as_deref().filter(|d| !d.is_empty())
    }
}
