//! Log writer module
//!
//! Routes leveled server messages and access lines to stdout/stderr or to
//! append-mode files. One process-wide writer, set up by `init`.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Message severity, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    /// Parse a configured level name; unknown names mean `Info`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" | "trace" => Self::Debug,
            _ => Self::Info,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }
}

enum Sink {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl Sink {
    fn open(path: Option<&str>, fallback: Self) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File(Mutex::new(open_log_file(p)?))),
            None => Ok(fallback),
        }
    }

    fn write_line(&self, line: &str) {
        match self {
            Self::Stdout => println!("{line}"),
            Self::Stderr => eprintln!("{line}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{line}");
                }
            }
        }
    }
}

pub struct LogWriter {
    /// Access lines and info/debug messages
    access: Sink,
    /// Warnings and errors
    error: Sink,
    level: Level,
}

impl LogWriter {
    fn new(level: Level, access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        Ok(Self {
            access: Sink::open(access_log_file, Sink::Stdout)?,
            error: Sink::open(error_log_file, Sink::Stderr)?,
            level,
        })
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    pub fn write(&self, level: Level, line: &str) {
        if !self.enabled(level) {
            return;
        }
        match level {
            Level::Error | Level::Warn => self.error.write_line(line),
            Level::Info | Level::Debug => self.access.write_line(line),
        }
    }

    pub fn write_access(&self, line: &str) {
        self.access.write_line(line);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global writer. Fails if log files cannot be opened or the
/// writer was already installed.
pub fn init(level: Level, access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(level, access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(io::ErrorKind::AlreadyExists, "Log writer already initialized")
    })
}

/// The global writer, if `init` has run
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse_and_order() {
        assert_eq!(Level::parse("WARN"), Level::Warn);
        assert_eq!(Level::parse("debug"), Level::Debug);
        assert_eq!(Level::parse("nonsense"), Level::Info);
        assert!(Level::Error < Level::Info);
    }

    #[test]
    fn test_file_sink_filters_by_level() {
        let dir = tempfile::tempdir().unwrap();
        let error_path = dir.path().join("logs/error.log");
        let access_path = dir.path().join("access.log");
        let writer = LogWriter::new(
            Level::Warn,
            access_path.to_str(),
            error_path.to_str(),
        )
        .unwrap();

        writer.write(Level::Error, "boom");
        writer.write(Level::Info, "quiet");
        writer.write_access("GET /");

        let errors = std::fs::read_to_string(&error_path).unwrap();
        let access = std::fs::read_to_string(&access_path).unwrap();
        assert_eq!(errors, "boom\n");
        assert_eq!(access, "GET /\n");
    }
}
