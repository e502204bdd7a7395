//! Alarm event log
//!
//! A handle passed into the alarm pipeline for recording what each alarm
//! occurrence did. Entries are mirrored to `tracing` and appended to a file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Error,
}

impl EventLevel {
    fn as_str(&self) -> &'static str {
        match self {
            EventLevel::Info => "INFO",
            EventLevel::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    /// Log to the given file, created on first write
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Log through `tracing` only
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("alarmpi")
            .join("events.log")
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, entry: &str) {
        info!("📝 {}", entry);
        self.append(EventLevel::Info, entry);
    }

    pub fn error(&self, entry: &str) {
        error!("❌ {}", entry);
        self.append(EventLevel::Error, entry);
    }

    fn append(&self, level: EventLevel, entry: &str) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_entry(path, level, entry) {
            warn!("⚠️ Could not write event log {}: {}", path.display(), e);
        }
    }
}

fn write_entry(path: &Path, level: EventLevel, entry: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    writeln!(
        file,
        "[{}] {} {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        level.as_str(),
        entry
    )
}
