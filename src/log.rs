//! Injected logging capability.
//!
//! Components never reach for a process-wide logger. Each one is handed a
//! [`Logger`] at construction, which pairs a component name with a shared
//! [`LogSink`]. The default sink forwards to `tracing`.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Verbose,
    Information,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            LogLevel::Verbose => "V",
            LogLevel::Information => "I",
            LogLevel::Warning => "W",
            LogLevel::Error => "E",
        };
        f.write_str(tag)
    }
}

/// Destination for log entries.
pub trait LogSink: Send + Sync {
    fn log(&self, component: &str, message: &str, level: LogLevel);
}

/// Forwards entries to the `tracing` macros with a `component` field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, component: &str, message: &str, level: LogLevel) {
        match level {
            LogLevel::Verbose => tracing::debug!(component, "{}", message),
            LogLevel::Information => tracing::info!(component, "{}", message),
            LogLevel::Warning => tracing::warn!(component, "{}", message),
            LogLevel::Error => tracing::error!(component, "{}", message),
        }
    }
}

/// A single captured entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub component: String,
    pub message: String,
    pub level: LogLevel,
}

/// Keeps every entry in memory. Handy for tests and for embedders that want
/// to inspect what the server reported.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries recorded so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Entries at exactly `level`.
    pub fn at_level(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, component: &str, message: &str, level: LogLevel) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                component: component.to_string(),
                message: message.to_string(),
                level,
            });
    }
}

/// Component-scoped handle onto a sink.
#[derive(Clone)]
pub struct Logger {
    component: Arc<str>,
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("component", &self.component)
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn new(component: impl Into<String>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            component: Arc::from(component.into()),
            sink,
        }
    }

    /// Logger backed by [`TracingSink`].
    pub fn tracing(component: impl Into<String>) -> Self {
        Self::new(component, Arc::new(TracingSink))
    }

    /// Same sink, different component name.
    pub fn scoped(&self, component: impl Into<String>) -> Self {
        Self::new(component, Arc::clone(&self.sink))
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn log(&self, message: impl AsRef<str>, level: LogLevel) {
        self.sink.log(&self.component, message.as_ref(), level);
    }

    pub fn verbose(&self, message: impl AsRef<str>) {
        self.log(message, LogLevel::Verbose);
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(message, LogLevel::Information);
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(message, LogLevel::Warning);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(message, LogLevel::Error);
    }
}
