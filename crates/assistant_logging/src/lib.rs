#![deny(missing_docs)]
//! Shared logging utilities for the assistant workspace.
//!
//! This crate provides the `qra_*` logging macros used across the codebase,
//! the category targets they log under, a bounded in-memory log ring that
//! keeps history independent of the console level, and a minimal test
//! initializer for the global logger.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, OnceLock};

use chrono::{DateTime, SecondsFormat, Utc};
use log::{Level, LevelFilter, Log, Metadata, Record};
use simplelog::{Config, SharedLogger};

#[doc(hidden)]
pub use log as __log;

/// Number of entries the global log ring keeps before dropping the oldest.
pub const DEFAULT_RING_CAPACITY: usize = 1000;

const TARGET_PREFIX: &str = "qra::";

/// Functional area a log line belongs to. Used as the `log` target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Startup, configuration and persistence.
    System,
    /// Provider lookups and trigger calls.
    Api,
    /// Popup menu and settings panel state.
    Ui,
    /// Reconciliation and self-healing of the action bar.
    Whitelist,
    /// Mutation handling, debounced healing passes and their follow-ups.
    Update,
    /// Controller and runtime plumbing.
    Core,
}

impl LogCategory {
    /// The `log` target string for this category.
    pub const fn target(&self) -> &'static str {
        match self {
            LogCategory::System => "qra::system",
            LogCategory::Api => "qra::api",
            LogCategory::Ui => "qra::ui",
            LogCategory::Whitelist => "qra::whitelist",
            LogCategory::Update => "qra::update",
            LogCategory::Core => "qra::core",
        }
    }

    /// Human-readable category name used in exported logs.
    pub const fn name(&self) -> &'static str {
        match self {
            LogCategory::System => "System",
            LogCategory::Api => "API",
            LogCategory::Ui => "UI",
            LogCategory::Whitelist => "Whitelist",
            LogCategory::Update => "Update",
            LogCategory::Core => "Core",
        }
    }

    /// Recovers the category from a `log` target, if it is one of ours.
    pub fn from_target(target: &str) -> Option<Self> {
        let all = [
            LogCategory::System,
            LogCategory::Api,
            LogCategory::Ui,
            LogCategory::Whitelist,
            LogCategory::Update,
            LogCategory::Core,
        ];
        all.into_iter().find(|category| category.target() == target)
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Logs a trace-level message under a [`LogCategory`].
#[macro_export]
macro_rules! qra_trace {
    ($category:expr; $($arg:tt)*) => {{
        $crate::__log::trace!(target: $crate::LogCategory::target(&$category), $($arg)*);
    }};
}

/// Logs a debug-level message under a [`LogCategory`].
#[macro_export]
macro_rules! qra_debug {
    ($category:expr; $($arg:tt)*) => {{
        $crate::__log::debug!(target: $crate::LogCategory::target(&$category), $($arg)*);
    }};
}

/// Logs an info-level message under a [`LogCategory`].
#[macro_export]
macro_rules! qra_info {
    ($category:expr; $($arg:tt)*) => {{
        $crate::__log::info!(target: $crate::LogCategory::target(&$category), $($arg)*);
    }};
}

/// Logs a warn-level message under a [`LogCategory`].
#[macro_export]
macro_rules! qra_warn {
    ($category:expr; $($arg:tt)*) => {{
        $crate::__log::warn!(target: $crate::LogCategory::target(&$category), $($arg)*);
    }};
}

/// Logs an error-level message under a [`LogCategory`].
#[macro_export]
macro_rules! qra_error {
    ($category:expr; $($arg:tt)*) => {{
        $crate::__log::error!(target: $crate::LogCategory::target(&$category), $($arg)*);
    }};
}

/// One line held by the [`LogRing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// When the line was recorded.
    pub timestamp: DateTime<Utc>,
    /// Severity.
    pub level: Level,
    /// Category name, or the raw target for foreign records.
    pub category: String,
    /// Formatted message.
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}] [{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.level,
            self.category,
            self.message
        )
    }
}

/// Bounded history of log lines. The oldest entry is dropped once full.
#[derive(Debug)]
pub struct LogRing {
    capacity: usize,
    entries: Mutex<VecDeque<LogEntry>>,
}

impl LogRing {
    /// Creates an empty ring holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_RING_CAPACITY))),
        }
    }

    /// Appends an entry, evicting the oldest if the ring is full.
    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Copies the current entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True when nothing has been recorded since creation or the last clear.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Renders the history as text, one entry per line.
    pub fn export(&self) -> String {
        self.entries()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Process-wide log ring fed by [`RingLogger`].
pub fn log_ring() -> &'static LogRing {
    static RING: OnceLock<LogRing> = OnceLock::new();
    RING.get_or_init(|| LogRing::with_capacity(DEFAULT_RING_CAPACITY))
}

/// `simplelog` backend that records every `qra::*` line into [`log_ring`].
pub struct RingLogger {
    ring: &'static LogRing,
    config: Config,
}

impl RingLogger {
    /// Boxed logger ready to hand to `CombinedLogger::init`.
    pub fn new() -> Box<Self> {
        Box::new(Self {
            ring: log_ring(),
            config: Config::default(),
        })
    }
}

impl Log for RingLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.target().starts_with(TARGET_PREFIX)
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let category = LogCategory::from_target(record.target())
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| record.target().to_string());
        self.ring.push(LogEntry {
            timestamp: Utc::now(),
            level: record.level(),
            category,
            message: record.args().to_string(),
        });
    }

    fn flush(&self) {}
}

impl SharedLogger for RingLogger {
    fn level(&self) -> LevelFilter {
        LevelFilter::Trace
    }

    fn config(&self) -> Option<&Config> {
        Some(&self.config)
    }

    fn as_log(self: Box<Self>) -> Box<dyn Log> {
        Box::new(*self)
    }
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        RingLogger::new(),
    ];
    let _ = CombinedLogger::init(loggers);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level: Level::Warn,
            category: LogCategory::Whitelist.name().to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn ring_drops_oldest_when_full() {
        let ring = LogRing::with_capacity(2);
        ring.push(entry("a"));
        ring.push(entry("b"));
        ring.push(entry("c"));

        let messages: Vec<_> = ring.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["b", "c"]);
    }

    #[test]
    fn export_formats_level_and_category() {
        let ring = LogRing::with_capacity(4);
        ring.push(entry("node restored"));
        let text = ring.export();
        assert!(text.ends_with("[WARN] [Whitelist] node restored"), "{text}");

        ring.clear();
        assert!(ring.is_empty());
    }

    #[test]
    fn categories_round_trip_through_targets() {
        assert_eq!(
            LogCategory::from_target(LogCategory::Api.target()),
            Some(LogCategory::Api)
        );
        assert_eq!(LogCategory::from_target("reqwest::connect"), None);
    }
}
