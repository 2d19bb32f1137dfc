//! Injected structured logging.
//!
//! The monitor engine never calls the global `log` macros directly. It is
//! handed a [`Logger`] at construction, which forwards records to any
//! `log::Log` sink. The binary passes [`Logger::global`] (backed by
//! `env_logger`); tests pass a [`MemorySink`] and inspect what was written.

use std::fmt;
use std::sync::Arc;

use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

const DEFAULT_TARGET: &str = "netmon";

/// A single `key=value` pair attached to a log line.
pub type Field<'a> = (&'a str, &'a dyn fmt::Display);

/// Build a [`Field`].
pub fn kv<'a>(key: &'a str, value: &'a dyn fmt::Display) -> Field<'a> {
    (key, value)
}

/// Cloneable logging capability.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Log>,
    target: &'static str,
}

impl Logger {
    /// Logger writing to whatever `log` implementation is installed globally.
    pub fn global() -> Self {
        Self::new(Arc::new(GlobalSink))
    }

    pub fn new(sink: Arc<dyn Log>) -> Self {
        Self {
            sink,
            target: DEFAULT_TARGET,
        }
    }

    /// Same sink, different record target.
    pub fn with_target(&self, target: &'static str) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            target,
        }
    }

    pub fn log(&self, level: Level, message: fmt::Arguments<'_>, fields: &[Field<'_>]) {
        let metadata = Metadata::builder().level(level).target(self.target).build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(format_args!("{}{}", message, FieldList(fields)))
                .build(),
        );
    }

    pub fn debug(&self, message: fmt::Arguments<'_>, fields: &[Field<'_>]) {
        self.log(Level::Debug, message, fields);
    }

    pub fn info(&self, message: fmt::Arguments<'_>, fields: &[Field<'_>]) {
        self.log(Level::Info, message, fields);
    }

    pub fn warn(&self, message: fmt::Arguments<'_>, fields: &[Field<'_>]) {
        self.log(Level::Warn, message, fields);
    }

    pub fn error(&self, message: fmt::Arguments<'_>, fields: &[Field<'_>]) {
        self.log(Level::Error, message, fields);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("target", &self.target).finish()
    }
}

struct FieldList<'a, 'b>(&'a [Field<'b>]);

impl fmt::Display for FieldList<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.0 {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Forwards to `log::logger()`.
struct GlobalSink;

impl Log for GlobalSink {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record) {
        log::logger().log(record);
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// In-memory sink that keeps every formatted record.
pub struct MemorySink {
    level: LevelFilter,
    records: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.lock().clone()
    }

    /// Whether any record at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|(l, msg)| *l == level && msg.contains(needle))
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(LevelFilter::Trace)
    }
}

impl Log for MemorySink {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_are_appended() {
        let sink = Arc::new(MemorySink::default());
        let logger = Logger::new(sink.clone());

        logger.info(
            format_args!("network checked"),
            &[kv("network", &"W"), kv("height", &42)],
        );

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, Level::Info);
        assert_eq!(records[0].1, "network checked network=W height=42");
    }

    #[test]
    fn test_level_filter() {
        let sink = Arc::new(MemorySink::new(LevelFilter::Warn));
        let logger = Logger::new(sink.clone());

        logger.debug(format_args!("hidden"), &[]);
        logger.error(format_args!("shown"), &[]);

        assert!(!sink.contains(Level::Debug, "hidden"));
        assert!(sink.contains(Level::Error, "shown"));
    }
}
