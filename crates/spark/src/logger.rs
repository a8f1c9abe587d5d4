//! The logger injected into commands.
//!
//! Commands receive a shared [`Logger`] through their
//! [`CommandContext`](crate::CommandContext) and log through it rather than
//! reaching for a global. [`TracingLogger`] forwards to `tracing` so the
//! application's subscriber decides where records go; [`MemoryLogger`] keeps
//! them for inspection.

use std::cell::RefCell;
use tracing::Level;

pub trait Logger {
    fn log(&self, level: Level, message: &str);

    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    fn trace(&self, message: &str) {
        self.log(Level::TRACE, message);
    }
}

/// Forwards records to `tracing` under the `spark` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "spark", "{}", message),
            Level::WARN => tracing::warn!(target: "spark", "{}", message),
            Level::INFO => tracing::info!(target: "spark", "{}", message),
            Level::DEBUG => tracing::debug!(target: "spark", "{}", message),
            _ => tracing::trace!(target: "spark", "{}", message),
        }
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: RefCell<Vec<(Level, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.borrow().clone()
    }

    /// Messages logged at exactly `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: Level, message: &str) {
        self.records.borrow_mut().push((level, message.to_string()));
    }
}
