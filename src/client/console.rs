//! Rebindable console with one output sink per level.
//!
//! Host code routes its console output through a shared [`Console`]. The
//! logger intercepts a level by swapping in its own sink and keeps the
//! previous binding so that teardown can put it back.

use std::sync::{Arc, PoisonError, RwLock};

use super::format::ConsoleArg;
use crate::entry::LogLevel;

/// Destination for console output at a given level.
pub trait ConsoleSink: Send + Sync {
    /// Writes the arguments of one console call.
    fn write(&self, level: LogLevel, args: &[ConsoleArg]);
}

/// Sink that forwards console output to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ConsoleSink for TracingSink {
    fn write(&self, level: LogLevel, args: &[ConsoleArg]) {
        let message = super::format::format_console_args(args);
        match level {
            LogLevel::Error => tracing::error!(target: "console", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "console", "{message}"),
            LogLevel::Info => tracing::info!(target: "console", "{message}"),
            LogLevel::Log => tracing::debug!(target: "console", "{message}"),
        }
    }
}

struct Bindings {
    error: Arc<dyn ConsoleSink>,
    warn: Arc<dyn ConsoleSink>,
    info: Arc<dyn ConsoleSink>,
    log: Arc<dyn ConsoleSink>,
}

impl Bindings {
    const fn slot(&self, level: LogLevel) -> &Arc<dyn ConsoleSink> {
        match level {
            LogLevel::Error => &self.error,
            LogLevel::Warn => &self.warn,
            LogLevel::Info => &self.info,
            LogLevel::Log => &self.log,
        }
    }

    const fn slot_mut(&mut self, level: LogLevel) -> &mut Arc<dyn ConsoleSink> {
        match level {
            LogLevel::Error => &mut self.error,
            LogLevel::Warn => &mut self.warn,
            LogLevel::Info => &mut self.info,
            LogLevel::Log => &mut self.log,
        }
    }
}

/// Console object whose per-level functions can be replaced and restored.
pub struct Console {
    bindings: RwLock<Bindings>,
}

impl Console {
    /// Creates a console with every level bound to `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn ConsoleSink>) -> Self {
        Self {
            bindings: RwLock::new(Bindings {
                error: Arc::clone(&sink),
                warn: Arc::clone(&sink),
                info: Arc::clone(&sink),
                log: sink,
            }),
        }
    }

    /// Returns the sink currently bound to `level`.
    #[must_use]
    pub fn binding(&self, level: LogLevel) -> Arc<dyn ConsoleSink> {
        let bindings = self
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(bindings.slot(level))
    }

    /// Binds `sink` to `level`, returning the previous binding.
    pub fn rebind(&self, level: LogLevel, sink: Arc<dyn ConsoleSink>) -> Arc<dyn ConsoleSink> {
        let mut bindings = self
            .bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(bindings.slot_mut(level), sink)
    }

    /// Emits a console call at `level`.
    pub fn emit(&self, level: LogLevel, args: &[ConsoleArg]) {
        // The lock is released before writing so sinks may log re-entrantly.
        let sink = self.binding(level);
        sink.write(level, args);
    }

    /// `console.error`.
    pub fn error(&self, args: &[ConsoleArg]) {
        self.emit(LogLevel::Error, args);
    }

    /// `console.warn`.
    pub fn warn(&self, args: &[ConsoleArg]) {
        self.emit(LogLevel::Warn, args);
    }

    /// `console.info`.
    pub fn info(&self, args: &[ConsoleArg]) {
        self.emit(LogLevel::Info, args);
    }

    /// `console.log`.
    pub fn log(&self, args: &[ConsoleArg]) {
        self.emit(LogLevel::Log, args);
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}
