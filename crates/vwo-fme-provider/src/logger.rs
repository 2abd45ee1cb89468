// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Diagnostic sinks.
//!
//! The provider owns one [`Logger`] and hands a clone of it to every scope,
//! so hooks never reach for global state. [`TracingLogger`] is the default and
//! routes through `tracing`; [`MemoryLogger`] keeps entries in memory for
//! hosts that want to inspect or display them.

use std::sync::{Arc, Mutex, PoisonError};

use vwo_fme_core::{LogLevel, LoggerConfig};

/// `tracing` target used for every diagnostic.
pub const LOG_TARGET: &str = "vwo_fme";

/// A sink for diagnostics. Implementations must never panic.
pub trait Logger: Send + Sync {
	fn log(&self, level: LogLevel, message: &str);

	fn trace(&self, message: &str) {
		self.log(LogLevel::Trace, message);
	}

	fn debug(&self, message: &str) {
		self.log(LogLevel::Debug, message);
	}

	fn info(&self, message: &str) {
		self.log(LogLevel::Info, message);
	}

	fn warn(&self, message: &str) {
		self.log(LogLevel::Warn, message);
	}

	fn error(&self, message: &str) {
		self.log(LogLevel::Error, message);
	}
}

/// Type alias for a shared logger.
pub type SharedLogger = Arc<dyn Logger>;

/// Forwards diagnostics to `tracing`, dropping those below the configured
/// level.
#[derive(Debug, Clone)]
pub struct TracingLogger {
	level: LogLevel,
	prefix: String,
}

impl TracingLogger {
	pub fn new(config: &LoggerConfig) -> Self {
		Self {
			level: config.level,
			prefix: config.prefix.clone(),
		}
	}

	pub fn shared(config: &LoggerConfig) -> SharedLogger {
		Arc::new(Self::new(config))
	}

	pub fn level(&self) -> LogLevel {
		self.level
	}

	pub fn enabled(&self, level: LogLevel) -> bool {
		level >= self.level
	}
}

impl Default for TracingLogger {
	fn default() -> Self {
		Self::new(&LoggerConfig::default())
	}
}

impl Logger for TracingLogger {
	fn log(&self, level: LogLevel, message: &str) {
		if !self.enabled(level) {
			return;
		}
		let prefix = self.prefix.as_str();
		match level {
			LogLevel::Trace => tracing::trace!(target: LOG_TARGET, prefix, "{message}"),
			LogLevel::Debug => tracing::debug!(target: LOG_TARGET, prefix, "{message}"),
			LogLevel::Info => tracing::info!(target: LOG_TARGET, prefix, "{message}"),
			LogLevel::Warn => tracing::warn!(target: LOG_TARGET, prefix, "{message}"),
			LogLevel::Error => tracing::error!(target: LOG_TARGET, prefix, "{message}"),
		}
	}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
	fn log(&self, _level: LogLevel, _message: &str) {}
}

/// One recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
	pub level: LogLevel,
	pub message: String,
}

/// Records every diagnostic in memory, regardless of level.
#[derive(Debug, Default)]
pub struct MemoryLogger {
	entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn shared() -> Arc<Self> {
		Arc::new(Self::new())
	}

	pub fn entries(&self) -> Vec<LogEntry> {
		self.lock().clone()
	}

	/// Messages recorded at exactly `level`.
	pub fn messages(&self, level: LogLevel) -> Vec<String> {
		self.lock()
			.iter()
			.filter(|e| e.level == level)
			.map(|e| e.message.clone())
			.collect()
	}

	/// Number of entries at `level` whose message contains `needle`.
	pub fn count(&self, level: LogLevel, needle: &str) -> usize {
		self.lock()
			.iter()
			.filter(|e| e.level == level && e.message.contains(needle))
			.count()
	}

	pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
		self.count(level, needle) > 0
	}

	pub fn is_empty(&self) -> bool {
		self.lock().is_empty()
	}

	pub fn clear(&self) {
		self.lock().clear();
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEntry>> {
		self.entries.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl Logger for MemoryLogger {
	fn log(&self, level: LogLevel, message: &str) {
		self.lock().push(LogEntry {
			level,
			message: message.to_string(),
		});
	}
}
