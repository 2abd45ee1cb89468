// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SDK initialization options.
//!
//! [`InitConfig`] is what the provider hands to the client factory when it has
//! to build a client itself. Field names follow the SDK's camelCase options on
//! the wire so a JSON options blob can be deserialized as-is.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Prefix used in log output when none is configured.
pub const DEFAULT_LOG_PREFIX: &str = "VWO-SDK";

/// Severity of a diagnostic, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Trace,
	Debug,
	Info,
	Warn,
	#[default]
	Error,
}

impl LogLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			LogLevel::Trace => "trace",
			LogLevel::Debug => "debug",
			LogLevel::Info => "info",
			LogLevel::Warn => "warn",
			LogLevel::Error => "error",
		}
	}
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for LogLevel {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"trace" => Ok(LogLevel::Trace),
			"debug" => Ok(LogLevel::Debug),
			"info" => Ok(LogLevel::Info),
			"warn" | "warning" => Ok(LogLevel::Warn),
			"error" => Ok(LogLevel::Error),
			other => Err(ConfigError::InvalidValue {
				key: "logger.level".to_string(),
				message: format!("unknown log level '{other}'"),
			}),
		}
	}
}

/// Logger settings carried inside the init options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
	#[serde(default)]
	pub level: LogLevel,
	#[serde(default = "default_prefix")]
	pub prefix: String,
}

fn default_prefix() -> String {
	DEFAULT_LOG_PREFIX.to_string()
}

impl Default for LoggerConfig {
	fn default() -> Self {
		Self {
			level: LogLevel::default(),
			prefix: default_prefix(),
		}
	}
}

impl LoggerConfig {
	pub fn with_level(mut self, level: LogLevel) -> Self {
		self.level = level;
		self
	}
}

/// Parameters sufficient for the external SDK to build a client.
///
/// The provider treats the `Arc<InitConfig>` it is given as the config
/// identity: handing it the same `Arc` again is a re-render, a different one
/// is a reconfiguration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitConfig {
	pub account_id: String,
	pub sdk_key: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub logger: Option<LoggerConfig>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub poll_interval_ms: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gateway_service_url: Option<String>,
	/// SDK options this crate does not interpret, passed through untouched.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl InitConfig {
	pub fn new(account_id: impl Into<String>, sdk_key: impl Into<String>) -> Self {
		Self {
			account_id: account_id.into(),
			sdk_key: sdk_key.into(),
			logger: None,
			poll_interval_ms: None,
			gateway_service_url: None,
			extra: Map::new(),
		}
	}

	pub fn with_logger(mut self, logger: LoggerConfig) -> Self {
		self.logger = Some(logger);
		self
	}

	pub fn with_poll_interval(mut self, interval: Duration) -> Self {
		self.poll_interval_ms = Some(interval.as_millis() as u64);
		self
	}

	pub fn with_gateway_service_url(mut self, url: impl Into<String>) -> Self {
		self.gateway_service_url = Some(url.into());
		self
	}

	pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.extra.insert(key.into(), value.into());
		self
	}

	pub fn poll_interval(&self) -> Option<Duration> {
		self.poll_interval_ms.map(Duration::from_millis)
	}

	/// Logger settings, falling back to defaults when none were given.
	pub fn logger_config(&self) -> LoggerConfig {
		self.logger.clone().unwrap_or_default()
	}

	/// Checks the fields the SDK cannot start without.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.account_id.trim().is_empty() {
			return Err(ConfigError::MissingField("account_id"));
		}
		if self.sdk_key.trim().is_empty() {
			return Err(ConfigError::MissingField("sdk_key"));
		}
		Ok(())
	}
}

impl fmt::Debug for InitConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InitConfig")
			.field("account_id", &self.account_id)
			.field("sdk_key", &"[REDACTED]")
			.field("logger", &self.logger)
			.field("poll_interval_ms", &self.poll_interval_ms)
			.field("gateway_service_url", &self.gateway_service_url)
			.field("extra", &self.extra)
			.finish()
	}
}
