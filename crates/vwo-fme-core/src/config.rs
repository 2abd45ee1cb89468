// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered loading of [`InitConfig`].
//!
//! Precedence (highest to lowest):
//! 1. Environment variables (`VWO_FME_*`)
//! 2. Config file (`/etc/vwo-fme/sdk.toml` or a caller-supplied path)
//! 3. Built-in defaults
//!
//! ```toml
//! account_id = "123456"
//! sdk_key = "..."
//! poll_interval_ms = 60000
//!
//! [logger]
//! level = "debug"
//! prefix = "checkout"
//! ```

use serde::Deserialize;
use serde_json::Map;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::options::{InitConfig, LogLevel, LoggerConfig};
use crate::sources::{ConfigSource, DefaultsSource, EnvSource, TomlSource};

/// Partially specified options from a single source.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitConfigLayer {
	pub account_id: Option<String>,
	pub sdk_key: Option<String>,
	pub poll_interval_ms: Option<u64>,
	pub gateway_service_url: Option<String>,
	pub logger: Option<LoggerConfigLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfigLayer {
	pub level: Option<LogLevel>,
	pub prefix: Option<String>,
}

impl LoggerConfigLayer {
	fn merge(&mut self, other: LoggerConfigLayer) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.prefix.is_some() {
			self.prefix = other.prefix;
		}
	}

	fn finalize(self) -> LoggerConfig {
		let defaults = LoggerConfig::default();
		LoggerConfig {
			level: self.level.unwrap_or(defaults.level),
			prefix: self.prefix.unwrap_or(defaults.prefix),
		}
	}
}

impl InitConfigLayer {
	/// Overlays `other` on top of `self`; fields set in `other` win.
	pub fn merge(&mut self, other: InitConfigLayer) {
		if other.account_id.is_some() {
			self.account_id = other.account_id;
		}
		if other.sdk_key.is_some() {
			self.sdk_key = other.sdk_key;
		}
		if other.poll_interval_ms.is_some() {
			self.poll_interval_ms = other.poll_interval_ms;
		}
		if other.gateway_service_url.is_some() {
			self.gateway_service_url = other.gateway_service_url;
		}
		match (&mut self.logger, other.logger) {
			(Some(current), Some(next)) => current.merge(next),
			(None, Some(next)) => self.logger = Some(next),
			_ => {}
		}
	}

	/// Resolves the merged layer into validated options.
	pub fn finalize(self) -> Result<InitConfig, ConfigError> {
		let config = InitConfig {
			account_id: self
				.account_id
				.ok_or(ConfigError::MissingField("account_id"))?,
			sdk_key: self.sdk_key.ok_or(ConfigError::MissingField("sdk_key"))?,
			logger: self.logger.map(LoggerConfigLayer::finalize),
			poll_interval_ms: self.poll_interval_ms,
			gateway_service_url: self.gateway_service_url,
			extra: Map::new(),
		};
		config.validate()?;

		info!(
			account_id = %config.account_id,
			poll_interval_ms = ?config.poll_interval_ms,
			log_level = %config.logger_config().level,
			"VWO FME configuration loaded"
		);

		Ok(config)
	}
}

/// Load options from all sources with standard precedence.
pub fn load_config() -> Result<InitConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load options with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<InitConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Load options from the environment only.
pub fn load_config_from_env() -> Result<InitConfig, ConfigError> {
	load_from(vec![Box::new(EnvSource)])
}

fn load_from(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<InitConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = InitConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	merged.finalize()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn layer(account: Option<&str>, key: Option<&str>) -> InitConfigLayer {
		InitConfigLayer {
			account_id: account.map(String::from),
			sdk_key: key.map(String::from),
			..Default::default()
		}
	}

	#[test]
	fn later_layers_override_earlier_ones() {
		let mut merged = layer(Some("file-account"), Some("file-key"));
		merged.merge(layer(Some("env-account"), None));

		let config = merged.finalize().unwrap();
		assert_eq!(config.account_id, "env-account");
		assert_eq!(config.sdk_key, "file-key");
	}

	#[test]
	fn logger_fields_merge_individually() {
		let mut merged = layer(Some("1"), Some("k"));
		merged.logger = Some(LoggerConfigLayer {
			level: Some(LogLevel::Debug),
			prefix: Some("file".to_string()),
		});
		merged.merge(InitConfigLayer {
			logger: Some(LoggerConfigLayer {
				level: None,
				prefix: Some("env".to_string()),
			}),
			..Default::default()
		});

		let logger = merged.finalize().unwrap().logger.unwrap();
		assert_eq!(logger.level, LogLevel::Debug);
		assert_eq!(logger.prefix, "env");
	}

	#[test]
	fn finalize_requires_credentials() {
		assert!(matches!(
			layer(None, Some("k")).finalize(),
			Err(ConfigError::MissingField("account_id"))
		));
		assert!(matches!(
			layer(Some("1"), None).finalize(),
			Err(ConfigError::MissingField("sdk_key"))
		));
		assert!(matches!(
			layer(Some("1"), Some("")).finalize(),
			Err(ConfigError::MissingField("sdk_key"))
		));
	}

	#[test]
	fn loads_from_toml_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
account_id = "123456"
sdk_key = "from-file"
poll_interval_ms = 30000

[logger]
level = "info"
"#
		)
		.unwrap();

		let loaded = TomlSource::new(file.path()).load().unwrap();
		let config = loaded.finalize().unwrap();
		assert_eq!(config.account_id, "123456");
		assert_eq!(config.poll_interval_ms, Some(30000));
		assert_eq!(config.logger_config().level, LogLevel::Info);
	}

	#[test]
	fn rejects_unknown_toml_keys() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "acount_id = \"typo\"").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}
}
