// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating SDK configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Config file exists but could not be read.
	#[error("failed to read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Config file is not valid TOML for the expected layout.
	#[error("failed to parse config file {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// A value was present but could not be interpreted.
	#[error("invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	/// A required field was absent after merging every source.
	#[error("missing required configuration field: {0}")]
	MissingField(&'static str),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_field_names_the_field() {
		let err = ConfigError::MissingField("sdk_key");
		assert_eq!(
			err.to_string(),
			"missing required configuration field: sdk_key"
		);
	}

	#[test]
	fn invalid_value_includes_key_and_message() {
		let err = ConfigError::InvalidValue {
			key: "VWO_FME_POLL_INTERVAL_MS".to_string(),
			message: "invalid u64 value 'soon'".to_string(),
		};
		let text = err.to_string();
		assert!(text.contains("VWO_FME_POLL_INTERVAL_MS"));
		assert!(text.contains("soon"));
	}
}
