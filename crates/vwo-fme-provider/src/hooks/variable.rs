// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde_json::Value;
use vwo_fme_core::{FlagVariable, LogMessage};

use super::guarded_sync;
use crate::client::FlagHandle;
use crate::store::SessionScope;

/// All variables of `flag`, or `[]` when there is no flag or it fails.
pub fn use_get_flag_variables(scope: &SessionScope, flag: Option<&dyn FlagHandle>) -> Vec<FlagVariable> {
	let Some(flag) = flag else {
		scope
			.logger()
			.error(LogMessage::VwoGetFlagVariablesFlagRequired.template());
		return Vec::new();
	};

	match guarded_sync("getVariables", || flag.variables()) {
		Ok(variables) => variables,
		Err(err) => {
			let error = err.to_string();
			scope
				.logger()
				.error(&LogMessage::VwoGetFlagVariablesError.render(&[("error", &error)]));
			Vec::new()
		}
	}
}

/// The value of `key` on `flag`, or `default`.
///
/// A missing flag yields `default` without a diagnostic.
pub fn use_get_flag_variable(
	scope: &SessionScope,
	flag: Option<&dyn FlagHandle>,
	key: &str,
	default: Value,
) -> Value {
	let Some(flag) = flag else {
		return default;
	};
	if key.is_empty() {
		scope
			.logger()
			.error(LogMessage::VwoGetFlagVariableRequired.template());
		return default;
	}

	let fallback = default.clone();
	match guarded_sync("getVariable", || flag.variable(key, default)) {
		Ok(value) => value,
		Err(err) => {
			let error = err.to_string();
			scope
				.logger()
				.error(&LogMessage::VwoGetFlagVariableError.render(&[("error", &error)]));
			fallback
		}
	}
}
