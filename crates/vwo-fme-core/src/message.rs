// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Diagnostic message catalogue and `{placeholder}` templating.
//!
//! Every diagnostic the provider and hooks emit comes from [`LogMessage`].
//! Templates use `{name}` placeholders filled by [`build_message`]; a doubled
//! `{{name}}` is an escape and renders as the literal `{name}`.

use std::fmt;

/// Names of the public hooks, used to fill the `{hookName}` placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookName {
	VwoClient,
	VwoContext,
	GetFlag,
	GetFlagVariable,
	GetFlagVariables,
	TrackEvent,
	SetAttribute,
}

impl HookName {
	pub fn as_str(&self) -> &'static str {
		match self {
			HookName::VwoClient => "useVWOClient",
			HookName::VwoContext => "useVWOContext",
			HookName::GetFlag => "useGetFlag",
			HookName::GetFlagVariable => "useGetFlagVariable",
			HookName::GetFlagVariables => "useGetFlagVariables",
			HookName::TrackEvent => "useTrackEvent",
			HookName::SetAttribute => "useSetAttribute",
		}
	}
}

impl fmt::Display for HookName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Every diagnostic emitted by the provider and its hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogMessage {
	// shared by hooks
	VwoClientMissing,
	InvalidContext,
	HookError,
	InvalidHookUsage,
	// provider
	VwoProviderClientConfigWarning,
	VwoProviderConfigRequired,
	VwoSdkInitializationFailed,
	// track event
	VwoTrackEventNameRequired,
	VwoTrackEventError,
	// set attribute
	VwoSetAttributeMapRequired,
	VwoSetAttributeError,
	VwoSetAttributeSuccess,
	// get flag
	VwoNotReadyInUseGetFlag,
	VwoGetFlagFeatureKeyRequired,
	VwoGetFlagError,
	// flag variables
	VwoGetFlagVariablesFlagRequired,
	VwoGetFlagVariablesError,
	VwoGetFlagVariableRequired,
	VwoGetFlagVariableError,
}

impl LogMessage {
	/// Stable identifier, e.g. `INVALID_CONTEXT`.
	pub fn code(&self) -> &'static str {
		match self {
			LogMessage::VwoClientMissing => "VWO_CLIENT_MISSING",
			LogMessage::InvalidContext => "INVALID_CONTEXT",
			LogMessage::HookError => "HOOK_ERROR",
			LogMessage::InvalidHookUsage => "INVALID_HOOK_USAGE",
			LogMessage::VwoProviderClientConfigWarning => "VWO_PROVIDER_CLIENT_CONFIG_WARNING",
			LogMessage::VwoProviderConfigRequired => "VWO_PROVIDER_CONFIG_REQUIRED",
			LogMessage::VwoSdkInitializationFailed => "VWO_SDK_INITIALIZATION_FAILED",
			LogMessage::VwoTrackEventNameRequired => "VWO_TRACK_EVENT_NAME_REQUIRED",
			LogMessage::VwoTrackEventError => "VWO_TRACK_EVENT_ERROR",
			LogMessage::VwoSetAttributeMapRequired => "VWO_SET_ATTRIBUTE_MAP_REQUIRED",
			LogMessage::VwoSetAttributeError => "VWO_SET_ATTRIBUTE_ERROR",
			LogMessage::VwoSetAttributeSuccess => "VWO_SET_ATTRIBUTE_SUCCESS",
			LogMessage::VwoNotReadyInUseGetFlag => "VWO_NOT_READY_IN_USE_GET_FLAG",
			LogMessage::VwoGetFlagFeatureKeyRequired => "VWO_GET_FLAG_FEATURE_KEY_REQUIRED",
			LogMessage::VwoGetFlagError => "VWO_GET_FLAG_ERROR",
			LogMessage::VwoGetFlagVariablesFlagRequired => "VWO_GET_FLAG_VARIABLES_FLAG_REQUIRED",
			LogMessage::VwoGetFlagVariablesError => "VWO_GET_FLAG_VARIABLES_ERROR",
			LogMessage::VwoGetFlagVariableRequired => "VWO_GET_FLAG_VARIABLE_REQUIRED",
			LogMessage::VwoGetFlagVariableError => "VWO_GET_FLAG_VARIABLE_ERROR",
		}
	}

	/// The raw template with `{placeholder}` markers.
	pub fn template(&self) -> &'static str {
		match self {
			LogMessage::VwoClientMissing => {
				"VWO Client is missing in {hookName} hook. Ensure VWOProvider is correctly initialized."
			}
			LogMessage::InvalidContext => {
				"Invalid user context in {hookName} hook. Ensure a valid userContext is provided."
			}
			LogMessage::HookError => "Error in {hookName} hook: {error}",
			LogMessage::InvalidHookUsage => "{hookName} must be used within a VWOProvider !!",
			LogMessage::VwoProviderClientConfigWarning => {
				"VWOProvider Warning: Both `client` and `config` are provided. The `client` prop will take precedence, and the `config` props will be disregarded."
			}
			LogMessage::VwoProviderConfigRequired => {
				"VWOProvider Error: Either `client` or `config` must be provided."
			}
			LogMessage::VwoSdkInitializationFailed => "VWO-SDK Initialization failed: {error}",
			LogMessage::VwoTrackEventNameRequired => {
				"Event name is required for useTrackEvent hook and it should be a string"
			}
			LogMessage::VwoTrackEventError => "Error tracking event - {eventName}: {error}",
			LogMessage::VwoSetAttributeMapRequired => {
				"attributeMap (object having key-value pairs of user attributes) is required for useSetAttribute hook"
			}
			LogMessage::VwoSetAttributeError => "Error setting attributes: {error}",
			LogMessage::VwoSetAttributeSuccess => "User attributes set: {attributes}",
			LogMessage::VwoNotReadyInUseGetFlag => "VWO is not ready in useGetFlag hook",
			LogMessage::VwoGetFlagFeatureKeyRequired => "Feature key is required for useGetFlag hook",
			LogMessage::VwoGetFlagError => "Error fetching feature flag - {featureKey}: {error}",
			LogMessage::VwoGetFlagVariablesFlagRequired => {
				"Flag is required for useGetFlagVariables hook and should be an object"
			}
			LogMessage::VwoGetFlagVariablesError => "Error getting flag variables: {error}",
			LogMessage::VwoGetFlagVariableRequired => {
				"Flag and variable key are required for useGetFlagVariable hook"
			}
			LogMessage::VwoGetFlagVariableError => "Error getting flag variable: {error}",
		}
	}

	/// Renders the template with the given values.
	pub fn render(&self, data: &[(&str, &str)]) -> String {
		build_message(self.template(), data)
	}

	/// Renders a template whose only placeholder is `{hookName}`.
	pub fn for_hook(&self, hook: HookName) -> String {
		self.render(&[("hookName", hook.as_str())])
	}
}

impl fmt::Display for LogMessage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.code())
	}
}

/// Replaces `{key}` placeholders in `template` with values from `data`.
///
/// Keys are ASCII alphanumerics and underscores. Keys missing from `data`
/// render as the empty string. `{{key}}` renders as the literal `{key}`.
/// Braces that do not form a placeholder are copied through unchanged.
pub fn build_message(template: &str, data: &[(&str, &str)]) -> String {
	let mut out = String::with_capacity(template.len());
	let mut rest = template;

	while let Some(start) = rest.find('{') {
		out.push_str(&rest[..start]);
		let after = &rest[start + 1..];

		if let Some(inner) = after.strip_prefix('{') {
			if let Some(len) = placeholder_len(inner) {
				if inner[len..].starts_with("}}") {
					out.push('{');
					out.push_str(&inner[..len]);
					out.push('}');
					rest = &inner[len + 2..];
					continue;
				}
			}
			out.push('{');
			rest = after;
			continue;
		}

		match placeholder_len(after) {
			Some(len) if after[len..].starts_with('}') => {
				let key = &after[..len];
				if let Some((_, value)) = data.iter().find(|(k, _)| *k == key) {
					out.push_str(value);
				}
				rest = &after[len + 1..];
			}
			_ => {
				out.push('{');
				rest = after;
			}
		}
	}

	out.push_str(rest);
	out
}

fn placeholder_len(s: &str) -> Option<usize> {
	let len = s
		.bytes()
		.take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
		.count();
	(len > 0).then_some(len)
}
