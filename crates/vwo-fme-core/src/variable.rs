// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single variable attached to an evaluated flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagVariable {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<u64>,
	pub key: String,
	pub value: Value,
	/// e.g. "string", "boolean", "json"
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
}

impl FlagVariable {
	pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
		Self {
			id: None,
			key: key.into(),
			value: value.into(),
			kind: None,
		}
	}

	pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
		self.kind = Some(kind.into());
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn deserializes_sdk_record() {
		let var: FlagVariable = serde_json::from_value(json!({
			"id": 1,
			"key": "button_color",
			"value": "green",
			"type": "string",
		}))
		.unwrap();

		assert_eq!(var.id, Some(1));
		assert_eq!(var.key, "button_color");
		assert_eq!(var.value, json!("green"));
		assert_eq!(var.kind.as_deref(), Some("string"));
	}

	#[test]
	fn optional_fields_are_omitted() {
		let var = FlagVariable::new("limit", 10);
		assert_eq!(
			serde_json::to_value(&var).unwrap(),
			json!({"key": "limit", "value": 10})
		);
	}
}
