// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User identity carried through a provider session.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Reasons a user context cannot be used for evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentityError {
	#[error("user context must be a JSON object")]
	NotAnObject,

	#[error("user context is missing a unique `id`")]
	MissingId,
}

/// Attributes identifying the subject (end user or session) flags are
/// evaluated for.
///
/// Equality is deep: two contexts built separately with the same attributes
/// compare equal. A context is only usable once it carries a unique `id`,
/// either a non-empty string or a number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserContext(Map<String, Value>);

impl UserContext {
	/// Creates an empty context. It is not valid until an `id` is set.
	pub fn new() -> Self {
		Self(Map::new())
	}

	/// Creates a context with the given unique id.
	pub fn with_id(id: impl Into<String>) -> Self {
		Self::new().with_attribute("id", id.into())
	}

	/// Adds or replaces an attribute.
	pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(key.into(), value.into());
		self
	}

	/// Returns the unique id rendered as a string, if one is present.
	pub fn id(&self) -> Option<String> {
		match self.0.get("id")? {
			Value::String(s) if !s.is_empty() => Some(s.clone()),
			Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
			_ => None,
		}
	}

	/// Checks the context is usable for flag evaluation and event tracking.
	pub fn validate(&self) -> Result<(), IdentityError> {
		self.id().map(|_| ()).ok_or(IdentityError::MissingId)
	}

	pub fn is_valid(&self) -> bool {
		self.validate().is_ok()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	pub fn into_map(self) -> Map<String, Value> {
		self.0
	}
}

impl From<Map<String, Value>> for UserContext {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

impl TryFrom<Value> for UserContext {
	type Error = IdentityError;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		match value {
			Value::Object(map) => Ok(Self(map)),
			_ => Err(IdentityError::NotAnObject),
		}
	}
}

impl From<UserContext> for Value {
	fn from(context: UserContext) -> Self {
		Value::Object(context.0)
	}
}
