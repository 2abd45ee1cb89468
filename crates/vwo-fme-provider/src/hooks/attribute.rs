// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde_json::{Map, Value};
use vwo_fme_core::{HookName, LogMessage};

use super::{client_missing, guarded_sync, invalid_context};
use crate::store::SessionScope;

/// Attribute setter bound to a session.
#[derive(Debug, Clone)]
pub struct SetAttribute {
	scope: SessionScope,
}

pub fn use_set_attribute(scope: &SessionScope) -> SetAttribute {
	SetAttribute {
		scope: scope.clone(),
	}
}

impl SetAttribute {
	pub fn is_ready(&self) -> bool {
		self.scope.is_ready()
	}

	/// Sets `attributes` on the session identity. Does nothing (beyond a
	/// diagnostic) when the session is not ready, the identity is invalid or
	/// the map is empty.
	pub fn set(&self, attributes: &Map<String, Value>) {
		let scope = &self.scope;
		let Some(context) = scope.read_as(HookName::SetAttribute) else {
			return;
		};
		let client = match (context.ready, context.client) {
			(true, Some(client)) => client,
			_ => {
				client_missing(scope, HookName::SetAttribute);
				return;
			}
		};
		let identity = match context.identity {
			Some(identity) if identity.is_valid() => identity,
			_ => {
				invalid_context(scope, HookName::SetAttribute);
				return;
			}
		};
		if attributes.is_empty() {
			scope
				.logger()
				.error(LogMessage::VwoSetAttributeMapRequired.template());
			return;
		}

		match guarded_sync("setAttribute", || client.set_attribute(attributes, &identity)) {
			Ok(()) => {
				let rendered = Value::Object(attributes.clone()).to_string();
				scope.logger().info(
					&LogMessage::VwoSetAttributeSuccess.render(&[("attributes", &rendered)]),
				);
			}
			Err(err) => {
				let error = err.to_string();
				scope
					.logger()
					.error(&LogMessage::VwoSetAttributeError.render(&[("error", &error)]));
			}
		}
	}
}
