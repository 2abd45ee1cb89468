// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde_json::{Map, Value};
use tracing::debug;
use vwo_fme_core::{HookName, LogMessage};

use super::{client_missing, guarded, invalid_context};
use crate::client::TrackResult;
use crate::store::SessionScope;

/// Event tracker bound to a session.
#[derive(Debug, Clone)]
pub struct TrackEvent {
	scope: SessionScope,
}

pub fn use_track_event(scope: &SessionScope) -> TrackEvent {
	TrackEvent {
		scope: scope.clone(),
	}
}

impl TrackEvent {
	pub fn is_ready(&self) -> bool {
		self.scope.is_ready()
	}

	/// Tracks `event_name` for the session identity.
	///
	/// Resolves to the client's per-event outcome, or an empty map on any
	/// failure.
	pub async fn track(&self, event_name: &str, properties: Option<&Map<String, Value>>) -> TrackResult {
		let scope = &self.scope;
		let Some(context) = scope.read_as(HookName::TrackEvent) else {
			return TrackResult::new();
		};
		let client = match (context.ready, context.client) {
			(true, Some(client)) => client,
			_ => {
				client_missing(scope, HookName::TrackEvent);
				return TrackResult::new();
			}
		};
		if event_name.is_empty() {
			scope
				.logger()
				.error(LogMessage::VwoTrackEventNameRequired.template());
			return TrackResult::new();
		}
		let identity = match context.identity {
			Some(identity) if identity.is_valid() => identity,
			_ => {
				invalid_context(scope, HookName::TrackEvent);
				return TrackResult::new();
			}
		};

		let empty = Map::new();
		let properties = properties.unwrap_or(&empty);
		match guarded("trackEvent", client.track_event(event_name, &identity, properties)).await {
			Ok(result) => {
				debug!(event_name, "event tracked");
				result
			}
			Err(err) => {
				let error = err.to_string();
				scope.logger().error(&LogMessage::VwoTrackEventError.render(&[
					("eventName", event_name),
					("error", &error),
				]));
				TrackResult::new()
			}
		}
	}
}
