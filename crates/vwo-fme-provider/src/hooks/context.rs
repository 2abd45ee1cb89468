// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use vwo_fme_core::HookName;

use crate::client::SharedClient;
use crate::store::{SessionContext, SessionScope};

/// Raw read of the session: client, identity, identity setter and readiness.
///
/// Returns `None` outside a live provider.
pub fn use_vwo_context(scope: &SessionScope) -> Option<SessionContext> {
	scope.read()
}

/// The client and whether it may be used yet.
#[derive(Clone, Default)]
pub struct ClientResult {
	pub client: Option<SharedClient>,
	pub ready: bool,
}

impl fmt::Debug for ClientResult {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClientResult")
			.field("client", &self.client.as_ref().map(|_| "<client>"))
			.field("ready", &self.ready)
			.finish()
	}
}

pub fn use_vwo_client(scope: &SessionScope) -> ClientResult {
	match scope.read_as(HookName::VwoClient) {
		Some(context) => ClientResult {
			client: context.client,
			ready: context.ready,
		},
		None => ClientResult::default(),
	}
}
