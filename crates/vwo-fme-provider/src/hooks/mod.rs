// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Accessor hooks.
//!
//! Every hook reads the session through a [`SessionScope`], validates its
//! preconditions and either calls through to the client or returns a safe
//! default. Failures are logged through the scope's logger and never returned
//! to the caller.

mod attribute;
mod context;
mod flag;
mod track;
mod variable;

pub use attribute::{use_set_attribute, SetAttribute};
pub use context::{use_vwo_client, use_vwo_context, ClientResult};
pub use flag::{use_get_flag, FlagResult, GetFlag};
pub use track::{use_track_event, TrackEvent};
pub use variable::{use_get_flag_variable, use_get_flag_variables};

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use vwo_fme_core::{HookName, LogMessage};

use crate::error::{ClientError, Result};
use crate::store::SessionScope;

/// Awaits a client call, turning a panic into an error.
async fn guarded<T>(operation: &'static str, call: impl Future<Output = Result<T>>) -> Result<T> {
	AssertUnwindSafe(call)
		.catch_unwind()
		.await
		.unwrap_or_else(|_| Err(ClientError::Panicked(operation)))
}

/// Runs a synchronous client call, turning a panic into an error.
fn guarded_sync<T>(operation: &'static str, call: impl FnOnce() -> Result<T>) -> Result<T> {
	std::panic::catch_unwind(AssertUnwindSafe(call))
		.unwrap_or_else(|_| Err(ClientError::Panicked(operation)))
}

fn invalid_context(scope: &SessionScope, hook: HookName) {
	scope
		.logger()
		.error(&LogMessage::InvalidContext.for_hook(hook));
}

fn client_missing(scope: &SessionScope, hook: HookName) {
	scope
		.logger()
		.error(&LogMessage::VwoClientMissing.for_hook(hook));
}
