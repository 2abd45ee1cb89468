// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use vwo_fme_core::{HookName, LogMessage, UserContext};

use super::{client_missing, guarded, invalid_context};
use crate::client::{DefaultFlag, SharedFlag};
use crate::error::ClientError;
use crate::store::{IdentitySetter, SessionScope, SessionState};

/// Outcome of a flag fetch.
#[derive(Clone)]
pub struct FlagResult {
	pub flag: SharedFlag,
	pub ready: bool,
}

impl FlagResult {
	/// The safe default: a disabled flag with no variables.
	pub fn inert() -> Self {
		Self {
			flag: DefaultFlag::shared(),
			ready: false,
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.flag.is_enabled()
	}
}

impl Default for FlagResult {
	fn default() -> Self {
		Self::inert()
	}
}

impl fmt::Debug for FlagResult {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FlagResult")
			.field("ready", &self.ready)
			.finish_non_exhaustive()
	}
}

#[derive(Debug, Clone)]
struct FlagArgs {
	feature_key: String,
	identity: Option<UserContext>,
	seq: u64,
}

#[derive(Clone)]
struct FlagState {
	result: FlagResult,
	loading: bool,
	/// Last argument update the task has caught up with.
	seen: u64,
}

/// What a fetch depends on. Identities compare deeply.
#[derive(Debug, Clone, PartialEq)]
struct MemoKey {
	feature_key: String,
	identity: UserContext,
	ready: bool,
}

impl MemoKey {
	fn new(args: &FlagArgs, session: &SessionState) -> Self {
		let identity = args
			.identity
			.clone()
			.or_else(|| session.identity.clone())
			.unwrap_or_default();
		Self {
			feature_key: args.feature_key.clone(),
			identity,
			ready: session.ready,
		}
	}
}

/// A live flag lookup.
///
/// Fetches again only when the feature key, the effective identity (by
/// value) or session readiness change. Dropping it stops the lookup; a fetch
/// still in flight is discarded.
pub struct GetFlag {
	args: watch::Sender<FlagArgs>,
	state: watch::Receiver<FlagState>,
	alive: Arc<AtomicBool>,
	task: Option<JoinHandle<()>>,
}

/// Looks up `feature_key` for the session identity, or for `identity` when
/// given.
///
/// On a successful fetch the identity used is written back into the session.
pub fn use_get_flag(
	scope: &SessionScope,
	feature_key: impl Into<String>,
	identity: Option<UserContext>,
) -> GetFlag {
	let (args_tx, args_rx) = watch::channel(FlagArgs {
		feature_key: feature_key.into(),
		identity,
		seq: 0,
	});
	let alive = Arc::new(AtomicBool::new(true));

	let attached = scope
		.read_as(HookName::GetFlag)
		.zip(scope.subscribe())
		.and_then(|(context, session)| match Handle::try_current() {
			Ok(runtime) => Some((context.set_identity, session, runtime)),
			Err(_) => {
				let error = ClientError::NoRuntime.to_string();
				scope.logger().error(&LogMessage::HookError.render(&[
					("hookName", HookName::GetFlag.as_str()),
					("error", &error),
				]));
				None
			}
		});

	let (state_tx, state_rx) = watch::channel(FlagState {
		result: FlagResult::inert(),
		loading: attached.is_some(),
		seen: 0,
	});

	let task = attached.map(|(set_identity, session, runtime)| {
		runtime.spawn(run(FlagTask {
			scope: scope.clone(),
			session,
			args: args_rx,
			state: state_tx,
			set_identity,
			alive: Arc::clone(&alive),
		}))
	});

	GetFlag {
		args: args_tx,
		state: state_rx,
		alive,
		task,
	}
}

impl GetFlag {
	/// The latest result.
	pub fn result(&self) -> FlagResult {
		self.state.borrow().result.clone()
	}

	/// Whether a fetch is in flight or pending.
	pub fn is_loading(&self) -> bool {
		self.state.borrow().loading
	}

	pub fn feature_key(&self) -> String {
		self.args.borrow().feature_key.clone()
	}

	/// Supplies the arguments for a new render.
	pub fn update(&self, feature_key: impl Into<String>, identity: Option<UserContext>) {
		let feature_key = feature_key.into();
		self.args.send_modify(|args| {
			args.feature_key = feature_key;
			args.identity = identity;
			args.seq += 1;
		});
	}

	/// Waits for the next change to the result. Returns `false` once the
	/// lookup has stopped.
	pub async fn changed(&mut self) -> bool {
		self.state.changed().await.is_ok()
	}

	/// Waits until the latest arguments have been handled and no fetch is in
	/// flight.
	pub async fn settled(&mut self) -> FlagResult {
		let seq = self.args.borrow().seq;
		let outcome = self
			.state
			.wait_for(|state| !state.loading && state.seen >= seq)
			.await
			.map(|state| state.result.clone());
		outcome.unwrap_or_else(|_| self.result())
	}

	/// Waits for a live flag.
	pub async fn wait_ready(&mut self) -> FlagResult {
		let outcome = self
			.state
			.wait_for(|state| state.result.ready)
			.await
			.map(|state| state.result.clone());
		outcome.unwrap_or_else(|_| self.result())
	}
}

impl Drop for GetFlag {
	fn drop(&mut self) {
		self.alive.store(false, Ordering::SeqCst);
		if let Some(task) = self.task.take() {
			task.abort();
		}
	}
}

impl fmt::Debug for GetFlag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GetFlag")
			.field("feature_key", &self.feature_key())
			.field("result", &self.result())
			.field("loading", &self.is_loading())
			.finish()
	}
}

struct FlagTask {
	scope: SessionScope,
	session: watch::Receiver<SessionState>,
	args: watch::Receiver<FlagArgs>,
	state: watch::Sender<FlagState>,
	set_identity: IdentitySetter,
	alive: Arc<AtomicBool>,
}

async fn run(mut task: FlagTask) {
	let mut memo: Option<MemoKey> = None;

	loop {
		let args = task.args.borrow_and_update().clone();
		let session = task.session.borrow_and_update().clone();
		let key = MemoKey::new(&args, &session);

		if memo.as_ref() != Some(&key) {
			memo = Some(key.clone());
			task.state.send_modify(|state| {
				state.loading = true;
				state.result.ready = false;
			});

			let (result, fetched) = evaluate(&task.scope, &session, &key).await;
			if !task.alive.load(Ordering::SeqCst) {
				return;
			}

			// Inputs moved on while fetching; go round again.
			let latest = MemoKey::new(&task.args.borrow(), &task.session.borrow());
			if latest != key {
				continue;
			}

			if fetched {
				task.set_identity.set(key.identity.clone());
			}
			let seen = task.args.borrow().seq;
			task.state.send_replace(FlagState {
				result,
				loading: false,
				seen,
			});
			continue;
		}

		task.state.send_if_modified(|state| {
			if state.seen == args.seq {
				return false;
			}
			state.seen = args.seq;
			true
		});

		tokio::select! {
			changed = task.session.changed() => {
				if changed.is_err() {
					return;
				}
			}
			changed = task.args.changed() => {
				if changed.is_err() {
					return;
				}
			}
		}
	}
}

/// Validates and fetches. The flag is `true` only for a successful fetch.
async fn evaluate(scope: &SessionScope, session: &SessionState, key: &MemoKey) -> (FlagResult, bool) {
	let logger = scope.logger();

	if key.feature_key.is_empty() {
		logger.error(LogMessage::VwoGetFlagFeatureKeyRequired.template());
		return (FlagResult::inert(), false);
	}
	if !key.identity.is_valid() {
		invalid_context(scope, HookName::GetFlag);
		return (FlagResult::inert(), false);
	}
	if !session.ready {
		logger.error(LogMessage::VwoNotReadyInUseGetFlag.template());
		return (FlagResult::inert(), false);
	}
	let Some(client) = session.client.clone() else {
		client_missing(scope, HookName::GetFlag);
		return (FlagResult::inert(), false);
	};

	match guarded("getFlag", client.get_flag(&key.feature_key, &key.identity)).await {
		Ok(flag) => {
			debug!(feature_key = %key.feature_key, "flag fetched");
			(FlagResult { flag, ready: true }, true)
		}
		Err(err) => {
			let error = err.to_string();
			logger.error(&LogMessage::VwoGetFlagError.render(&[
				("featureKey", key.feature_key.as_str()),
				("error", error.as_str()),
			]));
			(FlagResult::inert(), false)
		}
	}
}
