// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session store shared between the provider and its hooks.
//!
//! The provider owns the only strong handle to the store's sender. Scopes,
//! identity setters and hook tasks hold weak handles or receivers, so
//! dropping the provider closes the store and every late write becomes a
//! no-op.

use std::fmt;
use std::sync::{Arc, Weak};

use tokio::sync::watch;
use vwo_fme_core::{HookName, LogMessage, UserContext};

use crate::client::SharedClient;
use crate::error::ClientError;
use crate::logger::SharedLogger;

type StoreSender = watch::Sender<SessionState>;

/// The value broadcast to every subscriber.
#[derive(Clone, Default)]
pub struct SessionState {
	pub client: Option<SharedClient>,
	pub identity: Option<UserContext>,
	pub ready: bool,
}

impl SessionState {
	/// Value equality: clients by pointer, identities deeply.
	pub fn same_as(&self, other: &SessionState) -> bool {
		let same_client = match (&self.client, &other.client) {
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			(None, None) => true,
			_ => false,
		};
		same_client && self.identity == other.identity && self.ready == other.ready
	}
}

impl fmt::Debug for SessionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionState")
			.field("client", &self.client.as_ref().map(|_| "<client>"))
			.field("identity", &self.identity)
			.field("ready", &self.ready)
			.finish()
	}
}

/// Write side of the session store. Only the provider holds one.
pub(crate) struct SessionStore {
	tx: Arc<StoreSender>,
}

impl SessionStore {
	pub(crate) fn new(identity: Option<UserContext>) -> Self {
		let (tx, _rx) = watch::channel(SessionState {
			client: None,
			identity,
			ready: false,
		});
		Self { tx: Arc::new(tx) }
	}

	/// Replaces client and readiness in one update. Returns whether anything
	/// changed.
	pub(crate) fn publish(&self, client: Option<SharedClient>, ready: bool) -> bool {
		publish_to(&self.tx, client, ready)
	}

	pub(crate) fn weak(&self) -> WeakStore {
		WeakStore(Arc::downgrade(&self.tx))
	}

	#[cfg(test)]
	pub(crate) fn identity_setter(&self) -> IdentitySetter {
		IdentitySetter {
			store: Arc::downgrade(&self.tx),
		}
	}

	pub(crate) fn scope(&self, logger: SharedLogger) -> SessionScope {
		SessionScope {
			inner: ScopeInner::Attached {
				rx: self.tx.subscribe(),
				store: Arc::downgrade(&self.tx),
			},
			logger,
		}
	}

	pub(crate) fn state(&self) -> SessionState {
		self.tx.borrow().clone()
	}
}

/// Weak write handle used by background tasks; writes after the provider
/// is gone are dropped.
#[derive(Clone)]
pub(crate) struct WeakStore(Weak<StoreSender>);

impl WeakStore {
	pub(crate) fn publish(&self, client: Option<SharedClient>, ready: bool) -> bool {
		match self.0.upgrade() {
			Some(tx) => publish_to(&tx, client, ready),
			None => false,
		}
	}
}

fn publish_to(tx: &StoreSender, client: Option<SharedClient>, ready: bool) -> bool {
	tx.send_if_modified(|state| {
		let next = SessionState {
			client,
			identity: state.identity.clone(),
			ready,
		};
		if state.same_as(&next) {
			return false;
		}
		*state = next;
		true
	})
}

/// Capability to replace the session identity.
#[derive(Clone)]
pub struct IdentitySetter {
	store: Weak<StoreSender>,
}

impl IdentitySetter {
	/// Replaces the identity. Returns `false` when the identity was already
	/// equal or the provider is gone.
	pub fn set(&self, identity: UserContext) -> bool {
		let Some(tx) = self.store.upgrade() else {
			return false;
		};
		tx.send_if_modified(|state| {
			if state.identity.as_ref() == Some(&identity) {
				return false;
			}
			state.identity = Some(identity);
			true
		})
	}
}

impl fmt::Debug for IdentitySetter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("IdentitySetter")
			.field("attached", &(self.store.strong_count() > 0))
			.finish()
	}
}

/// Snapshot of the session as seen by a hook.
#[derive(Clone)]
pub struct SessionContext {
	pub client: Option<SharedClient>,
	pub identity: Option<UserContext>,
	pub set_identity: IdentitySetter,
	pub ready: bool,
}

impl fmt::Debug for SessionContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionContext")
			.field("client", &self.client.as_ref().map(|_| "<client>"))
			.field("identity", &self.identity)
			.field("ready", &self.ready)
			.finish()
	}
}

#[derive(Clone)]
enum ScopeInner {
	Detached,
	Attached {
		rx: watch::Receiver<SessionState>,
		store: Weak<StoreSender>,
	},
}

/// Handle through which descendants reach the session.
///
/// Obtain one from [`VwoProvider::scope`](crate::VwoProvider::scope). A
/// [`detached`](SessionScope::detached) scope stands for code running outside
/// any provider: every read logs and yields nothing.
#[derive(Clone)]
pub struct SessionScope {
	inner: ScopeInner,
	logger: SharedLogger,
}

impl SessionScope {
	pub fn detached(logger: SharedLogger) -> Self {
		Self {
			inner: ScopeInner::Detached,
			logger,
		}
	}

	pub fn is_attached(&self) -> bool {
		matches!(self.inner, ScopeInner::Attached { .. })
	}

	/// Reads the current session, or `None` (with a diagnostic) outside a
	/// live provider.
	pub fn read(&self) -> Option<SessionContext> {
		self.read_as(HookName::VwoContext)
	}

	pub(crate) fn read_as(&self, hook: HookName) -> Option<SessionContext> {
		match &self.inner {
			ScopeInner::Detached => {
				self.logger.error(&LogMessage::InvalidHookUsage.for_hook(hook));
				None
			}
			ScopeInner::Attached { rx, store } => {
				if store.strong_count() == 0 {
					let error = ClientError::StoreClosed.to_string();
					self.logger.error(&LogMessage::HookError.render(&[
						("hookName", hook.as_str()),
						("error", &error),
					]));
					return None;
				}
				let state = rx.borrow();
				Some(SessionContext {
					client: state.client.clone(),
					identity: state.identity.clone(),
					set_identity: IdentitySetter {
						store: store.clone(),
					},
					ready: state.ready,
				})
			}
		}
	}

	/// Whether the session has a usable client. `false` when detached or
	/// once the provider is gone.
	pub fn is_ready(&self) -> bool {
		match &self.inner {
			ScopeInner::Detached => false,
			ScopeInner::Attached { rx, store } => store.strong_count() > 0 && rx.borrow().ready,
		}
	}

	/// A fresh receiver that yields whenever the session actually changes.
	/// `None` for a detached scope.
	pub fn subscribe(&self) -> Option<watch::Receiver<SessionState>> {
		match &self.inner {
			ScopeInner::Detached => None,
			ScopeInner::Attached { rx, .. } => Some(rx.clone()),
		}
	}

	pub fn logger(&self) -> &SharedLogger {
		&self.logger
	}
}

impl fmt::Debug for SessionScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionScope")
			.field("attached", &self.is_attached())
			.finish()
	}
}
