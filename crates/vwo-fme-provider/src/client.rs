// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The external SDK surface the provider consumes.
//!
//! The SDK itself (flag evaluation, event delivery, transport) lives behind
//! these traits. The provider only needs to build a client from an
//! [`InitConfig`], ask it for flags, forward events and attributes, and
//! optionally dispose of it on teardown.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use vwo_fme_core::{FlagVariable, InitConfig, UserContext};

use crate::error::Result;

/// Shared handle to a constructed SDK client.
pub type SharedClient = Arc<dyn FmeClient>;

/// Shared handle to an evaluated flag.
pub type SharedFlag = Arc<dyn FlagHandle>;

/// What the SDK reports back for a tracked event, keyed by event name.
pub type TrackResult = HashMap<String, bool>;

/// The evaluated state of one feature flag for one user.
#[cfg_attr(test, mockall::automock)]
pub trait FlagHandle: Send + Sync {
	fn is_enabled(&self) -> bool;

	fn variables(&self) -> Result<Vec<FlagVariable>>;

	/// Returns the variable's value, or `default` when the flag has no such
	/// variable.
	fn variable(&self, key: &str, default: Value) -> Result<Value>;
}

/// Inert flag handed out whenever a real one is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFlag;

impl DefaultFlag {
	pub fn shared() -> SharedFlag {
		Arc::new(DefaultFlag)
	}
}

impl FlagHandle for DefaultFlag {
	fn is_enabled(&self) -> bool {
		false
	}

	fn variables(&self) -> Result<Vec<FlagVariable>> {
		Ok(Vec::new())
	}

	fn variable(&self, _key: &str, default: Value) -> Result<Value> {
		Ok(default)
	}
}

/// A constructed SDK client.
#[async_trait]
pub trait FmeClient: Send + Sync {
	async fn get_flag(&self, feature_key: &str, context: &UserContext) -> Result<SharedFlag>;

	async fn track_event(
		&self,
		event_name: &str,
		context: &UserContext,
		properties: &Map<String, Value>,
	) -> Result<TrackResult>;

	fn set_attribute(&self, attributes: &Map<String, Value>, context: &UserContext) -> Result<()>;

	/// Disposal capability, if the client holds resources worth releasing.
	fn disposer(&self) -> Option<Arc<dyn Disposable>> {
		None
	}
}

/// Releases resources held by a client (pollers, sockets, timers).
pub trait Disposable: Send + Sync {
	fn destroy(&self) -> Result<()>;
}

/// Builds clients from init options; the SDK's `init`.
#[async_trait]
pub trait ClientFactory: Send + Sync {
	async fn init(&self, config: &InitConfig) -> Result<SharedClient>;
}

/// Adapts an async closure into a [`ClientFactory`].
///
/// ```ignore
/// let factory = factory_fn(|config: InitConfig| async move {
///     let client: SharedClient = Arc::new(MySdk::connect(&config).await?);
///     Ok(client)
/// });
/// ```
pub fn factory_fn<F, Fut>(f: F) -> Arc<dyn ClientFactory>
where
	F: Fn(InitConfig) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<SharedClient>> + Send + 'static,
{
	Arc::new(FnFactory(f))
}

struct FnFactory<F>(F);

#[async_trait]
impl<F, Fut> ClientFactory for FnFactory<F>
where
	F: Fn(InitConfig) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<SharedClient>> + Send + 'static,
{
	async fn init(&self, config: &InitConfig) -> Result<SharedClient> {
		(self.0)(config.clone()).await
	}
}
