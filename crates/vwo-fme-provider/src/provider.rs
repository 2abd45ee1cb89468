// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Initialization controller.
//!
//! [`VwoProvider`] decides how a usable client is obtained (adopted from the
//! caller or built from an [`InitConfig`]) and when the session becomes
//! ready. Each distinct config `Arc` starts a new cycle; within a cycle
//! readiness only moves forward.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vwo_fme_core::{InitConfig, LogMessage, UserContext};

use crate::client::{ClientFactory, SharedClient};
use crate::error::{ClientError, Result};
use crate::logger::{SharedLogger, TracingLogger};
use crate::store::{SessionScope, SessionStore, WeakStore};

/// Where the current cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
	Uninitialized,
	Constructing,
	Ready,
	Failed,
}

impl InitStatus {
	/// `Ready` and `Failed` end a cycle.
	pub fn is_settled(&self) -> bool {
		matches!(self, InitStatus::Ready | InitStatus::Failed)
	}
}

/// The provider's inputs, resolved once per cycle.
#[derive(Clone)]
pub enum ProviderInput {
	/// A pre-built client. Any config supplied alongside it is kept only to
	/// report that it was ignored.
	WithClient {
		client: SharedClient,
		ignored_config: Option<Arc<InitConfig>>,
	},
	WithConfig {
		config: Arc<InitConfig>,
	},
	Missing,
}

impl ProviderInput {
	pub fn resolve(client: Option<SharedClient>, config: Option<Arc<InitConfig>>) -> Self {
		match (client, config) {
			(Some(client), ignored_config) => ProviderInput::WithClient {
				client,
				ignored_config,
			},
			(None, Some(config)) => ProviderInput::WithConfig { config },
			(None, None) => ProviderInput::Missing,
		}
	}
}

impl fmt::Debug for ProviderInput {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProviderInput::WithClient { ignored_config, .. } => f
				.debug_struct("WithClient")
				.field("ignored_config", ignored_config)
				.finish_non_exhaustive(),
			ProviderInput::WithConfig { config } => {
				f.debug_struct("WithConfig").field("config", config).finish()
			}
			ProviderInput::Missing => f.write_str("Missing"),
		}
	}
}

/// Builder for a [`VwoProvider`].
#[derive(Default)]
pub struct VwoProviderBuilder {
	client: Option<SharedClient>,
	config: Option<Arc<InitConfig>>,
	identity: Option<UserContext>,
	factory: Option<Arc<dyn ClientFactory>>,
	logger: Option<SharedLogger>,
}

impl VwoProviderBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adopts a pre-built client. It takes precedence over any config.
	pub fn client(mut self, client: SharedClient) -> Self {
		self.client = Some(client);
		self
	}

	/// Sets the init options used to build a client.
	///
	/// The `Arc` is the config identity; pass the same one to
	/// [`VwoProvider::reconfigure`] to leave the provider untouched.
	pub fn config(mut self, config: Arc<InitConfig>) -> Self {
		self.config = Some(config);
		self
	}

	/// Sets the initial session identity.
	pub fn identity(mut self, identity: UserContext) -> Self {
		self.identity = Some(identity);
		self
	}

	/// Sets the factory clients are built with.
	pub fn factory(mut self, factory: Arc<dyn ClientFactory>) -> Self {
		self.factory = Some(factory);
		self
	}

	/// Sets the diagnostics sink.
	///
	/// Defaults to a [`TracingLogger`] configured from the config's logger
	/// options.
	pub fn logger(mut self, logger: SharedLogger) -> Self {
		self.logger = Some(logger);
		self
	}

	/// Mounts the provider and starts its first cycle.
	///
	/// With a pre-built client the session is ready when this returns.
	/// Building from a config needs a Tokio runtime on the current thread.
	pub fn mount(self) -> VwoProvider {
		let logger = self.logger.unwrap_or_else(|| {
			let options = self
				.config
				.as_ref()
				.map(|config| config.logger_config())
				.unwrap_or_default();
			TracingLogger::shared(&options)
		});

		let (status, _) = watch::channel(InitStatus::Uninitialized);
		let mut provider = VwoProvider {
			store: SessionStore::new(self.identity),
			shared: Arc::new(Shared {
				generation: AtomicU64::new(0),
				alive: AtomicBool::new(true),
				status,
				constructed: Mutex::new(None),
				logger: logger.clone(),
			}),
			client: self.client,
			config: self.config,
			factory: self.factory,
			task: None,
			logger,
		};

		debug!(
			has_client = provider.client.is_some(),
			has_config = provider.config.is_some(),
			"mounting provider"
		);
		let generation = provider.shared.begin_cycle().0;
		provider.run_cycle(generation);
		provider
	}
}

/// State shared with the construction task.
struct Shared {
	generation: AtomicU64,
	alive: AtomicBool,
	status: watch::Sender<InitStatus>,
	/// The client this provider built itself, if any. Also serializes cycle
	/// changes against completing constructions.
	constructed: Mutex<Option<SharedClient>>,
	logger: SharedLogger,
}

impl Shared {
	fn slot(&self) -> MutexGuard<'_, Option<SharedClient>> {
		self.constructed.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Starts a new cycle. Returns its generation and the client built during
	/// the previous one.
	fn begin_cycle(&self) -> (u64, Option<SharedClient>) {
		let mut slot = self.slot();
		let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
		self.status.send_replace(InitStatus::Uninitialized);
		(generation, slot.take())
	}

	/// Ends the provider's life. Returns the constructed client on the first
	/// call only.
	fn shut_down(&self) -> Option<SharedClient> {
		let mut slot = self.slot();
		if !self.alive.swap(false, Ordering::SeqCst) {
			return None;
		}
		self.generation.fetch_add(1, Ordering::SeqCst);
		slot.take()
	}

	fn is_current(&self, generation: u64) -> bool {
		self.alive.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
	}

	fn finish_construction(&self, generation: u64, store: &WeakStore, outcome: Result<SharedClient>) {
		let mut slot = self.slot();
		if !self.is_current(generation) {
			drop(slot);
			debug!(generation, "discarding stale construction");
			if let Ok(client) = outcome {
				dispose_quietly(&self.logger, &client);
			}
			return;
		}

		match outcome {
			Ok(client) => {
				*slot = Some(client.clone());
				store.publish(Some(client), true);
				self.status.send_replace(InitStatus::Ready);
				info!(generation, "client constructed");
			}
			Err(err) => {
				self.fail(&err);
			}
		}
	}

	fn fail(&self, err: &ClientError) {
		let error = err.to_string();
		self.logger
			.error(&LogMessage::VwoSdkInitializationFailed.render(&[("error", &error)]));
		self.status.send_replace(InitStatus::Failed);
		warn!(error = %err, "client construction failed");
	}
}

/// Owns the session for one mounted subtree.
///
/// Dropping the provider (or calling [`unmount`](VwoProvider::unmount))
/// cancels any in-flight construction, disposes the client it built and
/// closes the session store.
pub struct VwoProvider {
	store: SessionStore,
	shared: Arc<Shared>,
	client: Option<SharedClient>,
	config: Option<Arc<InitConfig>>,
	factory: Option<Arc<dyn ClientFactory>>,
	task: Option<JoinHandle<()>>,
	logger: SharedLogger,
}

impl VwoProvider {
	pub fn builder() -> VwoProviderBuilder {
		VwoProviderBuilder::new()
	}

	fn run_cycle(&mut self, generation: u64) {
		match ProviderInput::resolve(self.client.clone(), self.config.clone()) {
			ProviderInput::WithClient {
				client,
				ignored_config,
			} => {
				if ignored_config.is_some() {
					self.logger
						.warn(LogMessage::VwoProviderClientConfigWarning.template());
				}
				self.store.publish(Some(client), true);
				self.shared.status.send_replace(InitStatus::Ready);
				debug!(generation, "using supplied client");
			}
			ProviderInput::WithConfig { config } => {
				self.store.publish(None, false);
				self.spawn_construction(generation, config);
			}
			ProviderInput::Missing => {
				self.logger.error(LogMessage::VwoProviderConfigRequired.template());
				self.store.publish(None, false);
				self.shared.status.send_replace(InitStatus::Failed);
			}
		}
	}

	fn spawn_construction(&mut self, generation: u64, config: Arc<InitConfig>) {
		let Some(factory) = self.factory.clone() else {
			self.shared.fail(&ClientError::MissingFactory);
			return;
		};
		if let Err(err) = config.validate() {
			self.shared.fail(&err.into());
			return;
		}
		let Ok(runtime) = Handle::try_current() else {
			self.shared.fail(&ClientError::NoRuntime);
			return;
		};

		self.shared.status.send_replace(InitStatus::Constructing);
		info!(generation, account_id = %config.account_id, "constructing client");

		let shared = Arc::clone(&self.shared);
		let store = self.store.weak();
		self.task = Some(runtime.spawn(async move {
			let outcome = AssertUnwindSafe(factory.init(&config))
				.catch_unwind()
				.await
				.unwrap_or_else(|_| Err(ClientError::Panicked("client factory")));
			shared.finish_construction(generation, &store, outcome);
		}));
	}

	/// Supplies the config for this render.
	///
	/// The same `Arc` is a no-op. A different one starts a new cycle: any
	/// in-flight construction is abandoned, a client built by this provider is
	/// disposed, and the session drops back to not-ready unless a pre-built
	/// client is in use.
	pub fn reconfigure(&mut self, config: Arc<InitConfig>) {
		if let Some(current) = &self.config {
			if Arc::ptr_eq(current, &config) {
				return;
			}
		}
		if !self.shared.alive.load(Ordering::SeqCst) {
			return;
		}

		debug!("config changed, starting new cycle");
		self.config = Some(config);
		if let Some(task) = self.task.take() {
			task.abort();
		}
		let (generation, previous) = self.shared.begin_cycle();
		if let Some(client) = previous {
			dispose_quietly(&self.logger, &client);
		}
		self.run_cycle(generation);
	}

	/// Tears the provider down. Equivalent to dropping it.
	pub fn unmount(mut self) {
		self.teardown();
	}

	fn teardown(&mut self) {
		let constructed = self.shared.shut_down();
		if let Some(task) = self.task.take() {
			task.abort();
		}
		if let Some(client) = constructed {
			dispose_quietly(&self.logger, &client);
		}
	}

	/// A handle for descendants to read the session through.
	pub fn scope(&self) -> SessionScope {
		self.store.scope(self.logger.clone())
	}

	pub fn status(&self) -> InitStatus {
		*self.shared.status.borrow()
	}

	/// Receiver that yields on every status change.
	pub fn status_changes(&self) -> watch::Receiver<InitStatus> {
		self.shared.status.subscribe()
	}

	pub fn is_ready(&self) -> bool {
		self.store.state().ready
	}

	pub fn client(&self) -> Option<SharedClient> {
		self.store.state().client
	}

	pub fn identity(&self) -> Option<UserContext> {
		self.store.state().identity
	}

	pub fn config(&self) -> Option<&Arc<InitConfig>> {
		self.config.as_ref()
	}

	pub fn logger(&self) -> &SharedLogger {
		&self.logger
	}

	/// Waits until the current cycle is ready or has failed.
	pub async fn wait_settled(&self) -> InitStatus {
		let mut rx = self.shared.status.subscribe();
		let status = match rx.wait_for(InitStatus::is_settled).await {
			Ok(status) => *status,
			Err(_) => self.status(),
		};
		status
	}

	/// Waits for the current cycle to settle and reports whether it is ready.
	pub async fn wait_ready(&self) -> bool {
		self.wait_settled().await == InitStatus::Ready
	}

	/// Picks what to show: `fallback` while not ready when one is given,
	/// otherwise `children`.
	pub fn render<T>(&self, children: T, fallback: Option<T>) -> T {
		match fallback {
			Some(fallback) if !self.is_ready() => fallback,
			_ => children,
		}
	}
}

impl Drop for VwoProvider {
	fn drop(&mut self) {
		self.teardown();
	}
}

impl fmt::Debug for VwoProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("VwoProvider")
			.field("status", &self.status())
			.field("ready", &self.is_ready())
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

/// Runs the client's disposal capability, if any. Never fails or panics.
fn dispose_quietly(logger: &SharedLogger, client: &SharedClient) {
	let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
		client.disposer().map(|disposer| disposer.destroy())
	}));
	match outcome {
		Ok(None) => {}
		Ok(Some(Ok(()))) => debug!("client disposed"),
		Ok(Some(Err(err))) => logger.debug(&format!("client disposal failed: {err}")),
		Err(_) => logger.debug("client disposal panicked"),
	}
}
