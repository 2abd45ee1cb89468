// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Hand-written SDK fakes shared by the integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Notify;
use vwo_fme_provider::{
	ClientError, ClientFactory, Disposable, FlagHandle, FlagVariable, FmeClient, InitConfig,
	Result, SharedClient, SharedFlag, TrackResult, UserContext,
};

/// Fails the test if `fut` takes longer than a few seconds.
pub async fn within<T>(fut: impl Future<Output = T>) -> T {
	tokio::time::timeout(Duration::from_secs(5), fut)
		.await
		.expect("timed out")
}

/// Gives spawned tasks a chance to run.
pub async fn settle() {
	tokio::time::sleep(Duration::from_millis(20)).await;
}

pub struct FakeFlag {
	pub enabled: bool,
	pub variables: Vec<FlagVariable>,
}

impl FlagHandle for FakeFlag {
	fn is_enabled(&self) -> bool {
		self.enabled
	}

	fn variables(&self) -> Result<Vec<FlagVariable>> {
		Ok(self.variables.clone())
	}

	fn variable(&self, key: &str, default: Value) -> Result<Value> {
		Ok(self
			.variables
			.iter()
			.find(|v| v.key == key)
			.map(|v| v.value.clone())
			.unwrap_or(default))
	}
}

#[derive(Default)]
pub struct FakeDisposer {
	pub calls: AtomicUsize,
}

impl Disposable for FakeDisposer {
	fn destroy(&self) -> Result<()> {
		if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
			return Err(ClientError::sdk("already destroyed"));
		}
		Ok(())
	}
}

#[derive(Default)]
pub struct FakeClient {
	pub get_flag_calls: AtomicUsize,
	pub track_calls: AtomicUsize,
	pub set_attribute_calls: AtomicUsize,
	pub last_identity: Mutex<Option<UserContext>>,
	pub disposer: Arc<FakeDisposer>,
	failure: Option<String>,
	disabled: bool,
	gate: Option<Arc<Notify>>,
}

impl FakeClient {
	pub fn new() -> Self {
		Self::default()
	}

	/// Every call fails with `message`.
	pub fn failing(mut self, message: &str) -> Self {
		self.failure = Some(message.to_string());
		self
	}

	/// Flags come back disabled.
	pub fn disabled(mut self) -> Self {
		self.disabled = true;
		self
	}

	/// `get_flag` waits for `gate` before answering.
	pub fn gated(mut self, gate: Arc<Notify>) -> Self {
		self.gate = Some(gate);
		self
	}

	pub fn shared(self) -> Arc<Self> {
		Arc::new(self)
	}

	pub fn disposals(&self) -> usize {
		self.disposer.calls.load(Ordering::SeqCst)
	}

	pub fn flag_calls(&self) -> usize {
		self.get_flag_calls.load(Ordering::SeqCst)
	}

	fn outcome(&self) -> Result<()> {
		match &self.failure {
			Some(message) => Err(ClientError::sdk(message.clone())),
			None => Ok(()),
		}
	}
}

#[async_trait]
impl FmeClient for FakeClient {
	async fn get_flag(&self, _feature_key: &str, context: &UserContext) -> Result<SharedFlag> {
		self.get_flag_calls.fetch_add(1, Ordering::SeqCst);
		*self.last_identity.lock().unwrap() = Some(context.clone());
		if let Some(gate) = &self.gate {
			gate.notified().await;
		}
		self.outcome()?;
		let flag: SharedFlag = Arc::new(FakeFlag {
			enabled: !self.disabled,
			variables: vec![FlagVariable::new("color", "red")],
		});
		Ok(flag)
	}

	async fn track_event(
		&self,
		event_name: &str,
		_context: &UserContext,
		_properties: &Map<String, Value>,
	) -> Result<TrackResult> {
		self.track_calls.fetch_add(1, Ordering::SeqCst);
		self.outcome()?;
		Ok(TrackResult::from([(event_name.to_string(), true)]))
	}

	fn set_attribute(&self, _attributes: &Map<String, Value>, _context: &UserContext) -> Result<()> {
		self.set_attribute_calls.fetch_add(1, Ordering::SeqCst);
		self.outcome()
	}

	fn disposer(&self) -> Option<Arc<dyn Disposable>> {
		let disposer: Arc<dyn Disposable> = self.disposer.clone();
		Some(disposer)
	}
}

/// Builds a fresh [`FakeClient`] per call.
#[derive(Default)]
pub struct FakeFactory {
	pub calls: AtomicUsize,
	pub built: Mutex<Vec<Arc<FakeClient>>>,
	gate: Option<Arc<Notify>>,
	failure: Option<String>,
	panics: bool,
}

impl FakeFactory {
	pub fn new() -> Self {
		Self::default()
	}

	/// `init` waits for [`release`](FakeFactory::release) before answering.
	pub fn gated() -> Self {
		Self {
			gate: Some(Arc::new(Notify::new())),
			..Self::default()
		}
	}

	pub fn failing(message: &str) -> Self {
		Self {
			failure: Some(message.to_string()),
			..Self::default()
		}
	}

	pub fn panicking() -> Self {
		Self {
			panics: true,
			..Self::default()
		}
	}

	pub fn shared(self) -> Arc<Self> {
		Arc::new(self)
	}

	pub fn release(&self) {
		if let Some(gate) = &self.gate {
			gate.notify_one();
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn built(&self) -> Vec<Arc<FakeClient>> {
		self.built.lock().unwrap().clone()
	}
}

#[async_trait]
impl ClientFactory for FakeFactory {
	async fn init(&self, _config: &InitConfig) -> Result<SharedClient> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if let Some(gate) = &self.gate {
			gate.notified().await;
		}
		if self.panics {
			panic!("factory exploded");
		}
		if let Some(message) = &self.failure {
			return Err(ClientError::sdk(message.clone()));
		}
		let client = FakeClient::new().shared();
		self.built.lock().unwrap().push(client.clone());
		let shared: SharedClient = client;
		Ok(shared)
	}
}

pub fn config() -> Arc<InitConfig> {
	Arc::new(InitConfig::new("123456", "sdk-key"))
}

pub fn same_client(a: &SharedClient, b: &Arc<FakeClient>) -> bool {
	let b: SharedClient = b.clone();
	Arc::ptr_eq(a, &b)
}
