// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod common;

use std::sync::Arc;

use common::{config, same_client, settle, within, FakeClient, FakeFactory};
use vwo_fme_provider::{
	use_vwo_client, use_vwo_context, InitConfig, InitStatus, LogLevel, MemoryLogger, UserContext,
	VwoProvider,
};

const CLIENT_CONFIG_WARNING: &str = "Both `client` and `config` are provided";

#[tokio::test]
async fn config_builds_client_and_becomes_ready() {
	let logger = MemoryLogger::shared();
	let factory = FakeFactory::gated().shared();
	let provider = VwoProvider::builder()
		.config(config())
		.factory(factory.clone())
		.logger(logger.clone())
		.mount();
	let scope = provider.scope();

	let before = use_vwo_client(&scope);
	assert!(before.client.is_none());
	assert!(!before.ready);
	assert_eq!(provider.status(), InitStatus::Constructing);

	factory.release();
	assert!(within(provider.wait_ready()).await);

	let after = use_vwo_client(&scope);
	assert!(after.ready);
	let built = factory.built();
	assert_eq!(built.len(), 1);
	assert!(same_client(after.client.as_ref().unwrap(), &built[0]));
	assert!(logger.is_empty());
}

#[tokio::test]
async fn client_wins_over_config() {
	let logger = MemoryLogger::shared();
	let factory = FakeFactory::new().shared();
	let client = FakeClient::new().shared();
	let provider = VwoProvider::builder()
		.client(client.clone())
		.config(config())
		.factory(factory.clone())
		.logger(logger.clone())
		.mount();

	// Ready before any await point.
	assert!(provider.is_ready());
	assert_eq!(provider.status(), InitStatus::Ready);
	assert!(same_client(&provider.client().unwrap(), &client));

	settle().await;
	assert_eq!(factory.calls(), 0);
	assert_eq!(logger.count(LogLevel::Warn, CLIENT_CONFIG_WARNING), 1);
}

#[tokio::test]
async fn same_config_constructs_once() {
	let factory = FakeFactory::gated().shared();
	let shared_config = config();
	let mut provider = VwoProvider::builder()
		.config(shared_config.clone())
		.factory(factory.clone())
		.logger(MemoryLogger::shared())
		.mount();

	provider.reconfigure(shared_config.clone());
	provider.reconfigure(shared_config.clone());
	settle().await;
	assert_eq!(factory.calls(), 1);

	factory.release();
	assert!(within(provider.wait_ready()).await);
	provider.reconfigure(shared_config);
	settle().await;

	assert_eq!(factory.calls(), 1);
	assert!(provider.is_ready());
}

#[tokio::test]
async fn readiness_is_monotonic_within_a_cycle() {
	let factory = FakeFactory::new().shared();
	let shared_config = config();
	let mut provider = VwoProvider::builder()
		.config(shared_config.clone())
		.factory(factory.clone())
		.logger(MemoryLogger::shared())
		.mount();
	let mut session = provider.scope().subscribe().unwrap();

	assert!(within(provider.wait_ready()).await);
	session.borrow_and_update();

	for _ in 0..3 {
		provider.reconfigure(shared_config.clone());
		settle().await;
		assert!(!session.has_changed().unwrap());
		assert!(session.borrow().ready);
	}
}

#[tokio::test]
async fn failed_construction_is_logged_and_not_retried() {
	let logger = MemoryLogger::shared();
	let factory = FakeFactory::failing("invalid sdk key").shared();
	let provider = VwoProvider::builder()
		.config(config())
		.factory(factory.clone())
		.logger(logger.clone())
		.mount();

	assert_eq!(within(provider.wait_settled()).await, InitStatus::Failed);
	settle().await;

	assert!(!provider.is_ready());
	assert!(provider.client().is_none());
	assert_eq!(factory.calls(), 1);
	assert!(logger.contains(
		LogLevel::Error,
		"VWO-SDK Initialization failed: invalid sdk key"
	));
}

#[tokio::test]
async fn panicking_factory_fails_the_cycle() {
	let logger = MemoryLogger::shared();
	let provider = VwoProvider::builder()
		.config(config())
		.factory(FakeFactory::panicking().shared())
		.logger(logger.clone())
		.mount();

	assert_eq!(within(provider.wait_settled()).await, InitStatus::Failed);
	assert!(logger.contains(LogLevel::Error, "client factory panicked"));
}

#[tokio::test]
async fn blank_sdk_key_fails_without_calling_factory() {
	let logger = MemoryLogger::shared();
	let factory = FakeFactory::new().shared();
	let provider = VwoProvider::builder()
		.config(Arc::new(InitConfig::new("123456", " ")))
		.factory(factory.clone())
		.logger(logger.clone())
		.mount();

	assert_eq!(provider.status(), InitStatus::Failed);
	settle().await;
	assert_eq!(factory.calls(), 0);
	assert!(logger.contains(
		LogLevel::Error,
		"VWO-SDK Initialization failed: invalid configuration"
	));
}

#[tokio::test]
async fn neither_client_nor_config_is_an_error() {
	let logger = MemoryLogger::shared();
	let provider = VwoProvider::builder().logger(logger.clone()).mount();

	assert_eq!(provider.status(), InitStatus::Failed);
	assert!(!provider.is_ready());
	assert_eq!(
		logger.count(
			LogLevel::Error,
			"VWOProvider Error: Either `client` or `config` must be provided."
		),
		1
	);
}

#[test]
fn config_without_runtime_fails() {
	let logger = MemoryLogger::shared();
	let provider = VwoProvider::builder()
		.config(config())
		.factory(FakeFactory::new().shared())
		.logger(logger.clone())
		.mount();

	assert_eq!(provider.status(), InitStatus::Failed);
	assert!(logger.contains(LogLevel::Error, "no async runtime available"));
}

#[tokio::test]
async fn new_config_disposes_previous_client() {
	let factory = FakeFactory::new().shared();
	let mut provider = VwoProvider::builder()
		.config(config())
		.factory(factory.clone())
		.logger(MemoryLogger::shared())
		.mount();
	assert!(within(provider.wait_ready()).await);

	provider.reconfigure(Arc::new(InitConfig::new("123456", "rotated-key")));
	assert!(within(provider.wait_ready()).await);

	let built = factory.built();
	assert_eq!(built.len(), 2);
	assert_eq!(built[0].disposals(), 1);
	assert_eq!(built[1].disposals(), 0);
	assert!(same_client(&provider.client().unwrap(), &built[1]));
}

#[tokio::test]
async fn new_config_abandons_in_flight_construction() {
	let factory = FakeFactory::gated().shared();
	let mut provider = VwoProvider::builder()
		.config(config())
		.factory(factory.clone())
		.logger(MemoryLogger::shared())
		.mount();
	settle().await;
	assert_eq!(factory.calls(), 1);

	provider.reconfigure(Arc::new(InitConfig::new("654321", "other-key")));
	settle().await;
	assert_eq!(factory.calls(), 2);

	factory.release();
	assert!(within(provider.wait_ready()).await);
	assert_eq!(factory.built().len(), 1);
}

#[tokio::test]
async fn client_precedence_warns_once_per_cycle() {
	let logger = MemoryLogger::shared();
	let factory = FakeFactory::new().shared();
	let client = FakeClient::new().shared();
	let mut provider = VwoProvider::builder()
		.client(client.clone())
		.config(config())
		.factory(factory.clone())
		.logger(logger.clone())
		.mount();

	provider.reconfigure(Arc::new(InitConfig::new("1", "k")));
	settle().await;

	assert!(provider.is_ready());
	assert_eq!(factory.calls(), 0);
	assert_eq!(logger.count(LogLevel::Warn, CLIENT_CONFIG_WARNING), 2);
	assert_eq!(client.disposals(), 0);
}

#[tokio::test]
async fn unmount_disposes_constructed_client() {
	let factory = FakeFactory::new().shared();
	let provider = VwoProvider::builder()
		.config(config())
		.factory(factory.clone())
		.logger(MemoryLogger::shared())
		.mount();
	let scope = provider.scope();
	assert!(within(provider.wait_ready()).await);

	provider.unmount();

	assert_eq!(factory.built()[0].disposals(), 1);
	assert!(use_vwo_context(&scope).is_none());
}

#[tokio::test]
async fn unmount_during_construction_is_quiet() {
	let logger = MemoryLogger::shared();
	let factory = FakeFactory::gated().shared();
	let provider = VwoProvider::builder()
		.config(config())
		.factory(factory.clone())
		.logger(logger.clone())
		.mount();
	settle().await;

	drop(provider);
	factory.release();
	settle().await;

	assert!(factory.built().is_empty());
	assert!(logger.is_empty());
}

#[tokio::test]
async fn identity_is_published_to_scopes() {
	let provider = VwoProvider::builder()
		.client(FakeClient::new().shared())
		.identity(UserContext::with_id("u1"))
		.logger(MemoryLogger::shared())
		.mount();
	let scope = provider.scope();

	let context = use_vwo_context(&scope).unwrap();
	assert_eq!(context.identity, Some(UserContext::with_id("u1")));

	assert!(context.set_identity.set(UserContext::with_id("u2")));
	assert_eq!(provider.identity(), Some(UserContext::with_id("u2")));
}

#[tokio::test]
async fn fallback_renders_until_ready() {
	let factory = FakeFactory::gated().shared();
	let provider = VwoProvider::builder()
		.config(config())
		.factory(factory.clone())
		.logger(MemoryLogger::shared())
		.mount();

	assert_eq!(provider.render("app", Some("spinner")), "spinner");
	factory.release();
	assert!(within(provider.wait_ready()).await);
	assert_eq!(provider.render("app", Some("spinner")), "app");
}
