// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session provider and accessor hooks for the VWO FME SDK.
//!
//! A [`VwoProvider`] owns one SDK client per mounted subtree: it either adopts
//! a pre-built client or builds one from an [`InitConfig`] through a
//! [`ClientFactory`], and publishes the client, the user identity and a
//! readiness flag to every [`SessionScope`] it hands out. The hooks read the
//! session through a scope and never fail: bad input, a missing client or an
//! SDK error is logged and turned into a safe default.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vwo_fme_provider::{use_get_flag, use_track_event, InitConfig, UserContext, VwoProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = VwoProvider::builder()
//!         .config(Arc::new(InitConfig::new("123456", "sdk-key")))
//!         .factory(my_sdk_factory())
//!         .identity(UserContext::with_id("user-1"))
//!         .mount();
//!
//!     let scope = provider.scope();
//!     let mut checkout = use_get_flag(&scope, "checkout-flow", None);
//!     if checkout.wait_ready().await.is_enabled() {
//!         use_track_event(&scope).track("checkout_shown", None).await;
//!     }
//! }
//! ```

pub mod client;
pub mod error;
pub mod hooks;
pub mod logger;
pub mod provider;
pub mod store;

pub use client::{
	factory_fn, ClientFactory, DefaultFlag, Disposable, FlagHandle, FmeClient, SharedClient,
	SharedFlag, TrackResult,
};
pub use error::{ClientError, Result};
pub use hooks::{
	use_get_flag, use_get_flag_variable, use_get_flag_variables, use_set_attribute,
	use_track_event, use_vwo_client, use_vwo_context, ClientResult, FlagResult, GetFlag,
	SetAttribute, TrackEvent,
};
pub use logger::{LogEntry, Logger, MemoryLogger, NoopLogger, SharedLogger, TracingLogger};
pub use provider::{InitStatus, ProviderInput, VwoProvider, VwoProviderBuilder};
pub use store::{IdentitySetter, SessionContext, SessionScope, SessionState};

pub use vwo_fme_core::{FlagVariable, InitConfig, LogLevel, LoggerConfig, UserContext};
