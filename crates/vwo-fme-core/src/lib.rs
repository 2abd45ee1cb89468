// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the VWO FME session provider.
//!
//! This crate holds the plain data shared between the provider and its hooks
//! (`vwo-fme-provider`): the user identity, flag variable records, SDK init
//! options, the diagnostic message catalogue and layered configuration loading.
//!
//! # Example
//!
//! ```
//! use vwo_fme_core::{build_message, InitConfig, LogMessage, UserContext};
//!
//! let config = InitConfig::new("123456", "sdk-key");
//! assert_eq!(config.account_id, "123456");
//!
//! let user = UserContext::with_id("user-1").with_attribute("plan", "enterprise");
//! assert!(user.is_valid());
//!
//! let message = build_message(LogMessage::VwoGetFlagError.template(), &[
//!     ("featureKey", "checkout-flow"),
//!     ("error", "timeout"),
//! ]);
//! assert_eq!(message, "Error fetching feature flag - checkout-flow: timeout");
//! ```

pub mod config;
pub mod error;
pub mod identity;
pub mod message;
pub mod options;
pub mod sources;
pub mod variable;

pub use config::{
	load_config, load_config_from_env, load_config_with_file, InitConfigLayer, LoggerConfigLayer,
};
pub use error::ConfigError;
pub use identity::{IdentityError, UserContext};
pub use message::{build_message, HookName, LogMessage};
pub use options::{InitConfig, LogLevel, LoggerConfig, DEFAULT_LOG_PREFIX};
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};
pub use variable::FlagVariable;
