// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types surfaced by the external SDK client seam.
//!
//! None of these reach callers of the provider or hooks; they are logged and
//! turned into safe defaults at the hook boundary.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures reported by the SDK client, its factory or the session store.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
	/// The SDK rejected the call.
	#[error("{0}")]
	Sdk(String),

	/// The init options were rejected before construction started.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// A config was supplied but no factory to build a client from it.
	#[error("no client factory configured")]
	MissingFactory,

	/// Construction could not be scheduled.
	#[error("no async runtime available to construct the client")]
	NoRuntime,

	/// A factory or client call panicked; names the operation.
	#[error("{0} panicked")]
	Panicked(&'static str),

	/// The provider owning the session store has been torn down.
	#[error("session store is closed")]
	StoreClosed,
}

impl ClientError {
	pub fn sdk(message: impl Into<String>) -> Self {
		ClientError::Sdk(message.into())
	}
}

impl From<vwo_fme_core::ConfigError> for ClientError {
	fn from(err: vwo_fme_core::ConfigError) -> Self {
		ClientError::InvalidConfig(err.to_string())
	}
}
