//! Thin Keycloak gateway - password-grant token exchange, bearer-authenticated user lookups,
//! and a sanitized HTTP facade in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod gateway;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// std
	use std::time::Duration as StdDuration;
	// self
	use crate::{
		flows::{IdentityClient, ReqwestIdentityClient},
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{ClientRegistration, DefaultProviderStrategy},
	};

	/// Client identifier registered by the test fixtures.
	pub const CLIENT_ID: &str = "nodejs-microservice";
	/// Client secret registered by the test fixtures.
	pub const CLIENT_SECRET: &str = "client-secret-that-must-not-leak";
	/// Realm used by the test fixtures.
	pub const REALM: &str = "demo";
	/// Token endpoint path derived from [`REALM`].
	pub const TOKEN_PATH: &str = "/realms/demo/protocol/openid-connect/token";

	/// Builds a reqwest HTTP client with a short timeout suitable for mock providers.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		ReqwestHttpClient::with_timeout(StdDuration::from_secs(5))
			.expect("Failed to build Reqwest client for tests.")
	}

	/// Builds a registration pointing at `base_url` with the fixture credentials.
	pub fn test_registration(base_url: &str) -> ClientRegistration {
		ClientRegistration::builder()
			.client_id(CLIENT_ID)
			.client_secret(CLIENT_SECRET)
			.realm(REALM)
			.provider_base_url(base_url)
			.build()
			.expect("Test registration should be valid.")
	}

	/// Constructs an [`IdentityClient`] backed by the default strategy and the reqwest
	/// transport, targeting the mock provider at `base_url`.
	pub fn build_reqwest_test_client(base_url: &str) -> ReqwestIdentityClient {
		IdentityClient::with_http_client(
			test_registration(base_url),
			Arc::new(DefaultProviderStrategy),
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.expect("Test identity client should build.")
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{AuthError, Result};
}

pub use reqwest;
pub use url;
// Used by the `keycloak-gateway` binary only.
use {clap as _, color_eyre as _, tracing_subscriber as _};
