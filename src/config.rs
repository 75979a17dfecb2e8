//! Layered gateway configuration.
//!
//! Values are resolved from built-in defaults, then an optional YAML file, then
//! environment variables prefixed with [`ENV_PREFIX`] (for example
//! `KC_GATEWAY_CLIENT_SECRET`). Later layers win.

// std
use std::{net::SocketAddr, path::Path, time::Duration as StdDuration};
// crates.io
use figment::{
	Figment,
	providers::{Env, Format, Serialized, Yaml},
};
// self
use crate::{
	_prelude::*,
	auth::Secret,
	error::ConfigError,
	provider::{ClientAuthMethod, ClientRegistration},
};

/// Environment variable prefix recognized by [`GatewayConfig::load`].
pub const ENV_PREFIX: &str = "KC_GATEWAY_";
/// Upper bound accepted for `request_timeout_secs`.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Raw configuration as read from every layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
	/// Provider root URL, including any context path such as `/auth`.
	pub provider_base_url: String,
	/// Realm the gateway authenticates against.
	pub realm: String,
	/// Confidential client identifier.
	pub client_id: String,
	/// Confidential client secret.
	pub client_secret: Secret,
	/// How the client secret is presented to the token endpoint.
	pub client_auth_method: ClientAuthMethod,
	/// Socket address the HTTP facade binds to.
	pub listen_addr: String,
	/// Timeout applied to every outbound provider call, in seconds.
	pub request_timeout_secs: u64,
	/// Fallback `tracing` filter used when `RUST_LOG` is unset.
	pub log_filter: String,
}
impl GatewayConfig {
	/// Loads the configuration from defaults, `path` (when given), and the environment.
	///
	/// A missing `path` is an error; the environment layer is always applied.
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		if let Some(path) = path.filter(|path| !path.is_file()) {
			return Err(ConfigError::MissingFile { path: path.to_path_buf() });
		}

		Self::from_figment(Self::figment(path))
	}

	/// Builds the layered [`Figment`] without extracting it.
	pub fn figment(path: Option<&Path>) -> Figment {
		let mut figment = Figment::from(Serialized::defaults(Self::default()));

		if let Some(path) = path {
			figment = figment.merge(Yaml::file(path));
		}

		figment.merge(Env::prefixed(ENV_PREFIX))
	}

	/// Extracts and validates a configuration from an arbitrary [`Figment`].
	pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
		let config = figment.extract::<Self>()?;

		config.validate()?;

		Ok(config)
	}

	/// Validates every field, including the derived [`ClientRegistration`].
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.request_timeout()?;
		self.listen_addr()?;
		self.registration()?;

		Ok(())
	}

	/// Returns the outbound request timeout.
	pub fn request_timeout(&self) -> Result<StdDuration, ConfigError> {
		let value = self.request_timeout_secs;

		if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&value) {
			return Err(ConfigError::TimeoutOutOfRange { value, max: MAX_REQUEST_TIMEOUT_SECS });
		}

		Ok(StdDuration::from_secs(value))
	}

	/// Parses the listen address.
	pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
		self.listen_addr.trim().parse().map_err(|source| ConfigError::InvalidListenAddr {
			value: self.listen_addr.clone(),
			source,
		})
	}

	/// Builds the validated client registration.
	pub fn registration(&self) -> Result<ClientRegistration, ConfigError> {
		ClientRegistration::builder()
			.client_id(&self.client_id)
			.client_secret(self.client_secret.clone())
			.realm(&self.realm)
			.provider_base_url(&self.provider_base_url)
			.client_auth_method(self.client_auth_method)
			.build()
	}
}
impl Default for GatewayConfig {
	fn default() -> Self {
		Self {
			provider_base_url: String::new(),
			realm: String::new(),
			client_id: String::new(),
			client_secret: Secret::new(""),
			client_auth_method: ClientAuthMethod::default(),
			listen_addr: "0.0.0.0:5000".into(),
			request_timeout_secs: 10,
			log_filter: "info".into(),
		}
	}
}
