//! Client registration data shared by every flow, plus its validating builder.

// self
use crate::{
	_prelude::*,
	auth::{RealmName, Secret, UserId},
	error::ConfigError,
};

/// Client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
}

/// Immutable client registration loaded once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientRegistration {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Confidential client secret.
	pub client_secret: Secret,
	/// Realm the client is registered in.
	pub realm: RealmName,
	/// Provider base URL, including any context path such as `/auth`.
	pub provider_base_url: Url,
	/// How client credentials are presented to the token endpoint.
	pub client_auth_method: ClientAuthMethod,
	token_endpoint: Url,
}
impl ClientRegistration {
	/// Creates a new builder.
	pub fn builder() -> ClientRegistrationBuilder {
		ClientRegistrationBuilder::default()
	}

	/// Returns `{base}/realms/{realm}/protocol/openid-connect/token`.
	pub fn token_endpoint(&self) -> &Url {
		&self.token_endpoint
	}

	/// Returns `{base}/realms/{realm}/users/{id}` with the id encoded as one path segment.
	pub fn user_endpoint(&self, id: &UserId) -> Url {
		append_segments(
			&self.provider_base_url,
			&["realms", self.realm.as_ref(), "users", id.as_ref()],
		)
	}
}
impl Debug for ClientRegistration {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientRegistration")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.field("realm", &self.realm)
			.field("provider_base_url", &self.provider_base_url.as_str())
			.field("client_auth_method", &self.client_auth_method)
			.finish()
	}
}

/// Builder for [`ClientRegistration`] values.
#[derive(Debug, Default)]
pub struct ClientRegistrationBuilder {
	client_id: Option<String>,
	client_secret: Option<Secret>,
	realm: Option<String>,
	provider_base_url: Option<String>,
	client_auth_method: ClientAuthMethod,
}
impl ClientRegistrationBuilder {
	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<Secret>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets the realm name.
	pub fn realm(mut self, realm: impl Into<String>) -> Self {
		self.realm = Some(realm.into());

		self
	}

	/// Sets the provider base URL.
	pub fn provider_base_url(mut self, url: impl Into<String>) -> Self {
		self.provider_base_url = Some(url.into());

		self
	}

	/// Overrides the client authentication method.
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Consumes the builder and validates the resulting registration.
	pub fn build(self) -> Result<ClientRegistration, ConfigError> {
		let client_id = required("client_id", self.client_id)?;
		let client_secret = self
			.client_secret
			.filter(|secret| !secret.expose().trim().is_empty())
			.ok_or(ConfigError::EmptyField { field: "client_secret" })?;
		let realm = required("realm", self.realm)?;
		let realm = RealmName::new(&realm).map_err(|_| ConfigError::InvalidRealm { realm })?;
		let raw_url = required("provider_base_url", self.provider_base_url)?;
		let provider_base_url =
			Url::parse(&raw_url).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		if !matches!(provider_base_url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { url: raw_url });
		}

		let token_endpoint = append_segments(
			&provider_base_url,
			&["realms", realm.as_ref(), "protocol", "openid-connect", "token"],
		);

		Ok(ClientRegistration {
			client_id,
			client_secret,
			realm,
			provider_base_url,
			client_auth_method: self.client_auth_method,
			token_endpoint,
		})
	}
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
	value
		.map(|value| value.trim().to_owned())
		.filter(|value| !value.is_empty())
		.ok_or(ConfigError::EmptyField { field })
}

fn append_segments(base: &Url, segments: &[&str]) -> Url {
	let mut url = base.clone();

	url.set_query(None);
	url.set_fragment(None);

	// Only http(s) URLs reach this point, and those always accept path segments.
	if let Ok(mut path) = url.path_segments_mut() {
		path.pop_if_empty().extend(segments);
	}

	url
}
