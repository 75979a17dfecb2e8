//! Gateway-level error types shared across flows, configuration, and the HTTP facade.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`AuthError`] by default.
pub type Result<T, E = AuthError> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error returned by identity provider operations.
///
/// Messages may carry provider-supplied text and are meant for internal logs only; the
/// HTTP facade replaces them with sanitized summaries before responding.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Caller input failed validation before any outbound call was made.
	#[error("Invalid input: {reason}.")]
	InvalidInput {
		/// Human-readable validation failure.
		reason: String,
	},
	/// The password grant did not yield an access token.
	#[error("Token exchange failed ({kind}): {reason}.")]
	ExchangeFailed {
		/// Classified failure category.
		kind: ExchangeFailure,
		/// Provider- or gateway-supplied reason string.
		reason: String,
	},
	/// The provider rejected the bearer token presented on an admin call.
	#[error("Provider rejected the bearer token.")]
	Unauthorized,
	/// The requested resource does not exist at the provider.
	#[error("Requested resource was not found.")]
	NotFound,
	/// The provider answered with a status or body the gateway cannot interpret.
	#[error("Provider returned an unexpected response: {reason}.")]
	UnexpectedResponse {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Gateway-supplied description of the mismatch.
		reason: String,
	},
	/// Transport failure (DNS, TCP, TLS, request construction).
	#[error(transparent)]
	TransportFailure(#[from] TransportError),
	/// The provider did not answer within the configured request timeout.
	#[error("Provider did not respond before the request timeout.")]
	Timeout,
}
impl AuthError {
	/// Builds an [`AuthError::InvalidInput`] value.
	pub fn invalid_input(reason: impl Into<String>) -> Self {
		Self::InvalidInput { reason: reason.into() }
	}

	/// Builds an [`AuthError::ExchangeFailed`] value.
	pub fn exchange_failed(kind: ExchangeFailure, reason: impl Into<String>) -> Self {
		Self::ExchangeFailed { kind, reason: reason.into() }
	}
}

/// Classification attached to [`AuthError::ExchangeFailed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeFailure {
	/// The user credentials were rejected.
	InvalidGrant,
	/// The gateway's client registration was rejected.
	InvalidClient,
	/// The provider failed or is temporarily unavailable.
	Upstream,
	/// The provider answered successfully but without a usable token body.
	MalformedResponse,
}
impl ExchangeFailure {
	/// Returns a stable label suitable for logs and span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeFailure::InvalidGrant => "invalid_grant",
			ExchangeFailure::InvalidClient => "invalid_client",
			ExchangeFailure::Upstream => "upstream",
			ExchangeFailure::MalformedResponse => "malformed_response",
		}
	}
}
impl Display for ExchangeFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration and validation failures raised before the gateway starts serving.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required field is missing or blank.
	#[error("Configuration field `{field}` must not be empty.")]
	EmptyField {
		/// Field name as it appears in the configuration.
		field: &'static str,
	},
	/// The provider base URL cannot be parsed.
	#[error("Provider base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The provider base URL uses a scheme other than HTTP(S).
	#[error("Provider base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Offending URL.
		url: String,
	},
	/// The realm name cannot be used as a single path segment.
	#[error("Realm `{realm}` must not contain whitespace or `/`.")]
	InvalidRealm {
		/// Offending realm name.
		realm: String,
	},
	/// The request timeout is outside the supported range.
	#[error("Request timeout must be between 1 and {max} seconds, got {value}.")]
	TimeoutOutOfRange {
		/// Configured value.
		value: u64,
		/// Maximum supported value.
		max: u64,
	},
	/// Listen address cannot be parsed.
	#[error("Listen address `{value}` is invalid.")]
	InvalidListenAddr {
		/// Offending value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: std::net::AddrParseError,
	},
	/// An explicitly requested configuration file does not exist.
	#[error("Configuration file `{}` does not exist.", path.display())]
	MissingFile {
		/// Requested path.
		path: std::path::PathBuf,
	},
	/// Layered configuration could not be extracted.
	#[error("Configuration could not be loaded.")]
	Load(#[from] Box<figment::Error>),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
impl From<figment::Error> for ConfigError {
	fn from(e: figment::Error) -> Self {
		Self::Load(Box::new(e))
	}
}

/// Transport-level failures (network, IO, request construction).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the identity provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the identity provider.")]
	Io(#[from] std::io::Error),
	/// Outbound HTTP request could not be assembled.
	#[error("Outbound request could not be constructed.")]
	Request(#[from] oauth2::http::Error),
	/// The transport failed without a more specific cause.
	#[error("HTTP client error occurred while calling the identity provider: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
