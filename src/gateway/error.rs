//! Sanitized error responses for the HTTP facade.

// crates.io
use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
// self
use crate::{_prelude::*, error::ExchangeFailure};

/// Failure rendered by the HTTP facade.
///
/// Only [`GatewayError::public_message`] reaches the caller; the [`Display`] form may carry
/// provider text and stays in internal logs.
#[derive(Debug, ThisError)]
pub enum GatewayError {
	/// Failure reported by the identity client.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// The login body used a content type other than JSON or form encoding.
	#[error("Unsupported content type.")]
	UnsupportedContentType,
	/// The login body could not be decoded.
	#[error("Malformed request body.")]
	MalformedBody,
	/// The `Authorization` header is missing or not a bearer credential.
	#[error("Missing or malformed bearer token.")]
	MissingBearer,
}
impl GatewayError {
	/// Returns the HTTP status for this error.
	pub const fn status_code(&self) -> StatusCode {
		match self {
			Self::Auth(err) => match err {
				AuthError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
				AuthError::ExchangeFailed { kind: ExchangeFailure::InvalidGrant, .. }
				| AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
				AuthError::NotFound => StatusCode::NOT_FOUND,
				AuthError::ExchangeFailed { .. }
				| AuthError::UnexpectedResponse { .. }
				| AuthError::TransportFailure(_)
				| AuthError::Timeout => StatusCode::BAD_GATEWAY,
			},
			Self::UnsupportedContentType | Self::MalformedBody => StatusCode::BAD_REQUEST,
			Self::MissingBearer => StatusCode::UNAUTHORIZED,
		}
	}

	/// Returns the caller-facing message.
	///
	/// Validation reasons are authored by the gateway itself and are passed through; every
	/// other failure collapses to a fixed summary.
	pub fn public_message(&self) -> String {
		match self {
			Self::Auth(AuthError::InvalidInput { reason }) => reason.clone(),
			Self::Auth(AuthError::ExchangeFailed { kind: ExchangeFailure::InvalidGrant, .. }) =>
				"invalid username or password".into(),
			Self::Auth(AuthError::Unauthorized) => "access token was rejected".into(),
			Self::Auth(AuthError::NotFound) => "user not found".into(),
			Self::Auth(AuthError::Timeout) => "identity provider timed out".into(),
			Self::Auth(_) => "identity provider error".into(),
			Self::UnsupportedContentType =>
				"content type must be application/json or application/x-www-form-urlencoded".into(),
			Self::MalformedBody => "request body could not be decoded".into(),
			Self::MissingBearer => "missing or malformed bearer token".into(),
		}
	}
}
impl IntoResponse for GatewayError {
	fn into_response(self) -> Response {
		let status = self.status_code();

		if status.is_server_error() {
			tracing::debug!(status = status.as_u16(), error = %self, "Responding with upstream failure.");
		}

		(status, Json(ErrorBody { error: self.public_message() })).into_response()
	}
}

/// JSON body returned for every failed request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
	/// Sanitized, caller-facing message.
	pub error: String,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::TransportError;

	#[test]
	fn auth_errors_map_to_documented_statuses() {
		let cases = [
			(AuthError::invalid_input("username must not be empty"), StatusCode::BAD_REQUEST),
			(
				AuthError::exchange_failed(ExchangeFailure::InvalidGrant, "Invalid user credentials"),
				StatusCode::UNAUTHORIZED,
			),
			(AuthError::Unauthorized, StatusCode::UNAUTHORIZED),
			(AuthError::NotFound, StatusCode::NOT_FOUND),
			(AuthError::exchange_failed(ExchangeFailure::InvalidClient, "bad"), StatusCode::BAD_GATEWAY),
			(AuthError::exchange_failed(ExchangeFailure::Upstream, "down"), StatusCode::BAD_GATEWAY),
			(
				AuthError::exchange_failed(ExchangeFailure::MalformedResponse, "junk"),
				StatusCode::BAD_GATEWAY,
			),
			(
				AuthError::UnexpectedResponse { status: Some(500), reason: "boom".into() },
				StatusCode::BAD_GATEWAY,
			),
			(
				TransportError::Other { message: "reset".into() }.into(),
				StatusCode::BAD_GATEWAY,
			),
			(AuthError::Timeout, StatusCode::BAD_GATEWAY),
		];

		for (err, expected) in cases {
			assert_eq!(GatewayError::from(err).status_code(), expected);
		}
	}

	#[test]
	fn request_shape_errors_are_bad_requests() {
		assert_eq!(GatewayError::UnsupportedContentType.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(GatewayError::MalformedBody.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(GatewayError::MissingBearer.status_code(), StatusCode::UNAUTHORIZED);
	}

	#[test]
	fn provider_text_is_not_exposed() {
		let err = GatewayError::from(AuthError::exchange_failed(
			ExchangeFailure::Upstream,
			"java.lang.NullPointerException at org.keycloak",
		));

		assert!(err.to_string().contains("NullPointerException"));
		assert_eq!(err.public_message(), "identity provider error");
	}
}
