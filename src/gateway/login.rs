//! `POST /login` body extraction and the password-grant handler.

// crates.io
use axum::{
	Form, Json,
	extract::{FromRequest, Request, State},
	http::{HeaderMap, header::CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenResult},
	gateway::{GatewayError, GatewayState},
};

/// Login body accepted as either JSON or `application/x-www-form-urlencoded`.
#[derive(Debug)]
pub struct LoginRequest(pub Credential);
impl<S> FromRequest<S> for LoginRequest
where
	S: Send + Sync,
{
	type Rejection = GatewayError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let credential = match BodyKind::detect(req.headers()) {
			Some(BodyKind::Json) => Json::<Credential>::from_request(req, state)
				.await
				.map_err(|rejection| {
					tracing::debug!(status = %rejection.status(), "Rejected JSON login body.");

					GatewayError::MalformedBody
				})?
				.0,
			Some(BodyKind::Form) => Form::<Credential>::from_request(req, state)
				.await
				.map_err(|rejection| {
					tracing::debug!(status = %rejection.status(), "Rejected form login body.");

					GatewayError::MalformedBody
				})?
				.0,
			None => return Err(GatewayError::UnsupportedContentType),
		};

		Ok(Self(credential))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BodyKind {
	Json,
	Form,
}
impl BodyKind {
	fn detect(headers: &HeaderMap) -> Option<Self> {
		let raw = headers.get(CONTENT_TYPE)?.to_str().ok()?;
		let essence = raw.split(';').next().unwrap_or_default().trim();

		if essence.eq_ignore_ascii_case("application/json") {
			Some(Self::Json)
		} else if essence.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
			Some(Self::Form)
		} else {
			None
		}
	}
}

/// Successful login body.
#[derive(Clone, Serialize)]
pub struct LoginResponse {
	/// Bearer access token.
	pub access_token: String,
	/// Token type, normally `Bearer`.
	pub token_type: String,
	/// Lifetime in seconds.
	pub expires_in: u64,
	/// Refresh token, when issued.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<String>,
	/// Granted scopes, when reported.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
}
impl From<TokenResult> for LoginResponse {
	fn from(token: TokenResult) -> Self {
		Self {
			access_token: token.access_token.expose().to_owned(),
			token_type: token.token_type,
			expires_in: token.expires_in,
			refresh_token: token.refresh_token.map(|secret| secret.expose().to_owned()),
			scope: token.scope,
		}
	}
}

/// `POST /login`: exchanges the caller's credential for a token.
pub async fn login(
	State(state): State<GatewayState>,
	LoginRequest(credential): LoginRequest,
) -> Result<Json<LoginResponse>, GatewayError> {
	let token = state.client().exchange_password(&credential).await?;

	Ok(Json(token.into()))
}
