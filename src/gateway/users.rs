//! `GET /users/{id}` bearer extraction and the user lookup handler.

// crates.io
use axum::{
	Json,
	extract::{FromRequestParts, Path, State},
	http::{HeaderValue, header::AUTHORIZATION, request::Parts},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, UserId, UserRecord},
	gateway::{GatewayError, GatewayState},
};

/// Bearer token taken from the caller's `Authorization` header.
#[derive(Debug)]
pub struct BearerToken(pub AccessToken);
impl<S> FromRequestParts<S> for BearerToken
where
	S: Send + Sync,
{
	type Rejection = GatewayError;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		parse_bearer(parts.headers.get(AUTHORIZATION)).map(Self).ok_or(GatewayError::MissingBearer)
	}
}

fn parse_bearer(value: Option<&HeaderValue>) -> Option<AccessToken> {
	let raw = value?.to_str().ok()?.trim();
	let (scheme, token) = raw.split_once(' ')?;
	let token = token.trim();

	(scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| AccessToken::new(token))
}

/// `GET /users/{id}`: looks a user up with the caller's bearer token.
pub async fn get_user(
	State(state): State<GatewayState>,
	BearerToken(token): BearerToken,
	Path(id): Path<String>,
) -> Result<Json<UserRecord>, GatewayError> {
	let user_id = UserId::new(&id)
		.map_err(|err| AuthError::invalid_input(format!("user id is invalid: {err}")))?;
	let user = state.client().get_user(&user_id, &token).await?;

	Ok(Json(user))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn bearer_scheme_is_case_insensitive() {
		let value = HeaderValue::from_static("bearer abc.def");

		let token = parse_bearer(Some(&value)).expect("Lowercase scheme should parse.");

		assert_eq!(token.expose(), "abc.def");
	}

	#[test]
	fn non_bearer_headers_are_rejected() {
		for raw in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer    ", "abc.def"] {
			let value = HeaderValue::from_static(raw);

			assert!(parse_bearer(Some(&value)).is_none(), "`{raw}` must not parse as bearer");
		}

		assert!(parse_bearer(None).is_none());
	}
}
