//! Bearer-authenticated user lookups against the realm's admin API.

// crates.io
use oauth2::{
	AsyncHttpClient, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ProviderUser, UserId, UserRecord},
	error::TransportError,
	flows::IdentityClient,
	http::{ProviderHttpClient, ResponseMetadataSlot},
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C, M> IdentityClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches a single user by identifier, authenticated with `access_token`.
	///
	/// The token must carry the provider's user-view permissions; a rejected token yields
	/// [`AuthError::Unauthorized`] and an unknown id yields [`AuthError::NotFound`].
	pub async fn get_user(&self, user_id: &UserId, access_token: &AccessToken) -> Result<UserRecord> {
		const KIND: FlowKind = FlowKind::UserLookup;

		let span = FlowSpan::new(KIND, "get_user");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let endpoint = self.registration.user_endpoint(user_id);
				let request = Request::builder()
					.method(Method::GET)
					.uri(endpoint.as_str())
					.header(AUTHORIZATION, access_token.bearer_header())
					.header(ACCEPT, "application/json")
					.body(Vec::new())
					.map_err(TransportError::from)?;
				let meta = ResponseMetadataSlot::default();
				let handle = self.http_client.with_metadata(meta.clone());

				tracing::debug!(%user_id, "Requesting user record.");

				let response = handle.call(request).await.map_err(|err| {
					self.transport_mapper.map_transport_error(KIND, meta.take().as_ref(), err)
				})?;

				map_user_response(user_id, response)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(err) => {
				tracing::warn!(%user_id, error = %err, "User lookup failed.");

				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		result
	}
}

fn map_user_response(requested: &UserId, response: HttpResponse) -> Result<UserRecord> {
	let status = response.status().as_u16();

	match status {
		200..=299 => {
			let mut de = serde_json::Deserializer::from_slice(response.body());
			let user: ProviderUser = serde_path_to_error::deserialize(&mut de).map_err(|err| {
				AuthError::UnexpectedResponse {
					status: Some(status),
					reason: format!("user body could not be parsed at `{}`", err.path()),
				}
			})?;

			UserRecord::project(requested, user)
		},
		401 | 403 => Err(AuthError::Unauthorized),
		404 => Err(AuthError::NotFound),
		_ => Err(AuthError::UnexpectedResponse {
			status: Some(status),
			reason: format!("user endpoint returned HTTP {status}"),
		}),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::StatusCode;
	// self
	use super::*;

	const USER_ID: &str = "c9dd46b9-8eb2-4f1e-b51b-a35d6a0c1496";

	fn response(status: StatusCode, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() = status;

		response
	}

	fn requested() -> UserId {
		UserId::new(USER_ID).expect("User id fixture should be valid.")
	}

	#[test]
	fn maps_status_codes_into_taxonomy() {
		assert!(matches!(
			map_user_response(&requested(), response(StatusCode::NOT_FOUND, "")),
			Err(AuthError::NotFound)
		));
		assert!(matches!(
			map_user_response(&requested(), response(StatusCode::UNAUTHORIZED, "")),
			Err(AuthError::Unauthorized)
		));
		assert!(matches!(
			map_user_response(&requested(), response(StatusCode::FORBIDDEN, "")),
			Err(AuthError::Unauthorized)
		));
		assert!(matches!(
			map_user_response(&requested(), response(StatusCode::INTERNAL_SERVER_ERROR, "")),
			Err(AuthError::UnexpectedResponse { status: Some(500), .. })
		));
	}

	#[test]
	fn malformed_bodies_are_unexpected_responses() {
		let err = map_user_response(&requested(), response(StatusCode::OK, "{\"id\":42}"))
			.expect_err("Malformed user bodies must fail.");

		match err {
			AuthError::UnexpectedResponse { status, reason } => {
				assert_eq!(status, Some(200));
				assert!(reason.contains("id"), "Reason should point at the failing field: {reason}");
			},
			other => panic!("Unexpected error variant: {other:?}"),
		}
	}

	#[test]
	fn successful_bodies_are_projected() {
		let body = format!("{{\"id\":\"{USER_ID}\",\"username\":\"avv\",\"attributes\":{{}}}}");
		let record = map_user_response(&requested(), response(StatusCode::OK, &body))
			.expect("Well-formed user bodies should project.");

		assert_eq!(record.id.as_ref(), USER_ID);
		assert_eq!(record.username, "avv");
	}
}
