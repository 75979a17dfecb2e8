//! Resource-owner password grant against the realm's token endpoint.
//!
//! [`IdentityClient::exchange_password`] validates the credential locally, builds a fresh
//! form for every call, and posts it through the OAuth facade. Failures are classified by
//! the configured [`ProviderStrategy`](crate::provider::ProviderStrategy) and logged
//! without the credential.

// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenResult},
	flows::IdentityClient,
	http::ProviderHttpClient,
	oauth::{OAuth2Facade, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

const RESERVED_PARAMS: [&str; 6] =
	["grant_type", "username", "password", "client_id", "client_secret", "scope"];

impl<C, M> IdentityClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges a username/password pair for an access token.
	///
	/// Blank usernames or passwords fail with [`AuthError::InvalidInput`] before any
	/// network I/O. The call is never retried.
	pub async fn exchange_password(&self, credential: &Credential) -> Result<TokenResult> {
		const KIND: FlowKind = FlowKind::PasswordGrant;

		let span = FlowSpan::new(KIND, "exchange_password");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				credential.validate()?;

				let mut form = BTreeMap::new();

				self.strategy.augment_token_request(&mut form);

				let extra_params = form
					.into_iter()
					.filter(|(key, _)| !RESERVED_PARAMS.contains(&key.as_str()))
					.collect::<Vec<_>>();

				tracing::debug!(
					endpoint = %self.registration.token_endpoint(),
					extra_params = extra_params.len(),
					"Requesting password grant."
				);

				self.facade
					.exchange_password(self.strategy.as_ref(), credential, extra_params)
					.await
			})
			.await;

		match &result {
			Ok(token) => {
				tracing::debug!(expires_in = token.expires_in, "Password grant succeeded.");

				obs::record_flow_outcome(KIND, FlowOutcome::Success);
			},
			Err(AuthError::InvalidInput { reason }) => {
				tracing::debug!(%reason, "Password grant rejected before dispatch.");

				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
			Err(err) => {
				tracing::warn!(error = %err, "Password grant failed.");

				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use httpmock::prelude::*;
	use tracing_test::traced_test;
	// self
	use super::*;
	use crate::{_preludet::*, error::ExchangeFailure};

	const LEAKY_PASSWORD: &str = "pa55-w0rd-that-must-not-leak";

	#[tokio::test]
	#[traced_test]
	async fn password_never_reaches_logs() {
		let server = MockServer::start_async().await;
		let client = build_reqwest_test_client(&server.base_url());
		let rejected = server
			.mock_async(|when, then| {
				when.method(POST).path(TOKEN_PATH).body_includes("username=intruder");
				then.status(401).header("content-type", "application/json").body(
					"{\"error\":\"invalid_grant\",\"error_description\":\"Invalid user credentials\"}",
				);
			})
			.await;
		let accepted = server
			.mock_async(|when, then| {
				when.method(POST).path(TOKEN_PATH).body_includes("username=avv");
				then.status(200).header("content-type", "application/json").body(
					"{\"access_token\":\"granted\",\"token_type\":\"Bearer\",\"expires_in\":300}",
				);
			})
			.await;
		let err = client
			.exchange_password(&Credential::new("intruder", LEAKY_PASSWORD))
			.await
			.expect_err("Rejected credentials should fail.");

		assert!(matches!(err, AuthError::ExchangeFailed { kind: ExchangeFailure::InvalidGrant, .. }));

		let token = client
			.exchange_password(&Credential::new("avv", LEAKY_PASSWORD))
			.await
			.expect("Accepted credentials should succeed.");

		assert_eq!(token.access_token.expose(), "granted");

		let _ = client.exchange_password(&Credential::new("avv", "")).await;

		rejected.assert_async().await;
		accepted.assert_async().await;

		assert!(logs_contain("Password grant failed."));
		assert!(!logs_contain(LEAKY_PASSWORD));
		assert!(!logs_contain(CLIENT_SECRET));
	}
}
