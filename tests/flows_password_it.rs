// std
use std::time::Duration as StdDuration;
// crates.io
use httpmock::prelude::*;
// self
use keycloak_gateway::{
	auth::Credential,
	error::{AuthError, ExchangeFailure},
	flows::{IdentityClient, ReqwestIdentityClient},
	provider::ClientRegistration,
};

const CLIENT_ID: &str = "nodejs-microservice";
const CLIENT_SECRET: &str = "password-flow-secret";
const TOKEN_PATH: &str = "/realms/demo/protocol/openid-connect/token";

fn build_client(base_url: &str, timeout: StdDuration) -> ReqwestIdentityClient {
	let registration = ClientRegistration::builder()
		.client_id(CLIENT_ID)
		.client_secret(CLIENT_SECRET)
		.realm("demo")
		.provider_base_url(base_url)
		.build()
		.expect("Password flow registration should be valid.");

	IdentityClient::new(registration, timeout).expect("Password flow client should build.")
}

fn client_for(server: &MockServer) -> ReqwestIdentityClient {
	build_client(&server.base_url(), StdDuration::from_secs(5))
}

#[tokio::test]
async fn password_grant_returns_the_issued_token() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded")
				.body_includes("grant_type=password")
				.body_includes("username=avv")
				.body_includes("password=avv")
				.body_includes(format!("client_id={CLIENT_ID}"))
				.body_includes(format!("client_secret={CLIENT_SECRET}"));
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"eyJhbGciOi.demo\",\"token_type\":\"bearer\",\"expires_in\":300,\"refresh_token\":\"refresh-demo\"}",
			);
		})
		.await;
	let token = client_for(&server)
		.exchange_password(&Credential::new("avv", "avv"))
		.await
		.expect("Password grant should succeed.");

	mock.assert_async().await;

	assert_eq!(token.access_token.expose(), "eyJhbGciOi.demo");
	assert_eq!(token.token_type, "Bearer");
	assert_eq!(token.expires_in, 300);
	assert_eq!(token.refresh_token.as_ref().map(|secret| secret.expose()), Some("refresh-demo"));
	assert!(token.expires_at() > token.issued_at);
}

#[tokio::test]
async fn token_endpoint_honors_the_context_path() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(format!("/auth{TOKEN_PATH}"));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"legacy\",\"token_type\":\"Bearer\",\"expires_in\":60}");
		})
		.await;
	let client = build_client(&server.url("/auth"), StdDuration::from_secs(5));
	let token = client
		.exchange_password(&Credential::new("avv", "avv"))
		.await
		.expect("Legacy context path should be honored.");

	mock.assert_async().await;

	assert_eq!(token.access_token.expose(), "legacy");
}

#[tokio::test]
async fn provider_rejections_are_classified() {
	let cases = [
		(
			401,
			"{\"error\":\"invalid_grant\",\"error_description\":\"Invalid user credentials\"}",
			ExchangeFailure::InvalidGrant,
		),
		(
			401,
			"{\"error\":\"unauthorized_client\",\"error_description\":\"Invalid client secret\"}",
			ExchangeFailure::InvalidClient,
		),
		(503, "<html><body>Service Unavailable</body></html>", ExchangeFailure::Upstream),
	];

	for (status, body, expected) in cases {
		let server = MockServer::start_async().await;
		let content_type =
			if body.starts_with('{') { "application/json" } else { "text/html; charset=utf-8" };
		let mock = server
			.mock_async(|when, then| {
				when.method(POST).path(TOKEN_PATH);
				then.status(status).header("content-type", content_type).body(body);
			})
			.await;
		let err = client_for(&server)
			.exchange_password(&Credential::new("avv", "wrong"))
			.await
			.expect_err("Rejected grants must fail.");

		mock.assert_async().await;

		match err {
			AuthError::ExchangeFailed { kind, .. } => assert_eq!(kind, expected, "status {status}"),
			other => panic!("Unexpected error variant for status {status}: {other:?}"),
		}
	}
}

#[tokio::test]
async fn missing_token_type_defaults_to_bearer() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"abc\",\"expires_in\":300}");
		})
		.await;
	let token = client_for(&server)
		.exchange_password(&Credential::new("avv", "avv"))
		.await
		.expect("Token bodies without token_type should be accepted.");

	mock.assert_async().await;

	assert_eq!(token.access_token.expose(), "abc");
	assert_eq!(token.token_type, "Bearer");
	assert_eq!(token.expires_in, 300);
}

#[tokio::test]
async fn empty_rejections_are_classified_by_status() {
	let cases = [
		(401, ExchangeFailure::InvalidGrant),
		(400, ExchangeFailure::InvalidGrant),
		(503, ExchangeFailure::Upstream),
	];

	for (status, expected) in cases {
		let server = MockServer::start_async().await;
		let _mock = server
			.mock_async(|when, then| {
				when.method(POST).path(TOKEN_PATH);
				then.status(status);
			})
			.await;
		let err = client_for(&server)
			.exchange_password(&Credential::new("avv", "wrong"))
			.await
			.expect_err("Bodiless rejections must fail.");

		match err {
			AuthError::ExchangeFailed { kind, .. } => assert_eq!(kind, expected, "status {status}"),
			other => panic!("Unexpected error variant for status {status}: {other:?}"),
		}
	}
}

#[tokio::test]
async fn missing_access_token_is_a_malformed_response() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"token_type\":\"Bearer\",\"expires_in\":300}");
		})
		.await;
	let err = client_for(&server)
		.exchange_password(&Credential::new("avv", "avv"))
		.await
		.expect_err("Token bodies without access_token must fail.");

	mock.assert_async().await;

	assert!(matches!(err, AuthError::ExchangeFailed { kind: ExchangeFailure::MalformedResponse, .. }));
}

#[tokio::test]
async fn blank_credentials_fail_before_dispatch() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"unused\",\"token_type\":\"Bearer\"}");
		})
		.await;
	let client = client_for(&server);
	let blanks =
		[Credential::new("", "avv"), Credential::new("   ", "avv"), Credential::new("avv", "")];

	for credential in blanks {
		let err = client
			.exchange_password(&credential)
			.await
			.expect_err("Blank credentials must be rejected locally.");

		assert!(matches!(err, AuthError::InvalidInput { .. }));
	}

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn slow_providers_time_out() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"late\",\"token_type\":\"Bearer\"}")
				.delay(StdDuration::from_secs(3));
		})
		.await;
	let client = build_client(&server.base_url(), StdDuration::from_millis(300));
	let err = client
		.exchange_password(&Credential::new("avv", "avv"))
		.await
		.expect_err("Slow providers must hit the request timeout.");

	assert!(matches!(err, AuthError::Timeout), "Unexpected error: {err:?}");
}

#[tokio::test]
async fn concurrent_exchanges_do_not_share_parameters() {
	let server = MockServer::start_async().await;
	let alice = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH).body_includes("username=alice");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"alice-token\",\"token_type\":\"Bearer\",\"expires_in\":60}");
		})
		.await;
	let bob = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH).body_includes("username=bob");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"bob-token\",\"token_type\":\"Bearer\",\"expires_in\":60}");
		})
		.await;
	let client = client_for(&server);
	let alice_credential = Credential::new("alice", "alice-pass");
	let bob_credential = Credential::new("bob", "bob-pass");
	let (alice_token, bob_token) = tokio::join!(
		client.exchange_password(&alice_credential),
		client.exchange_password(&bob_credential),
	);

	assert_eq!(alice_token.expect("Alice should be granted.").access_token.expose(), "alice-token");
	assert_eq!(bob_token.expect("Bob should be granted.").access_token.expose(), "bob-token");

	alice.assert_async().await;
	bob.assert_async().await;
}
