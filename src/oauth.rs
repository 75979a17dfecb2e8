//! OAuth client facade for the password grant plus transport error mapping.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, ResourceOwnerPassword, ResourceOwnerUsername, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{Credential, Secret, TokenResult},
	error::{ConfigError, ExchangeFailure, TransportError},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::FlowKind,
	provider::{ClientAuthMethod, ClientRegistration, ProviderErrorContext, ProviderStrategy},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Maps HTTP transport failures into gateway [`AuthError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a gateway error.
	fn map_transport_error(
		&self,
		flow: FlowKind,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> AuthError;
}

/// Default mapper for reqwest-backed transports.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		flow: FlowKind,
		_meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> AuthError {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(flow, *inner),
			HttpClientError::Http(inner) => TransportError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Other { message }.into(),
			_ => TransportError::Other { message: format!("unclassified {flow} failure") }.into(),
		}
	}
}

pub(crate) trait OAuth2Facade {
	fn exchange_password<'a, 'strategy, 'cred>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		credential: &'cred Credential,
		extra_params: Vec<(String, String)>,
	) -> FacadeFuture<'a, TokenResult>
	where
		'strategy: 'a,
		'cred: 'a;
}

pub(crate) struct BasicFacade<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicFacade<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_registration(
		registration: &ClientRegistration,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self, ConfigError> {
		let token_url = TokenUrl::new(registration.token_endpoint().to_string())
			.map_err(|source| ConfigError::InvalidBaseUrl { source })?;
		let mut oauth_client = BasicClient::new(ClientId::new(registration.client_id.clone()))
			.set_client_secret(ClientSecret::new(registration.client_secret.expose().to_owned()))
			.set_token_uri(token_url);

		if matches!(registration.client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self { oauth_client, http_client, error_mapper })
	}
}
impl<C, M> OAuth2Facade for BasicFacade<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn exchange_password<'a, 'strategy, 'cred>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		credential: &'cred Credential,
		extra_params: Vec<(String, String)>,
	) -> FacadeFuture<'a, TokenResult>
	where
		'strategy: 'a,
		'cred: 'a,
	{
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let username = ResourceOwnerUsername::new(credential.username.clone());
			let password = ResourceOwnerPassword::new(credential.password.expose().to_owned());
			let mut request = self.oauth_client.exchange_password(&username, &password);

			for (key, value) in extra_params {
				request = request.add_extra_param(key, value);
			}

			match request.request_async(&instrumented).await {
				Ok(response) => Ok(map_token_response(response)),
				Err(err) => settle_request_error(strategy, meta.take(), err, self.error_mapper.as_ref()),
			}
		})
	}
}

fn map_token_response(response: BasicTokenResponse) -> TokenResult {
	let scope = response.scopes().map(|scopes| {
		scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" ")
	});

	TokenResult {
		access_token: Secret::new(response.access_token().secret().to_owned()),
		token_type: canonical_token_type(response.token_type().as_ref()),
		expires_in: response.expires_in().map(|lifetime| lifetime.as_secs()).unwrap_or_default(),
		refresh_token: response
			.refresh_token()
			.map(|token| Secret::new(token.secret().to_owned())),
		scope,
		issued_at: OffsetDateTime::now_utc(),
	}
}

fn canonical_token_type(raw: &str) -> String {
	if raw.eq_ignore_ascii_case("bearer") { "Bearer".into() } else { raw.to_owned() }
}

/// Token body accepted when the provider omits fields `oauth2` insists on.
#[derive(Deserialize)]
struct LenientTokenResponse {
	access_token: String,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	expires_in: Option<u64>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	scope: Option<String>,
}
impl From<LenientTokenResponse> for TokenResult {
	fn from(response: LenientTokenResponse) -> Self {
		Self {
			access_token: Secret::new(response.access_token),
			token_type: response
				.token_type
				.as_deref()
				.map_or_else(|| "Bearer".into(), canonical_token_type),
			expires_in: response.expires_in.unwrap_or_default(),
			refresh_token: response.refresh_token.map(Secret::new),
			scope: response.scope,
			issued_at: OffsetDateTime::now_utc(),
		}
	}
}

fn parse_lenient_token(body: &[u8]) -> Option<TokenResult> {
	serde_json::from_slice::<LenientTokenResponse>(body)
		.ok()
		.filter(|response| !response.access_token.is_empty())
		.map(TokenResult::from)
}

fn settle_request_error<E, M>(
	strategy: &dyn ProviderStrategy,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Result<TokenResult>
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let recovered = match &err {
		RequestTokenError::Parse(_, body) if is_success(meta_status(meta.as_ref())) =>
			parse_lenient_token(body),
		_ => None,
	};

	recovered.ok_or_else(|| map_request_error(strategy, meta, err, mapper))
}

fn map_request_error<E, M>(
	strategy: &dyn ProviderStrategy,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> AuthError
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();
	let status = meta_status(meta_ref);

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(strategy, response, status),
		RequestTokenError::Request(error) =>
			mapper.map_transport_error(FlowKind::PasswordGrant, meta_ref, error),
		RequestTokenError::Parse(error, _) if is_success(status) => AuthError::exchange_failed(
			ExchangeFailure::MalformedResponse,
			format!("Token response could not be parsed at `{}`", error.path()),
		),
		RequestTokenError::Parse(_, body) => {
			let mut ctx = ProviderErrorContext::new()
				.with_body_preview(String::from_utf8_lossy(&body).into_owned());

			if let Some(status) = status {
				ctx = ctx.with_http_status(status);
			}

			AuthError::exchange_failed(
				strategy.classify_token_error(&ctx),
				format!(
					"Token endpoint returned HTTP {} with a non-OAuth body",
					display_status(status)
				),
			)
		},
		RequestTokenError::Other(message) if is_success(status) => AuthError::exchange_failed(
			ExchangeFailure::MalformedResponse,
			format!("Token endpoint response rejected: {message}"),
		),
		RequestTokenError::Other(message) => {
			let mut ctx = ProviderErrorContext::new();

			if let Some(status) = status {
				ctx = ctx.with_http_status(status);
			}

			AuthError::exchange_failed(
				strategy.classify_token_error(&ctx),
				format!(
					"Token endpoint returned HTTP {} without a usable body: {message}",
					display_status(status)
				),
			)
		},
	}
}

fn map_server_response_error(
	strategy: &dyn ProviderStrategy,
	response: BasicErrorResponse,
	status: Option<u16>,
) -> AuthError {
	let mut ctx =
		ProviderErrorContext::new().with_oauth_error(response.error().as_ref().to_string());

	if let Some(description) = response.error_description() {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(status) = status {
		ctx = ctx.with_http_status(status);
	}

	let kind = strategy.classify_token_error(&ctx);
	let reason = match response.error_description() {
		Some(description) => format!("Token endpoint returned an OAuth error: {description}"),
		None => format!("Token endpoint returned an OAuth error: {}", response.error().as_ref()),
	};

	AuthError::exchange_failed(kind, reason)
}

fn map_reqwest_error(flow: FlowKind, err: ReqwestError) -> AuthError {
	if err.is_timeout() {
		tracing::debug!(flow = flow.as_str(), "Identity provider call timed out.");

		return AuthError::Timeout;
	}

	TransportError::from(err).into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn is_success(status: Option<u16>) -> bool {
	matches!(status, Some(200..=299))
}

fn display_status(status: Option<u16>) -> String {
	status.map_or_else(|| "?".into(), |code| code.to_string())
}
