//! Identity provider flows powered by the gateway's transport and facade layers.

mod password;
mod user_lookup;

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{ProviderHttpClient, ReqwestHttpClient},
	oauth::{BasicFacade, ReqwestTransportErrorMapper, TransportErrorMapper},
	provider::{ClientRegistration, DefaultProviderStrategy, ProviderStrategy},
};

/// Identity client specialized for the crate's default reqwest transport stack.
pub type ReqwestIdentityClient = IdentityClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Runs password-grant exchanges and user lookups against a single client registration.
///
/// The client owns the HTTP transport, error mapper, registration, and strategy so each
/// flow only deals with request construction and response mapping. Nothing mutable is
/// shared between calls: every request builds its own parameter set, and results are
/// handed straight back to the caller.
pub struct IdentityClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Validated client registration.
	pub registration: ClientRegistration,
	/// Strategy responsible for token request adjustments and error classification.
	pub strategy: Arc<dyn ProviderStrategy>,
	facade: BasicFacade<C, M>,
}
impl<C, M> IdentityClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		registration: ClientRegistration,
		strategy: Arc<dyn ProviderStrategy>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self, ConfigError> {
		let http_client = http_client.into();
		let transport_mapper = mapper.into();
		let facade = BasicFacade::from_registration(
			&registration,
			Arc::clone(&http_client),
			Arc::clone(&transport_mapper),
		)?;

		Ok(Self { http_client, transport_mapper, registration, strategy, facade })
	}
}
impl IdentityClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a reqwest-backed client whose outbound calls abort after `timeout`.
	pub fn new(registration: ClientRegistration, timeout: StdDuration) -> Result<Self, ConfigError> {
		Self::with_http_client(
			registration,
			Arc::new(DefaultProviderStrategy),
			ReqwestHttpClient::with_timeout(timeout)?,
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for IdentityClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdentityClient").field("registration", &self.registration).finish()
	}
}
