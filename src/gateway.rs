//! HTTP facade exposing the identity client to other services.
//!
//! The router is stateless apart from a shared [`ReqwestIdentityClient`]:
//!
//! - `GET /health` answers `ok`.
//! - `POST /login` exchanges a JSON or form-encoded `{username, password}` body for a token.
//! - `GET /users/{id}` fetches a user with the caller's bearer token.
//!
//! Failures are rendered by [`GatewayError`] as `{"error": "..."}` bodies that never carry
//! provider text.

mod error;
mod login;
mod users;

pub use error::*;
pub use login::*;
pub use users::*;

// crates.io
use axum::{
	Router,
	routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
// self
use crate::{
	_prelude::*,
	config::GatewayConfig,
	error::ConfigError,
	flows::{IdentityClient, ReqwestIdentityClient},
};

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct GatewayState {
	client: Arc<ReqwestIdentityClient>,
}
impl GatewayState {
	/// Wraps an already configured identity client.
	pub fn new(client: impl Into<Arc<ReqwestIdentityClient>>) -> Self {
		Self { client: client.into() }
	}

	/// Builds the identity client described by `config`.
	pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
		let client = IdentityClient::new(config.registration()?, config.request_timeout()?)?;

		Ok(Self::new(client))
	}

	/// Returns the shared identity client.
	pub fn client(&self) -> &ReqwestIdentityClient {
		&self.client
	}
}

/// Builds the gateway router with request tracing attached.
pub fn router(state: GatewayState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/login", post(login))
		.route("/users/{id}", get(get_user))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

/// Serves [`router`] on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish once the shutdown future completes.
pub async fn serve<F>(
	listener: TcpListener,
	state: GatewayState,
	shutdown: F,
) -> std::io::Result<()>
where
	F: 'static + Send + Future<Output = ()>,
{
	axum::serve(listener, router(state)).with_graceful_shutdown(shutdown).await
}

async fn health() -> &'static str {
	"ok"
}
