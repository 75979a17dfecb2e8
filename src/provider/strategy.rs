//! Provider strategy hooks that customize token exchanges.
//!
//! Implementations decorate outgoing token requests and classify failed exchanges
//! without tying flows to any particular HTTP client.

// self
use crate::{_prelude::*, error::ExchangeFailure};

/// Strategy hook that allows providers to decorate requests and classify errors.
///
/// Implementors are required to be `Send + Sync`, and the hooks use crate-owned data
/// types so downstream crates never depend on reqwest-specific structures. Override only
/// what you need; `augment_token_request` has a default no-op implementation.
pub trait ProviderStrategy: Send + Sync {
	/// Maps a failed token endpoint response into an [`ExchangeFailure`] category.
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ExchangeFailure;

	/// Gives providers a chance to add custom form parameters before dispatching.
	///
	/// The map starts empty for every request. Keys that collide with the grant's own
	/// parameters (`grant_type`, `username`, `password`, `client_id`, `client_secret`,
	/// `scope`) are ignored.
	fn augment_token_request(&self, _form: &mut BTreeMap<String, String>) {}
}

/// Context passed to provider strategies when classifying token errors.
///
/// The struct keeps only primitive data (status code, OAuth fields, body preview) so
/// strategies stay decoupled from any HTTP client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Provider-supplied OAuth `error` field.
	pub oauth_error: Option<String>,
	/// Provider-supplied OAuth `error_description` field.
	pub error_description: Option<String>,
	/// Preview of the response body for non-JSON payloads.
	pub body_preview: Option<String>,
}
impl ProviderErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an HTTP status code (e.g., 400, 401, 500).
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth error code string returned by the provider.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Adds a body preview for providers that return non-JSON payloads.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}
}

/// Default strategy tuned for Keycloak's token endpoint.
///
/// It prioritizes structured OAuth fields (`error`, `error_description`), then falls back
/// to body text hints, and finally the HTTP status code.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ExchangeFailure {
		if let Some(kind) =
			classify_oauth_error(ctx.oauth_error.as_deref(), ctx.error_description.as_deref())
		{
			return kind;
		}
		if let Some(kind) = classify_body(ctx.body_preview.as_deref()) {
			return kind;
		}

		classify_status(ctx.http_status)
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ProviderErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = body.chars().take(ProviderErrorContext::BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

fn classify_oauth_error(
	oauth_error: Option<&str>,
	error_description: Option<&str>,
) -> Option<ExchangeFailure> {
	oauth_error
		.and_then(match_exact_value)
		.or_else(|| error_description.and_then(match_exact_value))
		.or_else(|| classify_body(error_description))
}

fn match_exact_value(value: &str) -> Option<ExchangeFailure> {
	if value.eq_ignore_ascii_case("invalid_grant") || value.eq_ignore_ascii_case("access_denied") {
		Some(ExchangeFailure::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
		|| value.eq_ignore_ascii_case("unsupported_grant_type")
		|| value.eq_ignore_ascii_case("invalid_request")
		|| value.eq_ignore_ascii_case("invalid_scope")
	{
		Some(ExchangeFailure::InvalidClient)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(ExchangeFailure::Upstream)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<ExchangeFailure> {
	let body = body?;
	let lowered = body.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") || text.contains("invalid user credentials") =>
			Some(ExchangeFailure::InvalidGrant),
		text if text.contains("invalid_client") || text.contains("unauthorized_client") =>
			Some(ExchangeFailure::InvalidClient),
		text if text.contains("temporarily_unavailable") || text.contains("retry") =>
			Some(ExchangeFailure::Upstream),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> ExchangeFailure {
	match status {
		Some(400 | 401) => ExchangeFailure::InvalidGrant,
		Some(403) => ExchangeFailure::InvalidClient,
		_ => ExchangeFailure::Upstream,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn oauth_error_fields_take_priority() {
		let strategy = DefaultProviderStrategy;
		let ctx = ProviderErrorContext::new()
			.with_http_status(401)
			.with_oauth_error("invalid_grant")
			.with_error_description("Invalid user credentials");

		assert_eq!(strategy.classify_token_error(&ctx), ExchangeFailure::InvalidGrant);

		let ctx = ProviderErrorContext::new()
			.with_http_status(400)
			.with_oauth_error("unauthorized_client")
			.with_error_description("Client not allowed for direct access grants");

		assert_eq!(strategy.classify_token_error(&ctx), ExchangeFailure::InvalidClient);
	}

	#[test]
	fn falls_back_to_body_then_status() {
		let strategy = DefaultProviderStrategy;
		let ctx = ProviderErrorContext::new()
			.with_http_status(500)
			.with_body_preview("<html>Please retry later</html>");

		assert_eq!(strategy.classify_token_error(&ctx), ExchangeFailure::Upstream);

		let ctx = ProviderErrorContext::new().with_http_status(401);

		assert_eq!(strategy.classify_token_error(&ctx), ExchangeFailure::InvalidGrant);

		let ctx = ProviderErrorContext::new().with_http_status(503);

		assert_eq!(strategy.classify_token_error(&ctx), ExchangeFailure::Upstream);
	}

	#[test]
	fn body_preview_is_truncated() {
		let ctx = ProviderErrorContext::new().with_body_preview("x".repeat(1_000));
		let preview = ctx.body_preview.expect("Preview should be populated.");

		assert_eq!(preview.chars().count(), ProviderErrorContext::BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}

	#[test]
	fn custom_strategy_can_augment_token_requests() {
		struct AudienceStrategy;
		impl ProviderStrategy for AudienceStrategy {
			fn classify_token_error(&self, _ctx: &ProviderErrorContext) -> ExchangeFailure {
				ExchangeFailure::Upstream
			}

			fn augment_token_request(&self, form: &mut BTreeMap<String, String>) {
				form.insert("audience".into(), "account".into());
			}
		}

		let mut form = BTreeMap::new();

		AudienceStrategy.augment_token_request(&mut form);

		assert_eq!(form.get("audience").map(String::as_str), Some("account"));
	}
}
