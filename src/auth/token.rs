//! Token exchange results returned by the password grant.

// self
use crate::{_prelude::*, auth::Secret};

/// Successful token endpoint response.
///
/// Results are handed to the caller as-is; the gateway never caches them.
#[derive(Clone)]
pub struct TokenResult {
	/// Access token secret; callers must avoid logging it.
	pub access_token: Secret,
	/// Token type reported by the provider (typically `Bearer`).
	pub token_type: String,
	/// Lifetime of the access token in seconds, `0` when the provider omitted it.
	pub expires_in: u64,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<Secret>,
	/// Space-delimited scopes granted, if the provider reported them.
	pub scope: Option<String>,
	/// Local instant at which the response was received.
	pub issued_at: OffsetDateTime,
}
impl TokenResult {
	/// Returns the absolute expiry instant derived from `issued_at + expires_in`.
	pub fn expires_at(&self) -> OffsetDateTime {
		let secs = i64::try_from(self.expires_in).unwrap_or(i64::MAX);

		self.issued_at.saturating_add(Duration::seconds(secs))
	}
}
impl Debug for TokenResult {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResult")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.finish()
	}
}
