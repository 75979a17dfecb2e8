//! Per-request resource-owner credentials.

// self
use crate::{_prelude::*, auth::Secret};

/// Username and password supplied for a single password-grant exchange.
///
/// Credentials are never stored; the password stays wrapped in [`Secret`] so accidental
/// `Debug` output redacts it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
	/// Resource-owner username.
	#[serde(default)]
	pub username: String,
	/// Resource-owner password.
	#[serde(default = "empty_secret")]
	pub password: Secret,
}
impl Credential {
	/// Creates a new credential pair.
	pub fn new(username: impl Into<String>, password: impl Into<Secret>) -> Self {
		Self { username: username.into(), password: password.into() }
	}

	/// Rejects blank usernames or passwords.
	pub fn validate(&self) -> Result<()> {
		if self.username.trim().is_empty() {
			return Err(AuthError::invalid_input("username must not be empty"));
		}
		if self.password.is_empty() {
			return Err(AuthError::invalid_input("password must not be empty"));
		}

		Ok(())
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish()
	}
}

fn empty_secret() -> Secret {
	Secret::new(String::new())
}
