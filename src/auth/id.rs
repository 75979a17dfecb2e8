//! Strongly typed identifiers passed to the identity provider.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (user, realm).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (user, realm).
		kind: &'static str,
	},
	/// The identifier contains a path separator.
	#[error("{kind} identifier contains a path separator.")]
	ContainsSeparator {
		/// Kind of identifier (user, realm).
		kind: &'static str,
	},
	/// The identifier is a relative path segment (`.` or `..`, possibly percent-encoded).
	#[error("{kind} identifier cannot be a dot segment.")]
	DotSegment {
		/// Kind of identifier (user, realm).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (user, realm).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { UserId, "Identifier of a user record held by the identity provider.", "User" }
def_id! { RealmName, "Name of an identity provider realm.", "Realm" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.contains(['/', '\\']) {
		return Err(IdentifierError::ContainsSeparator { kind });
	}
	if is_dot_segment(view) {
		return Err(IdentifierError::DotSegment { kind });
	}
	if view.chars().count() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

fn is_dot_segment(view: &str) -> bool {
	let decoded = view.to_ascii_lowercase().replace("%2e", ".");

	matches!(decoded.as_str(), "." | "..")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_whitespace_and_separators() {
		assert!(UserId::new(" c9dd46b9").is_err(), "Leading whitespace must be rejected.");
		assert!(UserId::new("c9dd46b9 ").is_err(), "Trailing whitespace must be rejected.");
		assert!(UserId::new("").is_err());
		assert!(RealmName::new("demo/realm").is_err());

		let user = UserId::new("c9dd46b9-8eb2-4f1e-b51b-a35d6a0c1496")
			.expect("User fixture should be considered valid.");

		assert_eq!(user.as_ref(), "c9dd46b9-8eb2-4f1e-b51b-a35d6a0c1496");
		assert_eq!(format!("{user:?}"), "User(c9dd46b9-8eb2-4f1e-b51b-a35d6a0c1496)");
	}

	#[test]
	fn dot_segments_are_rejected() {
		for value in [".", "..", "%2e", "%2E%2e", ".%2e", "a\\b"] {
			assert!(UserId::new(value).is_err(), "`{value}` must be rejected.");
		}

		assert_eq!(UserId::new(".."), Err(IdentifierError::DotSegment { kind: "User" }));
		UserId::new("...").expect("Three dots are an ordinary segment.");
		UserId::new("a.b").expect("Dots inside an identifier are allowed.");
	}

	#[test]
	fn serde_enforces_validation() {
		let realm: RealmName =
			serde_json::from_str("\"Demo-Realm\"").expect("Realm should deserialize successfully.");

		assert_eq!(realm.as_ref(), "Demo-Realm");
		assert!(serde_json::from_str::<RealmName>("\"with space\"").is_err());
	}

	#[test]
	fn length_limits_apply() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		UserId::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert_eq!(
			UserId::new(&too_long),
			Err(IdentifierError::TooLong { kind: "User", max: IDENTIFIER_MAX_LEN })
		);

		let multibyte = "é".repeat(IDENTIFIER_MAX_LEN);

		UserId::new(&multibyte).expect("Length is counted in characters.");
	}
}
