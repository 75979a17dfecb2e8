//! Read-only projection of provider user records.

// self
use crate::{_prelude::*, auth::UserId};

/// User representation as returned by the admin users endpoint.
///
/// Only the fields the gateway projects are declared; everything else is ignored.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUser {
	/// Provider-assigned identifier.
	pub id: String,
	/// Login name.
	pub username: String,
	/// Email address.
	#[serde(default)]
	pub email: Option<String>,
	/// Given name.
	#[serde(default)]
	pub first_name: Option<String>,
	/// Family name.
	#[serde(default)]
	pub last_name: Option<String>,
	/// Whether the account is enabled.
	#[serde(default)]
	pub enabled: Option<bool>,
	/// Multi-valued custom attributes.
	#[serde(default)]
	pub attributes: BTreeMap<String, Vec<String>>,
}

/// Read-only user record returned by the gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserRecord {
	/// Provider-assigned identifier.
	pub id: UserId,
	/// Login name.
	pub username: String,
	/// Custom attributes reduced to their first value.
	pub attributes: BTreeMap<String, String>,
	/// Email address.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Given name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// Family name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	/// Whether the account is enabled.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub enabled: Option<bool>,
}
impl UserRecord {
	/// Projects a provider representation, requiring its id to match `requested`.
	pub fn project(requested: &UserId, user: ProviderUser) -> Result<Self> {
		if user.id != requested.as_ref() {
			return Err(AuthError::UnexpectedResponse {
				status: Some(200),
				reason: format!("user endpoint returned id `{}` for `{requested}`", user.id),
			});
		}

		let attributes = user
			.attributes
			.into_iter()
			.filter_map(|(key, values)| values.into_iter().next().map(|value| (key, value)))
			.collect();

		Ok(Self {
			id: requested.clone(),
			username: user.username,
			attributes,
			email: user.email,
			first_name: user.first_name,
			last_name: user.last_name,
			enabled: user.enabled,
		})
	}
}
