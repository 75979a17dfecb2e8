//! Provider-facing registration (data) and strategies (behavior).
//!
//! `registration` exposes the validated [`ClientRegistration`] covering the provider base
//! URL, realm, client credentials, and the endpoints derived from them. `strategy` defines
//! [`ProviderStrategy`], an HTTP-client-agnostic hook used by flows to augment outgoing
//! token requests and classify failed exchanges.

pub mod registration;
pub mod strategy;

pub use registration::*;
pub use strategy::*;
