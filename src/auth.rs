//! Auth-domain identifiers, secrets, credentials, and provider projections.

pub mod credential;
pub mod id;
pub mod secret;
pub mod token;
pub mod user;

pub use credential::*;
pub use id::*;
pub use secret::*;
pub use token::*;
pub use user::*;
