mod auth;

pub use auth::{ActingUser, FixedIdentity, IdentityResolver};
