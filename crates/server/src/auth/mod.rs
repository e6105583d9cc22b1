//! Session auth primitives: Argon2id password hashing and HS256 session
//! tokens. The HTTP-facing extractor lives in `api::auth`.

pub mod password;
pub mod token;

pub use token::{AuthConfig, SessionClaims};
