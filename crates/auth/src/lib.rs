//! `foodgram-auth`: authentication boundary.
//!
//! Resolves a bearer token into the acting `UserId`. Decoupled from HTTP and
//! storage; the API crate wires it into middleware.

pub mod claims;
pub mod jwt;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
