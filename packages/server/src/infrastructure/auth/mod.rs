//! Credential verification for the Connection Gate and the HTTP API.

pub mod resolver;
pub mod token;

pub use resolver::TokenIdentityResolver;
pub use token::{HmacTokenCodec, InvalidTokenSecret, TokenClaims};
