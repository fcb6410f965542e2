//! Authentication primitives.
//!
//! - [`password`] -- peppered bcrypt hashing and verification.
//! - [`jwt`] -- signed access and refresh token issuance and decoding.

pub mod jwt;
pub mod password;
