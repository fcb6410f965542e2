//! Domain types shared by the user store and the HTTP layer.

pub mod error;
pub mod roles;
pub mod types;
pub mod validation;
