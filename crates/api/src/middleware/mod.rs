//! Authentication and authorization guards.
//!
//! - [`auth::CurrentUser`] -- Resolves the user behind a JWT Bearer token.
//! - [`rbac::AdminUser`] -- Additionally requires the `admin` role.

pub mod auth;
pub mod rbac;
