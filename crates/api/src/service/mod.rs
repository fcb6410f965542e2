//! Account management operations composed from the store, hasher and token service.

pub mod account;

pub use account::AccountService;
