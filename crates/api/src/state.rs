use std::sync::Arc;

use userauth_db::UserStore;

use crate::auth::jwt::TokenService;
use crate::auth::password::CredentialHasher;
use crate::service::AccountService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// User store, shared with the guards.
    pub store: Arc<dyn UserStore>,
    /// Token issuance and validation.
    pub tokens: Arc<TokenService>,
    /// Account management operations.
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, hasher: CredentialHasher, tokens: TokenService) -> Self {
        let tokens = Arc::new(tokens);
        let accounts = AccountService::new(Arc::clone(&store), hasher, Arc::clone(&tokens));
        Self {
            store,
            tokens,
            accounts,
        }
    }
}
