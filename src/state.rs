//! Shared context handed to the router.
//!
//! Both services are cheap to clone (a `PathBuf` plus key material), so the
//! state is cloned per request rather than wrapped in an `Arc`.

use crate::services::{storage_service::StorageService, token_service::TokenService};

#[derive(Clone)]
pub struct AppState {
    /// Validates and persists uploaded files.
    pub storage: StorageService,

    /// Verifies (and, in CLI mode, signs) bearer tokens.
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(storage: StorageService, tokens: TokenService) -> Self {
        Self { storage, tokens }
    }
}
