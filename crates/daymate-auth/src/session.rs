//! Bearer token lifecycle.
//!
//! A token present at startup is trusted as-is until a request made with it
//! fails; there is no refresh or expiry handling.

use daymate_core::StorageError;

use crate::storage::{LocalStore, TOKEN_KEY};

#[derive(Debug, Clone)]
pub struct AuthSession {
    store: LocalStore,
    token: Option<String>,
}

impl AuthSession {
    /// Seed the session from persisted state. The token is stored as a raw
    /// string; an unreadable or blank one is logged and treated as signed out.
    pub fn restore(store: LocalStore) -> Self {
        let token = match store.get(TOKEN_KEY) {
            Ok(token) => token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("Ignoring persisted token: {}", e);
                None
            }
        };

        if token.is_some() {
            tracing::info!("Restored persisted session");
        }

        Self { store, token }
    }

    /// A signed-out session that leaves any persisted token untouched.
    pub fn guest(store: LocalStore) -> Self {
        Self { store, token: None }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Adopt a freshly issued token and persist it.
    ///
    /// The token is active in memory even if persisting fails; the error is
    /// returned so the caller can report that the session won't survive a
    /// restart.
    pub fn adopt(&mut self, token: String) -> Result<(), StorageError> {
        let persisted = self.store.set(TOKEN_KEY, &token);
        self.token = Some(token);
        persisted
    }

    /// Drop the token from memory and persistence.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.token = None;
        self.store.remove(TOKEN_KEY)
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }
}
