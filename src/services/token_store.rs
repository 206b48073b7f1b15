// TokenStore Service
// Holds the console session token issued by the blog API

use std::sync::Arc;

use crate::services::storage::{KeyValueStorage, StorageError};

pub const TOKEN_STORAGE_KEY: &str = "token";

#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Current bearer token, if any. An empty stored value counts as logged out.
    pub fn get_token(&self) -> Option<String> {
        match self.storage.get_item(TOKEN_STORAGE_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                log::warn!("Failed to read session token: {}", e);
                None
            }
        }
    }

    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set_item(TOKEN_STORAGE_KEY, token)
    }

    pub fn clear_token(&self) -> Result<(), StorageError> {
        self.storage.remove_item(TOKEN_STORAGE_KEY)
    }

    pub fn is_logged_in(&self) -> bool {
        self.get_token().is_some()
    }
}
