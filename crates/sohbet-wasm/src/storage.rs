use sohbet_core::{ChatError, SessionStore};
use web_sys::Storage;

use crate::utils::js_error_text;

/// `window.localStorage` as a session store
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, ChatError> {
        let window = web_sys::window().ok_or_else(|| ChatError::Storage("No window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| ChatError::Storage(js_error_text(&e)))?
            .ok_or_else(|| ChatError::Storage("localStorage is unavailable".to_string()))?;
        Ok(Self { storage })
    }
}

impl SessionStore for LocalStorage {
    fn load(&self, key: &str) -> Result<Option<String>, ChatError> {
        self.storage
            .get_item(key)
            .map_err(|e| ChatError::Storage(js_error_text(&e)))
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), ChatError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| ChatError::Storage(js_error_text(&e)))
    }
}
