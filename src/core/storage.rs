//! localStorage persistence for session and preferences.
//!
//! Outside the browser (native tests) storage is simply unavailable and
//! every read returns `None`.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::error::StorageError;
use crate::utils::dom;

/// Read a raw string value.
pub fn get(key: &str) -> Option<String> {
    let storage = dom::local_storage()?;
    storage.get_item(key).ok()?
}

/// Write a raw string value.
pub fn set(key: &str, value: &str) -> Result<(), StorageError> {
    let storage = dom::local_storage().ok_or(StorageError::Unavailable)?;
    storage
        .set_item(key, value)
        .map_err(|_| StorageError::WriteFailed)
}

/// Remove a value.
pub fn remove(key: &str) -> Result<(), StorageError> {
    let storage = dom::local_storage().ok_or(StorageError::Unavailable)?;
    storage
        .remove_item(key)
        .map_err(|_| StorageError::RemoveFailed)
}

/// Write `Some(value)` or remove the key for `None`.
pub fn set_or_remove(key: &str, value: Option<&str>) -> Result<(), StorageError> {
    match value {
        Some(value) => set(key, value),
        None => remove(key),
    }
}

/// Read and deserialize a JSON value. Corrupt entries read as `None`.
pub fn get_json<T: DeserializeOwned>(key: &str) -> Option<T> {
    let raw = get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "ignoring corrupt localStorage entry");
            None
        }
    }
}

/// Serialize and write a JSON value.
pub fn set_json<T: Serialize>(key: &str, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|_| StorageError::SerializationFailed)?;
    set(key, &raw)
}
