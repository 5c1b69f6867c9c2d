use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::KVError;

/// Key-value storage interface.
///
/// Keys are namespaced strings such as `academics:degree:{id}`; a prefix
/// scan over `academics:degree:` lists one record kind.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Write several pairs in one transaction: either all land or none.
    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError>;

    /// All (key, value) pairs whose key starts with `prefix`, sorted by key.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;
}

/// Read a JSON-encoded record.
pub fn get_json<T: DeserializeOwned>(kv: &dyn KVStore, key: &str) -> Result<Option<T>, KVError> {
    match kv.get(key)? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| KVError::Serialization(format!("{}: {}", key, e))),
        None => Ok(None),
    }
}

/// Encode a record as JSON, ready for `set` or `batch_set`.
pub fn encode_json<T: Serialize>(key: &str, value: &T) -> Result<Vec<u8>, KVError> {
    serde_json::to_vec(value).map_err(|e| KVError::Serialization(format!("{}: {}", key, e)))
}
