//! Per-cycle hot data handed from dispose callbacks to accept callbacks

use crate::error::{HmrError, Result};
use rustc_hash::FxHashMap as HashMap;

/// State a module hands forward across its own replacement
///
/// A fresh `HotData` is created for every update cycle. Dispose callbacks of
/// the outgoing module write into it, accept callbacks of the same cycle read
/// from it. Nothing survives past the cycle.
#[derive(Debug, Clone, Default)]
pub struct HotData {
    data: HashMap<String, Vec<u8>>,
}

impl HotData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `key`, replacing any previous value
    pub fn set<T: serde::Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let bytes = bincode::serialize(value)
            .map_err(|e| HmrError::Serialization(e.to_string()))?;
        self.data.insert(key.to_string(), bytes);
        Ok(())
    }

    /// Read back a value stored with [`set`](Self::set)
    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.data.get(key) {
            Some(bytes) => bincode::deserialize(bytes)
                .map(Some)
                .map_err(|e| HmrError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    pub fn set_raw(&mut self, key: &str, data: Vec<u8>) {
        self.data.insert(key.to_string(), data);
    }

    pub fn get_raw(&self, key: &str) -> Option<&[u8]> {
        self.data.get(key).map(Vec::as_slice)
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<u8>> {
        self.data.remove(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
