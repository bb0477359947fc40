//! Ledger record codec.
//!
//! Batches and flags are stored as JSON under a shared key space. Flag
//! records live under [`FLAG_KEY_PREFIX`] and are skipped wherever batches
//! are listed.

use rxl_core::FLAG_KEY_PREFIX;
use rxl_state::Batch;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ContractError;

/// Whether `key` holds a flag record.
pub fn is_flag_key(key: &str) -> bool {
    key.starts_with(FLAG_KEY_PREFIX)
}

/// Serialize a record for storage under `key`.
pub fn encode<T: Serialize>(key: &str, value: &T) -> Result<Vec<u8>, ContractError> {
    serde_json::to_vec(value).map_err(|e| ContractError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Deserialize the record stored under `key`.
pub fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, ContractError> {
    serde_json::from_slice(bytes).map_err(|e| ContractError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Decode the batch records of a scan or query result, skipping flags.
pub fn decode_batches(pairs: Vec<(String, Vec<u8>)>) -> Result<Vec<Batch>, ContractError> {
    pairs
        .into_iter()
        .filter(|(key, _)| !is_flag_key(key))
        .map(|(key, bytes)| decode(&key, &bytes))
        .collect()
}
