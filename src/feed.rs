//! Feed document decoding.
//!
//! The feed looks like `{ "data": { "<id>": { "dhd": "<url>", ... }, ... } }`.
//! Only the object under the data key is handed to the pipeline.

use crate::error::FetchError;
use serde_json::{Map, Value};

/// Decode a feed body and return the record map stored under `data_key`
pub fn parse_document(body: &[u8], data_key: &str) -> Result<Map<String, Value>, FetchError> {
    let document: Value =
        serde_json::from_slice(body).map_err(|e| FetchError::InvalidJson(e.to_string()))?;

    extract_records(document, data_key)
}

/// Take the record map out of an already decoded document
pub fn extract_records(document: Value, data_key: &str) -> Result<Map<String, Value>, FetchError> {
    let Value::Object(mut root) = document else {
        return Err(FetchError::MissingKey(data_key.to_string()));
    };

    match root.remove(data_key) {
        Some(Value::Object(records)) => Ok(records),
        Some(_) => Err(FetchError::NotAnObject(data_key.to_string())),
        None => Err(FetchError::MissingKey(data_key.to_string())),
    }
}
