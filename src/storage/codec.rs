//! JSON codec for the `resources.content` column.

use crate::models::resource::ContentMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode content map: {0}")]
    Encoding(#[source] serde_json::Error),
    #[error("failed to decode content map: {0}")]
    Decoding(#[source] serde_json::Error),
}

/// Serialize a content map into the bytes stored per resource row.
pub fn encode(content: &ContentMap) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(content).map_err(CodecError::Encoding)
}

/// Deserialize a stored column value. A NULL column decodes to an empty map.
pub fn decode(raw: Option<&[u8]>) -> Result<ContentMap, CodecError> {
    match raw {
        None => Ok(ContentMap::default()),
        Some(bytes) => serde_json::from_slice(bytes).map_err(CodecError::Decoding),
    }
}
