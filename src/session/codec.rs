//! Payload codec.
//!
//! Encoded blobs are one version byte followed by the payload as a
//! MessagePack map. An absent or empty blob means no payload has been
//! stored yet and decodes to an empty map.

use std::io::Cursor;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Result, SessionStoreError};

/// Key-value data an application keeps in a session.
pub type Payload = Map<String, Value>;

/// Version tag written in front of every blob.
pub const FORMAT_VERSION: u8 = 1;

/// Encode a payload for storage.
pub fn encode(payload: &Payload) -> Result<Vec<u8>> {
    let body = rmp_serde::to_vec_named(payload)
        .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;

    let mut blob = Vec::with_capacity(body.len() + 1);
    blob.push(FORMAT_VERSION);
    blob.extend_from_slice(&body);
    Ok(blob)
}

/// Decode a stored blob.
///
/// Blobs with an unknown version tag or a malformed body are rejected
/// outright; nothing is partially decoded.
pub fn decode(blob: Option<&[u8]>) -> Result<Payload> {
    let Some((&version, body)) = blob.and_then(|b| b.split_first()) else {
        return Ok(Payload::new());
    };

    if version != FORMAT_VERSION {
        return Err(SessionStoreError::Deserialization(format!(
            "unknown format version 0x{version:02x}"
        )));
    }

    let mut cursor = Cursor::new(body);
    let payload = Payload::deserialize(&mut rmp_serde::Deserializer::new(&mut cursor))
        .map_err(|e| SessionStoreError::Deserialization(e.to_string()))?;

    let consumed = cursor.position() as usize;
    if consumed != body.len() {
        return Err(SessionStoreError::Deserialization(format!(
            "{} trailing bytes after payload",
            body.len() - consumed
        )));
    }

    Ok(payload)
}
