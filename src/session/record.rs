//! Durable session record.

use serde_json::Value;

use super::codec::Payload;
use super::SessionId;

/// Payload key mirrored into [`SessionRecord::device_id`].
pub const DEVICE_ID_KEY: &str = "device_id";

/// Payload key mirrored into [`SessionRecord::user_id`].
pub const USER_ID_KEY: &str = "user_id";

/// A session as stored in the repository.
///
/// `data` holds the encoded payload and stays `None` until the record is
/// first written. The `device_id` and `user_id` columns are copies of the
/// payload keys of the same name, kept for indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Primary key.
    pub id: SessionId,
    /// Encoded payload.
    pub data: Option<Vec<u8>>,
    /// Denormalized `device_id` payload value.
    pub device_id: Option<String>,
    /// Denormalized `user_id` payload value.
    pub user_id: Option<String>,
}

impl SessionRecord {
    /// Create an empty, unsaved record.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            data: None,
            device_id: None,
            user_id: None,
        }
    }

    /// Copy `device_id` / `user_id` out of the payload.
    ///
    /// Only keys holding a present value overwrite the column; a missing or
    /// blank key leaves the previous value alone.
    pub fn apply_denormalized(&mut self, payload: &Payload) {
        if let Some(device_id) = payload.get(DEVICE_ID_KEY).and_then(present_text) {
            self.device_id = Some(device_id);
        }
        if let Some(user_id) = payload.get(USER_ID_KEY).and_then(present_text) {
            self.user_id = Some(user_id);
        }
    }
}

/// Column text for a payload value, or `None` when the value counts as absent.
fn present_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}
