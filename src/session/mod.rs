//! Session management module.
//!
//! This module provides the session identifier, the stored record, the
//! payload codec and the request-scoped resolution logic tied together by
//! [`SessionStore`].

pub mod codec;
mod context;
mod id;
mod record;
pub mod resolver;
mod store;

pub use codec::Payload;
pub use context::{DestroyOptions, RequestContext, SessionOptions};
pub use id::{is_url_safe, SessionId, ID_BYTES, ID_LEN};
pub use record::{SessionRecord, DEVICE_ID_KEY, USER_ID_KEY};
pub use store::SessionStore;
