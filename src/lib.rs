//! # docstore-sessions
//!
//! HTTP session persistence backed by a document store.
//!
//! A session is an opaque identifier mapped to a key-value payload. This
//! crate resolves identifiers to stored records, creates new records when
//! an identifier is missing or unknown, encodes payloads for storage and
//! destroys sessions on request. Cookie transport and the middleware
//! pipeline stay with the caller, which hands in one [`RequestContext`]
//! per request.
//!
//! ## Features
//!
//! - **Secure identifiers**: 160 random bits from the OS, URL-safe base64
//! - **Lenient lookup**: stale or forged ids degrade to a new session
//! - **Per-request cache**: at most one repository lookup per request
//! - **Versioned payloads**: tagged MessagePack blobs, not language-specific dumps
//! - **Pluggable storage**: implement [`Repository`] for your document store
//!
//! ## Quick Start
//!
//! ```no_run
//! use docstore_sessions::{MemoryRepository, Payload, RequestContext, SessionStore};
//!
//! #[tokio::main]
//! async fn main() -> docstore_sessions::Result<()> {
//!     docstore_sessions::logging::try_init().ok();
//!
//!     let store = SessionStore::new(MemoryRepository::new());
//!
//!     // First request: no cookie yet
//!     let mut ctx = RequestContext::new();
//!     let (id, mut payload) = store.get_session(&mut ctx, None).await?;
//!     payload.insert("user_id".into(), "u1".into());
//!     store.set_session(&mut ctx, Some(id.as_str()), &payload).await?;
//!
//!     // Next request presents the id
//!     let mut ctx = RequestContext::new();
//!     let (_, payload) = store.get_session(&mut ctx, Some(id.as_str())).await?;
//!     assert_eq!(payload["user_id"], "u1");
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod repository;
pub mod session;

// Re-export commonly used types
pub use error::{Result, SessionStoreError};
pub use repository::{FileRepository, MemoryRepository, Repository};
pub use session::{
    DestroyOptions, Payload, RequestContext, SessionId, SessionOptions, SessionRecord,
    SessionStore,
};
