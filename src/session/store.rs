//! Session store: the contract the HTTP layer calls per request.

use tracing::{debug, warn};

use super::codec::{self, Payload};
use super::context::{DestroyOptions, RequestContext};
use super::resolver;
use super::SessionId;
use crate::repository::Repository;
use crate::Result;

/// Session persistence on top of a document [`Repository`].
///
/// All methods take the [`RequestContext`] of the request being handled;
/// the record resolved for that request is cached there and reused by
/// later calls in the same cycle.
#[derive(Debug)]
pub struct SessionStore<R> {
    repo: R,
}

impl<R: Repository> SessionStore<R> {
    /// Create a store over the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Get the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Generate a new session id.
    pub fn generate_id(&self) -> Result<SessionId> {
        SessionId::generate()
    }

    /// Load the session for `id`, starting a new one if it does not exist.
    ///
    /// The resolved id becomes the context's current session id and the
    /// record is cached in the context. Returns the resolved id with the
    /// decoded payload, which is empty for a new session.
    pub async fn get_session(
        &self,
        ctx: &mut RequestContext,
        id: Option<&str>,
    ) -> Result<(SessionId, Payload)> {
        let (sid, record) = resolver::resolve_or_create(&self.repo, id).await?;
        let data = record.data.clone();

        ctx.set_current_session_id(sid.clone());
        ctx.cache_record(record);

        let payload = codec::decode(data.as_deref())?;
        Ok((sid, payload))
    }

    /// Write `payload` into the request's session record and persist it.
    ///
    /// Returns `Ok(Some(id))` once saved and `Ok(None)` if the repository
    /// refused the write; the caller decides whether that is fatal.
    /// Encoding and id generation failures are returned as errors.
    pub async fn set_session(
        &self,
        ctx: &mut RequestContext,
        id: Option<&str>,
        payload: &Payload,
    ) -> Result<Option<SessionId>> {
        let (sid, record) = resolver::resolve_cached(&self.repo, ctx, id).await?;

        record.apply_denormalized(payload);
        record.data = Some(codec::encode(payload)?);

        match self.repo.save(record).await {
            Ok(()) => {
                debug!(session_id = %sid, "session saved");
                Ok(Some(sid))
            }
            Err(e) => {
                warn!(session_id = %sid, error = %e, "failed to save session");
                Ok(None)
            }
        }
    }

    /// Destroy the request's current session.
    ///
    /// Returns a fresh id to hand to the client, or `None` when
    /// `options.drop` is set.
    pub async fn destroy_session(
        &self,
        ctx: &mut RequestContext,
        id: Option<&str>,
        options: DestroyOptions,
    ) -> Result<Option<SessionId>> {
        debug!(requested = id.unwrap_or("-"), drop = options.drop, "destroying session");
        resolver::destroy(&self.repo, ctx).await?;

        if options.drop {
            Ok(None)
        } else {
            self.generate_id().map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use crate::SessionStoreError;
    use serde_json::{json, Value};

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    fn store() -> SessionStore<MemoryRepository> {
        SessionStore::new(MemoryRepository::new())
    }

    #[tokio::test]
    async fn test_get_new_session() {
        let store = store();
        let mut ctx = RequestContext::new();

        let (sid, data) = store.get_session(&mut ctx, None).await.unwrap();
        assert!(data.is_empty());
        assert_eq!(ctx.current_session_id(), Some(&sid));
        assert_eq!(ctx.cached_record().map(|r| &r.id), Some(&sid));
        assert_eq!(store.repository().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = store();
        let mut ctx = RequestContext::new();
        let (sid, _) = store.get_session(&mut ctx, None).await.unwrap();

        let saved = store
            .set_session(&mut ctx, Some(sid.as_str()), &payload(json!({"foo": "bar"})))
            .await
            .unwrap();
        assert_eq!(saved, Some(sid.clone()));

        let mut ctx2 = RequestContext::new();
        let (sid2, data) = store.get_session(&mut ctx2, Some(sid.as_str())).await.unwrap();
        assert_eq!(sid2, sid);
        assert_eq!(data, payload(json!({"foo": "bar"})));
    }

    #[tokio::test]
    async fn test_set_without_prior_get_creates_session() {
        let store = store();
        let mut ctx = RequestContext::new();

        let sid = store
            .set_session(&mut ctx, None, &payload(json!({"n": 1})))
            .await
            .unwrap()
            .unwrap();
        assert!(store.repository().contains(&sid).unwrap());
    }

    #[tokio::test]
    async fn test_set_reports_unsaved() {
        let store = store();
        store.repository().set_read_only(true);

        let mut ctx = RequestContext::new();
        let (sid, _) = store.get_session(&mut ctx, None).await.unwrap();
        let result = store
            .set_session(&mut ctx, Some(sid.as_str()), &payload(json!({"foo": "bar"})))
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(store.repository().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_denormalized_user_id_is_kept() {
        let store = store();
        let mut ctx = RequestContext::new();
        let (sid, _) = store.get_session(&mut ctx, None).await.unwrap();

        store
            .set_session(&mut ctx, Some(sid.as_str()), &payload(json!({"user_id": "u1"})))
            .await
            .unwrap();
        store
            .set_session(&mut ctx, Some(sid.as_str()), &Payload::new())
            .await
            .unwrap();

        let record = store.repository().find_by_id(&sid).await.unwrap().unwrap();
        assert_eq!(record.user_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_an_error() {
        let store = store();
        let mut record = crate::SessionRecord::new(SessionId::parse("corrupt").unwrap());
        record.data = Some(vec![0x09, 0x00]);
        store.repository().save(&record).await.unwrap();

        let mut ctx = RequestContext::new();
        let result = store.get_session(&mut ctx, Some("corrupt")).await;
        assert!(matches!(result, Err(SessionStoreError::Deserialization(_))));
    }

    #[tokio::test]
    async fn test_destroy_renew() {
        let store = store();
        let mut ctx = RequestContext::new();
        let (sid, _) = store.get_session(&mut ctx, None).await.unwrap();
        store
            .set_session(&mut ctx, Some(sid.as_str()), &payload(json!({"a": 1})))
            .await
            .unwrap();

        let new_id = store
            .destroy_session(&mut ctx, Some(sid.as_str()), DestroyOptions::renew())
            .await
            .unwrap()
            .unwrap();

        assert_ne!(new_id, sid);
        assert!(!store.repository().contains(&sid).unwrap());
        assert!(ctx.cached_record().is_none());
    }

    #[tokio::test]
    async fn test_destroy_drop() {
        let store = store();
        let mut ctx = RequestContext::new();
        let (sid, _) = store.get_session(&mut ctx, None).await.unwrap();

        let result = store
            .destroy_session(&mut ctx, Some(sid.as_str()), DestroyOptions::dropped())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_destroy_without_session() {
        let store = store();
        let mut ctx = RequestContext::new();

        let result = store
            .destroy_session(&mut ctx, None, DestroyOptions::renew())
            .await
            .unwrap();
        assert!(result.is_some());
    }
}
