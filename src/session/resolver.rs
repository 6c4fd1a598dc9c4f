//! Record resolution.
//!
//! Maps an optional client-supplied id to a session record, creating a new
//! unsaved record whenever the id is absent, malformed or unknown. A stale
//! or forged id therefore degrades to a fresh anonymous session instead of
//! failing the request.

use tracing::{debug, info};

use super::{RequestContext, SessionId, SessionRecord};
use crate::error::Result;
use crate::repository::Repository;

/// Find the record stored under `id`, or start a new one.
///
/// New records get a freshly generated id and are not persisted. The id
/// that was asked for is discarded when nothing matches it.
pub async fn resolve_or_create<R>(
    repo: &R,
    id: Option<&str>,
) -> Result<(SessionId, SessionRecord)>
where
    R: Repository + ?Sized,
{
    if let Some(raw) = id {
        match SessionId::parse(raw) {
            Ok(sid) => {
                if let Some(record) = repo.find_by_id(&sid).await? {
                    debug!(session_id = %sid, "resolved stored session");
                    return Ok((sid, record));
                }
                debug!(session_id = %sid, "unknown session id, starting a new session");
            }
            Err(_) => debug!("malformed session id, starting a new session"),
        }
    }

    let sid = SessionId::generate()?;
    debug!(session_id = %sid, "created session record");
    Ok((sid.clone(), SessionRecord::new(sid)))
}

/// Resolve through the request's cache.
///
/// The cached record is reused when the context already has both a current
/// session id and a record; otherwise the record is resolved with
/// [`resolve_or_create`] and cached.
pub async fn resolve_cached<'c, R>(
    repo: &R,
    ctx: &'c mut RequestContext,
    id: Option<&str>,
) -> Result<(SessionId, &'c mut SessionRecord)>
where
    R: Repository + ?Sized,
{
    let has_id = ctx.current_session_id().is_some();
    let slot = ctx.record_slot();

    let record = match slot.take() {
        Some(record) if has_id => {
            debug!(session_id = %record.id, "using cached session record");
            record
        }
        _ => resolve_or_create(repo, id).await?.1,
    };

    let record = slot.insert(record);
    Ok((record.id.clone(), record))
}

/// Delete the current session's record and drop it from the cache.
///
/// Does nothing when the request has no current session id.
pub async fn destroy<R>(repo: &R, ctx: &mut RequestContext) -> Result<()>
where
    R: Repository + ?Sized,
{
    let Some(sid) = ctx.current_session_id().cloned() else {
        debug!("no current session to destroy");
        return Ok(());
    };

    let (_, record) = resolve_cached(repo, ctx, Some(sid.as_str())).await?;
    repo.delete(record).await?;
    info!(session_id = %record.id, "session destroyed");

    ctx.clear_record();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;

    async fn stored(repo: &MemoryRepository, id: &str) -> SessionRecord {
        let mut record = SessionRecord::new(SessionId::parse(id).unwrap());
        record.user_id = Some("u1".into());
        repo.save(&record).await.unwrap();
        record
    }

    #[tokio::test]
    async fn test_none_creates_new() {
        let repo = MemoryRepository::new();
        let (sid, record) = resolve_or_create(&repo, None).await.unwrap();
        assert_eq!(record.id, sid);
        assert!(record.data.is_none());
        // Not persisted until saved
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_none_never_reuses_existing() {
        let repo = MemoryRepository::new();
        let existing = stored(&repo, "existing").await;
        for _ in 0..100 {
            let (sid, _) = resolve_or_create(&repo, None).await.unwrap();
            assert_ne!(sid, existing.id);
        }
    }

    #[tokio::test]
    async fn test_existing_id_returns_stored_record() {
        let repo = MemoryRepository::new();
        let existing = stored(&repo, "existing").await;

        let (sid, record) = resolve_or_create(&repo, Some("existing")).await.unwrap();
        assert_eq!(sid, existing.id);
        assert_eq!(record, existing);
    }

    #[tokio::test]
    async fn test_unknown_id_falls_back_to_new() {
        let repo = MemoryRepository::new();
        let (sid, record) = resolve_or_create(&repo, Some("unknown")).await.unwrap();
        assert_ne!(sid.as_str(), "unknown");
        assert_eq!(record.id, sid);
    }

    #[tokio::test]
    async fn test_malformed_id_falls_back_to_new() {
        let repo = MemoryRepository::new();
        let (sid, _) = resolve_or_create(&repo, Some("../../etc/passwd")).await.unwrap();
        assert_ne!(sid.as_str(), "../../etc/passwd");
        assert!(crate::session::is_url_safe(sid.as_str()));
    }

    #[tokio::test]
    async fn test_cached_without_current_id_resolves() {
        let repo = MemoryRepository::new();
        stored(&repo, "existing").await;

        let mut ctx = RequestContext::new();
        ctx.cache_record(SessionRecord::new(SessionId::parse("stale").unwrap()));

        let (sid, record) = resolve_cached(&repo, &mut ctx, Some("existing")).await.unwrap();
        assert_eq!(sid.as_str(), "existing");
        assert_eq!(record.user_id.as_deref(), Some("u1"));
        assert_eq!(ctx.cached_record().map(|r| r.id.as_str()), Some("existing"));
    }

    #[tokio::test]
    async fn test_cached_record_is_reused() {
        let repo = MemoryRepository::new();
        let existing = stored(&repo, "existing").await;
        let mut ctx = RequestContext::with_session_id(existing.id.clone());

        let (first, record) = resolve_cached(&repo, &mut ctx, Some("existing")).await.unwrap();
        assert_eq!(record.user_id.as_deref(), Some("u1"));
        record.device_id = Some("d1".into());

        // A second lookup would miss now
        repo.delete(&existing).await.unwrap();

        let (second, record) = resolve_cached(&repo, &mut ctx, Some("existing")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(second, existing.id);
        assert_eq!(record.device_id.as_deref(), Some("d1"));
    }

    #[tokio::test]
    async fn test_destroy_deletes_and_clears() {
        let repo = MemoryRepository::new();
        let existing = stored(&repo, "existing").await;

        let mut ctx = RequestContext::with_session_id(existing.id.clone());
        destroy(&repo, &mut ctx).await.unwrap();

        assert!(!repo.contains(&existing.id).unwrap());
        assert!(ctx.cached_record().is_none());
    }

    #[tokio::test]
    async fn test_destroy_without_session_is_noop() {
        let repo = MemoryRepository::new();
        stored(&repo, "existing").await;

        let mut ctx = RequestContext::new();
        destroy(&repo, &mut ctx).await.unwrap();
        assert_eq!(repo.count().unwrap(), 1);
    }
}
