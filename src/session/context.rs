//! Request-scoped session context.

use super::{SessionId, SessionRecord};

/// Session options the calling middleware tracks for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Session id already established for this request, if any.
    pub id: Option<SessionId>,
    /// Whether the session should be dropped without a replacement.
    pub drop: bool,
}

/// Options for [`SessionStore::destroy_session`](super::SessionStore::destroy_session).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DestroyOptions {
    /// Terminate the session without issuing a replacement id.
    pub drop: bool,
}

impl DestroyOptions {
    /// Destroy and hand out a fresh id.
    pub fn renew() -> Self {
        Self { drop: false }
    }

    /// Destroy without a replacement.
    pub fn dropped() -> Self {
        Self { drop: true }
    }
}

impl From<&SessionOptions> for DestroyOptions {
    fn from(options: &SessionOptions) -> Self {
        Self { drop: options.drop }
    }
}

/// State carried through a single request/response cycle.
///
/// Holds the session options and the record resolved during this request,
/// so the repository is consulted at most once per cycle. A context must
/// not outlive or be shared between requests.
#[derive(Debug, Default)]
pub struct RequestContext {
    options: SessionOptions,
    record: Option<SessionRecord>,
}

impl RequestContext {
    /// Create a context for a request with no known session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for a request that presented a session id.
    pub fn with_session_id(id: SessionId) -> Self {
        Self {
            options: SessionOptions {
                id: Some(id),
                drop: false,
            },
            record: None,
        }
    }

    /// Get the session options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Get mutable session options.
    pub fn options_mut(&mut self) -> &mut SessionOptions {
        &mut self.options
    }

    /// Session id established for this request.
    pub fn current_session_id(&self) -> Option<&SessionId> {
        self.options.id.as_ref()
    }

    /// Mark `id` as the session of this request.
    pub fn set_current_session_id(&mut self, id: SessionId) {
        self.options.id = Some(id);
    }

    /// Record resolved earlier in this request.
    pub fn cached_record(&self) -> Option<&SessionRecord> {
        self.record.as_ref()
    }

    pub(crate) fn record_slot(&mut self) -> &mut Option<SessionRecord> {
        &mut self.record
    }

    /// Cache a resolved record for the rest of this request.
    pub fn cache_record(&mut self, record: SessionRecord) {
        self.record = Some(record);
    }

    /// Forget the cached record.
    pub fn clear_record(&mut self) -> Option<SessionRecord> {
        self.record.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> SessionId {
        SessionId::parse(s).unwrap()
    }

    #[test]
    fn test_new_context() {
        let ctx = RequestContext::new();
        assert!(ctx.current_session_id().is_none());
        assert!(ctx.cached_record().is_none());
        assert!(!ctx.options().drop);
    }

    #[test]
    fn test_with_session_id() {
        let ctx = RequestContext::with_session_id(sid("abc"));
        assert_eq!(ctx.current_session_id(), Some(&sid("abc")));
    }

    #[test]
    fn test_cache_and_clear() {
        let mut ctx = RequestContext::new();
        ctx.cache_record(SessionRecord::new(sid("abc")));
        assert_eq!(ctx.cached_record().map(|r| r.id.as_str()), Some("abc"));

        let cleared = ctx.clear_record();
        assert!(cleared.is_some());
        assert!(ctx.cached_record().is_none());
    }

    #[test]
    fn test_options_mut() {
        let mut ctx = RequestContext::new();
        ctx.options_mut().drop = true;
        ctx.set_current_session_id(sid("xyz"));
        assert!(ctx.options().drop);
        assert_eq!(ctx.current_session_id().map(SessionId::as_str), Some("xyz"));
    }

    #[test]
    fn test_destroy_options() {
        assert!(!DestroyOptions::renew().drop);
        assert!(DestroyOptions::dropped().drop);
        assert_eq!(DestroyOptions::default(), DestroyOptions::renew());

        let options = SessionOptions {
            id: None,
            drop: true,
        };
        assert!(DestroyOptions::from(&options).drop);
    }
}
