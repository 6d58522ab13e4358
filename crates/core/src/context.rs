//! Per-request context handed to the session and the agent loop.

use tracing::Span;
use uuid::Uuid;

/// Identity and tracing span of one chat request.
///
/// Everything the session logs is recorded inside `span`, so the request id
/// and project id show up on every line without global state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub project_id: Option<String>,
    pub span: Span,
}

impl RequestContext {
    pub fn new(project_id: Option<String>) -> Self {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "chat",
            %request_id,
            project_id = project_id.as_deref().unwrap_or("-"),
        );
        Self {
            request_id,
            project_id,
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contexts_get_distinct_ids() {
        let a = RequestContext::new(None);
        let b = RequestContext::new(Some("p1".into()));
        assert_ne!(a.request_id, b.request_id);
        assert_eq!(b.project_id.as_deref(), Some("p1"));
    }
}
