//! Response pipeline: the deferred half of a submission.
//!
//! submit → (pacing delay) → responder → settle into the session log.
//! Each run is scoped to the submission's cancellation token and bounded by a
//! timeout. Failures end here: they are logged and the session is made ready
//! again without appending anything.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::storyboard::responder::{Responder, ResponseRequest};
use crate::storyboard::session::{SessionStore, Submission};

/// Shown to the host when the responder fails. The detail stays in the log.
pub const FAILURE_NOTICE: &str = "Couldn't generate a response. Please try again.";

/// Timing knobs for the deferred response.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    /// Artificial latency before the responder runs.
    pub delay: Duration,
    /// Upper bound on the responder call itself.
    pub timeout: Duration,
}

/// Spawns the deferred response for an accepted submission.
pub fn spawn_response(
    store: SessionStore,
    session_id: Uuid,
    submission: Submission,
    responder: Arc<dyn Responder>,
    pacing: Pacing,
) -> JoinHandle<()> {
    tokio::spawn(run_response(store, session_id, submission, responder, pacing))
}

async fn run_response(
    store: SessionStore,
    session_id: Uuid,
    submission: Submission,
    responder: Arc<dyn Responder>,
    pacing: Pacing,
) {
    let request = ResponseRequest {
        query: submission.query.clone(),
        file_hint: submission.file_hint.clone(),
        role: submission.role,
    };

    let work = async {
        tokio::time::sleep(pacing.delay).await;
        tokio::time::timeout(pacing.timeout, responder.respond(&request)).await
    };

    let outcome = tokio::select! {
        _ = submission.cancel.cancelled() => {
            debug!(%session_id, ticket = %submission.ticket, "Submission cancelled before response landed");
            return;
        }
        outcome = work => outcome,
    };

    let outcome = match outcome {
        Ok(Ok(item)) => {
            info!(
                %session_id,
                backend = responder.backend(),
                kind = %item.kind(),
                "Storyboard response ready"
            );
            Ok(item)
        }
        Ok(Err(e)) => {
            warn!(%session_id, backend = responder.backend(), "Responder failed: {e}");
            Err(FAILURE_NOTICE.to_string())
        }
        Err(_) => {
            warn!(
                %session_id,
                backend = responder.backend(),
                "Responder timed out after {}ms",
                pacing.timeout.as_millis()
            );
            Err(format!(
                "No response within {}s",
                pacing.timeout.as_secs_f32()
            ))
        }
    };

    let settled = store
        .with(session_id, |session| session.settle(submission.ticket, outcome))
        .await;
    if settled != Some(true) {
        debug!(%session_id, "Session gone or ticket stale; response dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::errors::AppError;
    use crate::storyboard::models::{ItemKind, Payload, StoryboardItem};
    use crate::storyboard::profile::StaticProfile;
    use crate::storyboard::responder::KeywordResponder;
    use crate::storyboard::session::Role;

    const PACING: Pacing = Pacing {
        delay: Duration::from_millis(1500),
        timeout: Duration::from_secs(5),
    };

    struct FailingResponder;

    #[async_trait]
    impl Responder for FailingResponder {
        async fn respond(&self, _: &ResponseRequest) -> Result<StoryboardItem, AppError> {
            Err(AppError::Llm("upstream rejected".to_string()))
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    struct StalledResponder;

    #[async_trait]
    impl Responder for StalledResponder {
        async fn respond(&self, _: &ResponseRequest) -> Result<StoryboardItem, AppError> {
            std::future::pending().await
        }

        fn backend(&self) -> &'static str {
            "stalled"
        }
    }

    async fn submit(store: &SessionStore, text: &str) -> (Uuid, Submission) {
        let id = store.create(Role::Recruiter).await.id;
        let submission = store.with(id, |s| s.begin(text)).await.unwrap().unwrap();
        (id, submission)
    }

    #[tokio::test(start_paused = true)]
    async fn test_tech_query_lands_after_delay() {
        let store = SessionStore::new();
        let (id, submission) = submit(&store, "What's your tech stack?").await;
        let responder: Arc<dyn Responder> = Arc::new(KeywordResponder::new(StaticProfile));

        let handle = spawn_response(store.clone(), id, submission, responder, PACING);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let snapshot = store.with(id, |s| s.snapshot()).await.unwrap();
        assert!(snapshot.pending, "still pending before the delay elapses");
        assert_eq!(snapshot.items.len(), 2);

        handle.await.unwrap();
        let snapshot = store.with(id, |s| s.snapshot()).await.unwrap();
        assert!(!snapshot.pending);
        let last = snapshot.items.last().unwrap();
        assert_eq!(last.kind(), ItemKind::TechGrid);
        let Payload::TechGrid(grid) = last.payload() else {
            panic!("expected tech grid");
        };
        assert_eq!(grid.title, "Technical Competencies");
        assert_eq!(grid.technologies[0].name, "TypeScript");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_leaves_log_unchanged_and_clears_pending() {
        let store = SessionStore::new();
        let (id, submission) = submit(&store, "hello").await;
        let before = store.with(id, |s| s.items().len()).await.unwrap();

        spawn_response(store.clone(), id, submission, Arc::new(FailingResponder), PACING)
            .await
            .unwrap();

        let snapshot = store.with(id, |s| s.snapshot()).await.unwrap();
        assert_eq!(snapshot.items.len(), before);
        assert!(!snapshot.pending);
        let failure = snapshot.last_failure.unwrap();
        assert_eq!(failure, FAILURE_NOTICE);
        assert!(!failure.contains("upstream rejected"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_reported_as_failure() {
        let store = SessionStore::new();
        let (id, submission) = submit(&store, "hello").await;

        spawn_response(store.clone(), id, submission, Arc::new(StalledResponder), PACING)
            .await
            .unwrap();

        let snapshot = store.with(id, |s| s.snapshot()).await.unwrap();
        assert!(!snapshot.pending);
        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.last_failure.as_deref(), Some("No response within 5s"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_discarding_session_cancels_response() {
        let store = SessionStore::new();
        let (id, submission) = submit(&store, "career").await;
        let cancel = submission.cancel.clone();
        let responder: Arc<dyn Responder> = Arc::new(KeywordResponder::new(StaticProfile));

        let handle = spawn_response(store.clone(), id, submission, responder, PACING);
        assert!(store.discard(id).await);
        handle.await.unwrap();

        assert!(cancel.is_cancelled());
        assert!(store.with(id, |s| s.items().len()).await.is_none());
    }
}
