//! Prayer request intake
//!
//! Resolves the timeline day offset through the text-completion service and
//! then hands the submission to the registry. The service can only ever
//! leave the offset unset; it never fails a submission.

use tracing::{debug, instrument};
use vigil_assist::{Assistant, CompletionBackend};
use vigil_core::{
    is_valid_timeline_days, Actor, NewRequest, PrayerRequest, PrayerTracker, Storage,
};

use crate::error::Result;

#[instrument(skip_all, fields(actor = %actor.id))]
pub async fn submit_request<S, B>(
    tracker: &PrayerTracker<'_, S>,
    assistant: &Assistant<B>,
    actor: &Actor,
    mut submission: NewRequest,
) -> Result<PrayerRequest>
where
    S: Storage,
    B: CompletionBackend,
{
    if submission.timeline_days.is_none() {
        if let Some(text) = submission
            .timeline_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            let estimate = assistant.timeline(text).await;
            debug!(days = ?estimate.days, deadline = ?estimate.deadline, "Timeline resolved");
            submission.timeline_days = estimate.days.filter(|d| is_valid_timeline_days(*d));
        }
    }

    Ok(tracker.submit(actor, submission)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vigil_assist::OpenAiBackend;
    use vigil_core::{Database, RequestStatus};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn assistant_for(server: &MockServer) -> Assistant<OpenAiBackend> {
        let backend =
            OpenAiBackend::new(server.uri(), "llama-3.3-70b-versatile", Some("key".into()))
                .unwrap();
        Assistant::new(backend)
    }

    #[tokio::test]
    async fn test_failed_timeline_still_submits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .expect(1)
            .mount(&server)
            .await;

        let db = Database::open_in_memory().unwrap();
        let tracker = PrayerTracker::with_defaults(&db);

        let request = submit_request(
            &tracker,
            &assistant_for(&server),
            &Actor::guest(),
            NewRequest::new("Final exams").with_timeline("in 3 days"),
        )
        .await
        .unwrap();

        assert_eq!(request.status, RequestStatus::Active);
        assert_eq!(request.timeline_days, None);
        assert_eq!(request.timeline_text.as_deref(), Some("in 3 days"));
        assert!(db.requests().find_by_id(request.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_timeline_days_resolved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "{\"days\": 3, \"deadline\": null}" } }]
            })))
            .mount(&server)
            .await;

        let db = Database::open_in_memory().unwrap();
        let tracker = PrayerTracker::with_defaults(&db);

        let request = submit_request(
            &tracker,
            &assistant_for(&server),
            &Actor::guest(),
            NewRequest::new("Surgery").with_timeline("in 3 days"),
        )
        .await
        .unwrap();
        assert_eq!(request.timeline_days, Some(3));
    }

    #[tokio::test]
    async fn test_out_of_range_days_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "{\"days\": 9000000000, \"deadline\": null}" } }]
            })))
            .mount(&server)
            .await;

        let db = Database::open_in_memory().unwrap();
        let tracker = PrayerTracker::with_defaults(&db);

        let request = submit_request(
            &tracker,
            &assistant_for(&server),
            &Actor::guest(),
            NewRequest::new("Patience").with_timeline("some day"),
        )
        .await
        .unwrap();
        assert_eq!(request.timeline_days, None);
    }

    #[tokio::test]
    async fn test_no_timeline_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let db = Database::open_in_memory().unwrap();
        let tracker = PrayerTracker::with_defaults(&db);

        let request = submit_request(
            &tracker,
            &assistant_for(&server),
            &Actor::guest(),
            NewRequest::new("General guidance"),
        )
        .await
        .unwrap();
        assert_eq!(request.timeline_days, None);
    }
}
