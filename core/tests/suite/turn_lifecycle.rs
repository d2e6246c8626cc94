use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use truthbot_core::ChatError;
use truthbot_core::ChatSession;
use truthbot_core::SessionId;
use truthbot_core::Winner;
use truthbot_judge_client::HttpClient;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

use super::support::chat_request_bodies;
use super::support::comparison_body;
use super::support::mount_turn;
use super::support::session_for;

#[tokio::test]
async fn first_turn_records_tie_and_adopts_session() {
    let server = MockServer::start().await;
    mount_turn(
        &server,
        "What is the capital of France?",
        json!({
            "response_a": "Paris.",
            "response_b": "Paris, France.",
            "winner": "TIE",
            "confidence": 0.5,
            "judge_reason": "Both correct.",
            "session_id": "s1"
        }),
    )
    .await;
    let session = session_for(&server);

    let record = session
        .submit_query("What is the capital of France?")
        .await
        .expect("turn succeeds");

    assert_eq!(record.query, "What is the capital of France?");
    assert_eq!(record.winner, Winner::Tie);
    assert_eq!(record.winning_response, "Paris.");
    assert_eq!(record.confidence, 0.5);
    assert_eq!(record.judge_reason, "Both correct.");
    assert_eq!(session.transcript(), vec![record]);
    assert_eq!(session.session_id(), Some(SessionId::from("s1")));
    assert!(!session.is_busy());

    let bodies = chat_request_bodies(&server).await;
    assert_eq!(
        bodies,
        vec![json!({ "query": "What is the capital of France?" })]
    );
}

#[tokio::test]
async fn blank_queries_are_rejected_without_a_request() {
    let server = MockServer::start().await;
    let session = session_for(&server);

    for query in ["", "   ", "\n\t"] {
        let err = session.submit_query(query).await.unwrap_err();
        assert!(matches!(err, ChatError::InvalidQuery), "got {err:?}");
    }

    assert!(session.transcript().is_empty());
    assert!(!session.is_busy());
    assert!(chat_request_bodies(&server).await.is_empty());
}

#[tokio::test]
async fn service_failure_rolls_back_to_previous_state() {
    let server = MockServer::start().await;
    mount_turn(
        &server,
        "first",
        comparison_body("a1", "b1", "FIRST", 0.9, "s1"),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;
    let session = session_for(&server);

    session.submit_query("first").await.expect("first succeeds");
    let before = session.snapshot();

    let err = session.submit_query("second").await.unwrap_err();
    assert!(matches!(err, ChatError::ServiceUnavailable(_)), "got {err:?}");

    assert_eq!(session.snapshot(), before);
    assert_eq!(session.transcript().len(), 1);
    assert_eq!(session.session_id(), Some(SessionId::from("s1")));
    assert!(!session.is_busy());
}

#[tokio::test]
async fn unreachable_service_is_unavailable() {
    // Port 1 is reserved and refuses connections.
    let client = HttpClient::new("http://127.0.0.1:1").expect("http client");
    let session = ChatSession::new(Arc::new(client));

    let err = session.submit_query("anyone there?").await.unwrap_err();
    assert!(matches!(err, ChatError::ServiceUnavailable(_)), "got {err:?}");
    assert!(!session.is_busy());
    assert_eq!(session.session_id(), None);
}

#[tokio::test]
async fn undecodable_body_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    let session = session_for(&server);

    let err = session.submit_query("hello").await.unwrap_err();
    assert!(matches!(err, ChatError::ServiceUnavailable(_)), "got {err:?}");
    assert!(session.transcript().is_empty());
    assert!(!session.is_busy());
}

#[tokio::test]
async fn invalid_verdicts_are_malformed_and_leave_no_trace() {
    let server = MockServer::start().await;
    mount_turn(
        &server,
        "bad winner",
        comparison_body("a", "b", "error", 0.0, "s-bad"),
    )
    .await;
    mount_turn(
        &server,
        "bad confidence",
        comparison_body("a", "b", "SECOND", 1.5, "s-bad"),
    )
    .await;
    let session = session_for(&server);

    for query in ["bad winner", "bad confidence"] {
        let err = session.submit_query(query).await.unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)), "got {err:?}");
    }

    assert!(session.transcript().is_empty());
    assert_eq!(session.session_id(), None);
    assert!(!session.is_busy());

    // A failed turn does not block the next one.
    mount_turn(&server, "retry", comparison_body("a", "b", "SECOND", 0.6, "s2")).await;
    let record = session.submit_query("retry").await.expect("retry succeeds");
    assert_eq!(record.winning_response, "b");
    assert_eq!(session.transcript().len(), 1);
}
