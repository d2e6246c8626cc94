use pretty_assertions::assert_eq;
use serde_json::json;
use truthbot_core::SessionId;
use truthbot_core::Winner;
use wiremock::MockServer;

use super::support::chat_request_bodies;
use super::support::comparison_body;
use super::support::mount_turn;
use super::support::session_for;

#[tokio::test]
async fn each_request_carries_the_previous_session_token() {
    let server = MockServer::start().await;
    let turns = [
        ("one", "FIRST", "s1"),
        ("two", "SECOND", "s2"),
        ("three", "TIE", "s3"),
    ];
    for (query, winner, sid) in turns {
        mount_turn(
            &server,
            query,
            comparison_body(&format!("{query}-a"), &format!("{query}-b"), winner, 0.7, sid),
        )
        .await;
    }
    let session = session_for(&server);

    for (query, _, _) in turns {
        session.submit_query(query).await.expect("turn succeeds");
    }

    let bodies = chat_request_bodies(&server).await;
    assert_eq!(
        bodies,
        vec![
            json!({ "query": "one" }),
            json!({ "query": "two", "session_id": "s1" }),
            json!({ "query": "three", "session_id": "s2" }),
        ]
    );
    assert_eq!(session.session_id(), Some(SessionId::from("s3")));

    let transcript = session.transcript();
    let queries: Vec<&str> = transcript.iter().map(|r| r.query.as_str()).collect();
    assert_eq!(queries, vec!["one", "two", "three"]);

    for record in &transcript {
        let expected = match record.winner {
            Winner::First | Winner::Tie => &record.response_a,
            Winner::Second => &record.response_b,
        };
        assert_eq!(&record.winning_response, expected);
    }
    let ids: std::collections::HashSet<_> = transcript.iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), transcript.len(), "record ids must be unique");
}

#[tokio::test]
async fn integer_session_tokens_round_trip_as_strings() {
    let server = MockServer::start().await;
    mount_turn(
        &server,
        "legacy",
        json!({
            "winner": "B",
            "winner_response": "openai says hi",
            "loser_response": "gemini says hi",
            "judge_reason": "Friendlier.",
            "confidence": 0.8,
            "gemini_response": "gemini says hi",
            "openai_response": "openai says hi",
            "session_id": 41
        }),
    )
    .await;
    mount_turn(
        &server,
        "follow-up",
        json!({
            "winner": "A",
            "judge_reason": "Shorter.",
            "confidence": 0.6,
            "gemini_response": "short",
            "openai_response": "much longer",
            "session_id": 41
        }),
    )
    .await;
    let session = session_for(&server);

    let first = session.submit_query("legacy").await.expect("first turn");
    assert_eq!(first.winner, Winner::Second);
    assert_eq!(first.winning_response, "openai says hi");
    assert_eq!(session.session_id(), Some(SessionId::from("41")));

    let second = session.submit_query("follow-up").await.expect("second turn");
    assert_eq!(second.winning_response, "short");

    let bodies = chat_request_bodies(&server).await;
    assert_eq!(bodies[1], json!({ "query": "follow-up", "session_id": "41" }));
}
