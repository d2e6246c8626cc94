use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use chrono::Utc;

use crate::ComparisonBackend;
use crate::ComparisonRequest;
use crate::ComparisonResponse;
use crate::HistoryEntry;
use crate::Result;
use crate::SessionId;

/// Most entries the service keeps per session.
const HISTORY_LIMIT: usize = 50;

/// Offline stand-in for the comparison service.
///
/// Answers are derived from the query text so repeated runs are stable.
#[derive(Clone, Default)]
pub struct MockClient {
    next_id: Arc<AtomicI64>,
    history: Arc<Mutex<HashMap<SessionId, Vec<HistoryEntry>>>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ComparisonBackend for MockClient {
    async fn compare(&self, request: ComparisonRequest) -> Result<ComparisonResponse> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let session_id = request
            .session_id
            .unwrap_or_else(|| SessionId(format!("mock-session-{id}")));
        let query = request.query.trim();

        let (winner, confidence, judge_reason) = match query.chars().count() % 3 {
            0 => ("TIE", 0.5, "Both answers cover the question equally well."),
            1 => ("FIRST", 0.8, "Participant A answered more directly."),
            _ => ("SECOND", 0.75, "Participant B gave the more complete answer."),
        };

        {
            let mut history = self
                .history
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let entries = history.entry(session_id.clone()).or_default();
            entries.insert(
                0,
                HistoryEntry {
                    id,
                    query: request.query.clone(),
                    winner: winner.to_string(),
                    confidence,
                    created_at: Utc::now().naive_utc(),
                },
            );
            entries.truncate(HISTORY_LIMIT);
        }

        Ok(ComparisonResponse {
            response_a: format!("Participant A (mock) on \"{query}\": a short answer."),
            response_b: format!(
                "Participant B (mock) on \"{query}\": a longer answer with more detail."
            ),
            winner: winner.to_string(),
            confidence,
            judge_reason: judge_reason.to_string(),
            session_id,
        })
    }

    async fn history(&self, session_id: &SessionId) -> Result<Vec<HistoryEntry>> {
        let history = self
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(history.get(session_id).cloned().unwrap_or_default())
    }

    async fn health(&self) -> Result<String> {
        Ok("healthy".to_string())
    }
}
