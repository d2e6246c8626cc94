use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use chrono::Utc;
use tokio::sync::watch;
use tracing::info;
use tracing::warn;
use truthbot_judge_client::ComparisonBackend;
use truthbot_judge_client::ComparisonRequest;
use truthbot_judge_client::HistoryEntry;
use truthbot_judge_client::SessionId;

use crate::error::ChatError;
use crate::error::Result;
use crate::state::SessionSnapshot;
use crate::state::SessionState;
use crate::turn::TurnRecord;

/// One conversation against the comparison service.
///
/// At most one turn is outstanding at a time; a submission made while
/// another is in flight is rejected with [`ChatError::AlreadyInFlight`]
/// rather than queued.
pub struct ChatSession {
    backend: Arc<dyn ComparisonBackend>,
    state: Mutex<SessionState>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ComparisonBackend>) -> Self {
        let (snapshot_tx, _rx) = watch::channel(SessionSnapshot::default());
        Self {
            backend,
            state: Mutex::new(SessionState::new()),
            snapshot_tx,
        }
    }

    pub fn transcript(&self) -> Vec<TurnRecord> {
        self.lock_state().transcript().to_vec()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.lock_state().session_id().cloned()
    }

    pub fn is_busy(&self) -> bool {
        self.lock_state().is_busy()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock_state().snapshot()
    }

    /// Receive a fresh [`SessionSnapshot`] after every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Run one turn: send `query` with the current session token, validate
    /// the verdict and append the resulting record.
    ///
    /// On any failure the transcript and session token are left as they
    /// were, so resubmitting is always safe.
    pub async fn submit_query(&self, query: &str) -> Result<TurnRecord> {
        if query.trim().is_empty() {
            return Err(ChatError::InvalidQuery);
        }

        // Check-and-set under a single lock; no await until the flag is up.
        let session_id = {
            let mut state = self.lock_state();
            state.begin_turn()?;
            self.publish(&state);
            state.session_id().cloned()
        };
        let turn = InFlightTurn::new(self);

        info!(
            "turn started: query_chars={} session={}",
            query.chars().count(),
            session_id.as_ref().map_or("<none>", |sid| sid.0.as_str())
        );

        let response = match self
            .backend
            .compare(ComparisonRequest {
                query: query.to_string(),
                session_id,
            })
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!("turn failed: comparison service error: {err}");
                turn.fail();
                return Err(ChatError::ServiceUnavailable(err));
            }
        };

        let (record, next_session_id) = match TurnRecord::merge(query, Utc::now(), response) {
            Ok(merged) => merged,
            Err(err) => {
                warn!("turn failed: {err}");
                turn.fail();
                return Err(err);
            }
        };

        info!(
            "turn completed: winner={:?} confidence={} session={next_session_id}",
            record.winner, record.confidence
        );
        turn.complete(record.clone(), next_session_id);
        Ok(record)
    }

    /// Turns the service has stored for the current session, newest first.
    /// Empty before the first successful turn.
    pub async fn remote_history(&self) -> Result<Vec<HistoryEntry>> {
        let Some(session_id) = self.session_id() else {
            return Ok(Vec::new());
        };
        self.backend
            .history(&session_id)
            .await
            .map_err(ChatError::ServiceUnavailable)
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &SessionState) {
        self.snapshot_tx.send_replace(state.snapshot());
    }
}

/// Releases the busy flag exactly once. If the turn future is dropped
/// before settling, the turn counts as failed.
struct InFlightTurn<'a> {
    session: &'a ChatSession,
    settled: bool,
}

impl<'a> InFlightTurn<'a> {
    fn new(session: &'a ChatSession) -> Self {
        Self {
            session,
            settled: false,
        }
    }

    fn complete(mut self, record: TurnRecord, session_id: SessionId) {
        let mut state = self.session.lock_state();
        state.complete_turn(record, session_id);
        self.session.publish(&state);
        self.settled = true;
    }

    fn fail(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.session.lock_state();
        state.fail_turn();
        self.session.publish(&state);
        self.settled = true;
    }
}

impl Drop for InFlightTurn<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
