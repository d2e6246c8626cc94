use truthbot_judge_client::SessionId;

use crate::error::ChatError;
use crate::error::Result;
use crate::turn::TurnRecord;

/// Transcript, continuity token and busy flag for one conversation.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Oldest turn first.
    transcript: Vec<TurnRecord>,
    session_id: Option<SessionId>,
    busy: bool,
}

/// Point-in-time copy of [`SessionState`] handed to subscribers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSnapshot {
    pub transcript: Vec<TurnRecord>,
    pub session_id: Option<SessionId>,
    pub busy: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[TurnRecord] {
        &self.transcript
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            transcript: self.transcript.clone(),
            session_id: self.session_id.clone(),
            busy: self.busy,
        }
    }

    /// Claim the session for a new turn. This is the only concurrency gate.
    pub(crate) fn begin_turn(&mut self) -> Result<()> {
        if self.busy {
            return Err(ChatError::AlreadyInFlight);
        }
        self.busy = true;
        Ok(())
    }

    pub(crate) fn complete_turn(&mut self, record: TurnRecord, session_id: SessionId) {
        debug_assert!(self.busy, "complete_turn without begin_turn");
        self.transcript.push(record);
        self.session_id = Some(session_id);
        self.busy = false;
    }

    pub(crate) fn fail_turn(&mut self) {
        self.busy = false;
    }
}
