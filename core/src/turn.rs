use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use truthbot_judge_client::ComparisonResponse;
use truthbot_judge_client::SessionId;
use uuid::Uuid;

use crate::error::ChatError;
use crate::error::Result;

/// Which participant the judge preferred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    /// Participant A.
    First,
    /// Participant B.
    Second,
    Tie,
}

impl Winner {
    /// Parse a verdict as sent by the judge. Both the `FIRST`/`SECOND`/`TIE`
    /// spelling and the older `A`/`B`/`tie` spelling are accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "FIRST" | "A" => Some(Winner::First),
            "SECOND" | "B" => Some(Winner::Second),
            "TIE" => Some(Winner::Tie),
            _ => None,
        }
    }
}

/// One completed turn. Records are built only by [`TurnRecord::merge`] and
/// never change once they are in a transcript.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub id: Uuid,
    pub query: String,
    pub created_at: DateTime<Utc>,
    pub winner: Winner,
    pub confidence: f64,
    pub response_a: String,
    pub response_b: String,
    /// Copy of `response_a` or `response_b` matching `winner`. Ties show
    /// participant A.
    pub winning_response: String,
    pub judge_reason: String,
}

impl TurnRecord {
    /// Validate a service reply and fold it into a record for `query`.
    ///
    /// Returns the record together with the session id the service handed
    /// back for the next turn.
    pub(crate) fn merge(
        query: &str,
        created_at: DateTime<Utc>,
        response: ComparisonResponse,
    ) -> Result<(TurnRecord, SessionId)> {
        let ComparisonResponse {
            response_a,
            response_b,
            winner,
            confidence,
            judge_reason,
            session_id,
        } = response;

        let winner = Winner::parse(&winner)
            .ok_or_else(|| ChatError::MalformedResponse(format!("unknown winner {winner:?}")))?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ChatError::MalformedResponse(format!(
                "confidence {confidence} outside [0, 1]"
            )));
        }
        if winner == Winner::Tie && confidence > 0.5 {
            debug!("judge reported a tie with confidence {confidence}; keeping verdict as sent");
        }

        let winning_response = match winner {
            Winner::First | Winner::Tie => response_a.clone(),
            Winner::Second => response_b.clone(),
        };

        let record = TurnRecord {
            id: Uuid::new_v4(),
            query: query.to_string(),
            created_at,
            winner,
            confidence,
            response_a,
            response_b,
            winning_response,
            judge_reason,
        };
        Ok((record, session_id))
    }
}
