use std::fmt;

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("http error: {0}")]
    Http(String),
    #[error("request to {0} timed out")]
    Timeout(String),
    #[error("{method} {url} failed: {status}; body={body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },
    #[error("decode error for {url}: {message}")]
    Decode { url: String, message: String },
}

/// Continuity token handed out by the comparison service.
///
/// The token is opaque to the client. Some deployments send it as a JSON
/// integer; it is kept as its decimal string either way.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireSessionId {
            Text(String),
            Number(i64),
        }

        Ok(match WireSessionId::deserialize(deserializer)? {
            WireSessionId::Text(text) => SessionId(text),
            WireSessionId::Number(n) => SessionId(n.to_string()),
        })
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        SessionId(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        SessionId(value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
}

/// Reply for one comparison turn.
///
/// `winner` is passed through as sent; callers decide which spellings they
/// accept. Extra fields such as `winner_response` are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResponse {
    #[serde(alias = "gemini_response")]
    pub response_a: String,
    #[serde(alias = "openai_response")]
    pub response_b: String,
    pub winner: String,
    pub confidence: f64,
    pub judge_reason: String,
    pub session_id: SessionId,
}

/// One row of the service's stored history for a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub query: String,
    pub winner: String,
    pub confidence: f64,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[async_trait::async_trait]
pub trait ComparisonBackend: Send + Sync {
    /// Ask both participants `request.query` and have the judge pick a winner.
    async fn compare(&self, request: ComparisonRequest) -> Result<ComparisonResponse>;
    /// Stored turns for `session_id`, newest first.
    async fn history(&self, session_id: &SessionId) -> Result<Vec<HistoryEntry>>;
    async fn health(&self) -> Result<String>;
}
