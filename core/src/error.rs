use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

/// Ways a single turn can fail. None of them leave the session busy.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The query was empty or only whitespace. Nothing was sent.
    #[error("query must not be empty")]
    InvalidQuery,

    /// Another turn is still waiting on the comparison service.
    #[error("a turn is already in flight")]
    AlreadyInFlight,

    /// Transport or remote failure, including timeouts and undecodable bodies.
    #[error("comparison service unavailable: {0}")]
    ServiceUnavailable(#[source] truthbot_judge_client::Error),

    /// The service answered, but the judge verdict is not usable.
    #[error("malformed comparison response: {0}")]
    MalformedResponse(String),
}
