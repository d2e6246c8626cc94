//! Chat session core for TruthBot.
//!
//! Each turn sends the user's query to a comparison service, where two
//! participants answer and a judge picks the better answer. This crate owns
//! the transcript, the session continuity token and the single-turn
//! concurrency gate; rendering is left to callers.

#![deny(clippy::print_stdout, clippy::print_stderr)]

mod chat_session;
pub mod config;
pub mod error;
pub mod state;
mod turn;

pub use chat_session::ChatSession;
pub use error::ChatError;
pub use error::Result;
pub use state::SessionSnapshot;
pub use turn::TurnRecord;
pub use turn::Winner;

pub use truthbot_judge_client::ComparisonBackend;
pub use truthbot_judge_client::HistoryEntry;
pub use truthbot_judge_client::SessionId;
