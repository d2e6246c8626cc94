//! Session-wide mutable state.
//!
//! Only the turn executor in `chat_session` writes to it; everything else
//! reads snapshots.

mod session;

pub use session::SessionSnapshot;
pub use session::SessionState;
