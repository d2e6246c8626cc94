mod session_continuity;
mod turn_lifecycle;
