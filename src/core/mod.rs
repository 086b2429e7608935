pub mod logging;
pub mod llm;
pub mod personality;

// Conversation scoring: heuristic engine, live delegation, mode selection
pub mod analysis;

// Rehearsal dialogue and the per-session history it feeds
pub mod dialogue;
pub mod session;
