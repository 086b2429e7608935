/// Conflict Coach - conflict-resolution practice service
///
/// Core library providing personality-driven rehearsal dialogue and
/// post-conversation communication analysis, backed by a live model when one
/// is reachable and a deterministic heuristic engine otherwise.

pub mod config;
pub mod core;


pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
