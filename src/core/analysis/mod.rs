//! Conversation Analysis
//!
//! Scores a practice conversation and explains the result:
//! - `heuristic`: deterministic keyword scoring, always available
//! - `live`: model-backed scoring, coerced into the same report shape
//! - `engine`: one-shot mode selection and per-request fallback

pub mod engine;
pub mod error;
pub mod heuristic;
pub mod live;
pub mod types;

pub use engine::{AnalysisEngine, AnalysisOutcome, ReportSource};
pub use error::AnalysisError;
pub use types::{
    AnalysisReport, CommunicationPattern, ConversationHistory, ConversationSummary, Exchange,
    Metrics, NeuralCorrelation, NeuralImprovements, NeuralTelemetry,
};
