//! Heuristic Analysis Engine
//!
//! Deterministic, always-available stand-in for the model backend. Scores a
//! conversation by surface keyword scanning of the user's messages.
//!
//! Matching is case-insensitive *substring* matching: "misunderstand" counts
//! as empathetic because it contains "understand", and "nothing" counts as
//! defensive because it contains "not". Changing this to whole-word matching
//! would shift every score.

use super::types::{
    percent_label, round1, AnalysisReport, CommunicationPattern, ConversationSummary, Exchange,
    Metrics, NeuralCorrelation, NeuralImprovements, NeuralTelemetry,
};

pub const EMPATHY_KEYWORDS: [&str; 4] = ["understand", "feel", "sorry", "hear"];
pub const DEFENSIVE_KEYWORDS: [&str; 4] = ["wrong", "not", "but", "however"];

pub const STRESS_REDUCTION_FLOOR: f64 = 20.0;
pub const EFFECTIVENESS_CEILING: f64 = 95.0;
pub const EFFECTIVENESS_MULTIPLIER: f64 = 1.2;
pub const PREFRONTAL_ACTIVATION: &str = "increased by 34%";

/// Fixed observations. Not derived from the scores.
pub const INSIGHTS: [&str; 4] = [
    "User showed improved empathetic responding during conflict",
    "Stress levels decreased as conversation progressed",
    "Neural pathways for emotional regulation strengthened",
    "Communication pattern shifted from defensive to collaborative",
];

/// Fixed suggestions. Not derived from the scores.
pub const RECOMMENDATIONS: [&str; 4] = [
    "Continue practicing active listening techniques",
    "Focus on emotional validation before problem-solving",
    "Develop pause-and-reflect responses to reduce reactivity",
    "Practice perspective-taking exercises",
];

/// Keyword tallies over a conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordCounts {
    pub total: usize,
    pub empathetic: usize,
    pub defensive: usize,
}

/// Whether `message` contains any of `keywords` as a lower-cased substring.
pub fn contains_any(message: &str, keywords: &[&str]) -> bool {
    let lower = message.to_lowercase();
    keywords.iter().any(|keyword| lower.contains(keyword))
}

/// Count empathetic and defensive exchanges. One exchange may count for both.
pub fn count_keywords(history: &[Exchange]) -> KeywordCounts {
    history.iter().fold(
        KeywordCounts {
            total: history.len(),
            ..KeywordCounts::default()
        },
        |mut counts, exchange| {
            if contains_any(&exchange.user_message, &EMPATHY_KEYWORDS) {
                counts.empathetic += 1;
            }
            if contains_any(&exchange.user_message, &DEFENSIVE_KEYWORDS) {
                counts.defensive += 1;
            }
            counts
        },
    )
}

/// Unrounded metric values for a set of counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawScores {
    pub empathy_score: f64,
    pub stress_reduction: f64,
}

impl RawScores {
    pub fn from_counts(counts: &KeywordCounts) -> Self {
        let denominator = counts.total.max(1) as f64;
        let empathy_score = counts.empathetic as f64 / denominator * 100.0;
        let stress_reduction =
            (100.0 - counts.defensive as f64 / denominator * 100.0).max(STRESS_REDUCTION_FLOOR);
        Self {
            empathy_score,
            stress_reduction,
        }
    }

    pub fn metrics(&self) -> Metrics {
        Metrics {
            empathy_score: round1(self.empathy_score),
            stress_reduction: round1(self.stress_reduction),
            emotional_regulation: round1((self.empathy_score + self.stress_reduction) / 2.0),
            communication_effectiveness: round1(
                (self.empathy_score * EFFECTIVENESS_MULTIPLIER).min(EFFECTIVENESS_CEILING),
            ),
        }
    }

    pub fn neural_improvements(&self, counts: &KeywordCounts) -> NeuralImprovements {
        neural_improvements(
            counts.total,
            counts.empathetic,
            self.empathy_score,
            self.stress_reduction,
        )
    }
}

/// Improvement figures for a report's own counts and scores.
pub fn neural_improvements(
    total: usize,
    empathetic: usize,
    empathy_score: f64,
    stress_reduction: f64,
) -> NeuralImprovements {
    NeuralImprovements {
        new_pathways_formed: total as u64 * 3 + empathetic as u64 * 2,
        stress_response_reduction: percent_label(stress_reduction),
        empathy_network_strengthening: percent_label(empathy_score),
        prefrontal_cortex_activation: PREFRONTAL_ACTIVATION.to_string(),
    }
}

/// Produce a complete report for `history`. Pure: no I/O, clock or randomness.
pub fn analyze(history: &[Exchange], telemetry: Option<&NeuralTelemetry>) -> AnalysisReport {
    let counts = count_keywords(history);
    let scores = RawScores::from_counts(&counts);

    AnalysisReport {
        conversation_summary: ConversationSummary {
            total_exchanges: counts.total,
            empathetic_responses: counts.empathetic,
            defensive_responses: counts.defensive,
            communication_pattern: CommunicationPattern::from_counts(
                counts.empathetic,
                counts.defensive,
            ),
        },
        metrics: scores.metrics(),
        insights: INSIGHTS.iter().map(|s| s.to_string()).collect(),
        recommendations: RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
        neural_improvements: scores.neural_improvements(&counts),
        neural_correlation: telemetry.map(NeuralCorrelation::from_telemetry),
    }
}
