//! Analysis Data Model
//!
//! Conversation input, optional telemetry, and the report contract shared by
//! the heuristic and live engines.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Input
// ============================================================================

/// One user-message / AI-response turn.
///
/// Deserialization is permissive: a missing or non-string `user_message`
/// becomes an empty string and an unparseable `timestamp` becomes `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
    pub ai_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Exchange {
    pub fn new(user_message: impl Into<String>, ai_response: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ai_response: Some(ai_response.into()),
            timestamp: None,
        }
    }

    pub fn user_only(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ..Self::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Ordered exchanges; insertion order is chronological order.
pub type ConversationHistory = Vec<Exchange>;

pub const DEFAULT_AVG_STRESS: f64 = 35.0;
pub const DEFAULT_PEAK_EMPATHY: f64 = 82.0;
pub const DEFAULT_REGULATION: f64 = 78.0;

/// Optional biometric/neural signals supplied with a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeuralTelemetry {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_f64")]
    pub avg_stress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_f64")]
    pub peak_empathy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_f64")]
    pub regulation: Option<f64>,
    /// Signals the engine does not interpret.
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

// ============================================================================
// Report
// ============================================================================

/// Overall direction of the user's communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationPattern {
    Improving,
    NeedsWork,
}

impl CommunicationPattern {
    /// Strictly more empathetic than defensive exchanges; a tie needs work.
    pub fn from_counts(empathetic: usize, defensive: usize) -> Self {
        if empathetic > defensive {
            CommunicationPattern::Improving
        } else {
            CommunicationPattern::NeedsWork
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub total_exchanges: usize,
    pub empathetic_responses: usize,
    pub defensive_responses: usize,
    pub communication_pattern: CommunicationPattern,
}

/// Percentages in [0, 100], one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub empathy_score: f64,
    pub stress_reduction: f64,
    pub emotional_regulation: f64,
    pub communication_effectiveness: f64,
}

impl Metrics {
    /// Clamp every metric into [0, 100] and round to one decimal.
    /// Non-finite values become 0.
    pub fn normalized(self) -> Self {
        let fix = |v: f64| if v.is_finite() { round1(v.clamp(0.0, 100.0)) } else { 0.0 };
        Self {
            empathy_score: fix(self.empathy_score),
            stress_reduction: fix(self.stress_reduction),
            emotional_regulation: fix(self.emotional_regulation),
            communication_effectiveness: fix(self.communication_effectiveness),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralImprovements {
    pub new_pathways_formed: u64,
    pub stress_response_reduction: String,
    pub empathy_network_strengthening: String,
    pub prefrontal_cortex_activation: String,
}

/// Telemetry echoed back into the report, defaults filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralCorrelation {
    #[serde(rename = "avg_stress_during_training")]
    pub avg_stress: f64,
    #[serde(rename = "peak_empathy_activation")]
    pub peak_empathy: f64,
    #[serde(rename = "emotional_regulation_consistency")]
    pub regulation: f64,
}

impl NeuralCorrelation {
    pub fn from_telemetry(telemetry: &NeuralTelemetry) -> Self {
        Self {
            avg_stress: telemetry.avg_stress.unwrap_or(DEFAULT_AVG_STRESS),
            peak_empathy: telemetry.peak_empathy.unwrap_or(DEFAULT_PEAK_EMPATHY),
            regulation: telemetry.regulation.unwrap_or(DEFAULT_REGULATION),
        }
    }
}

/// Post-hoc performance report for one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub conversation_summary: ConversationSummary,
    pub metrics: Metrics,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub neural_improvements: NeuralImprovements,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neural_correlation: Option<NeuralCorrelation>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Round to one decimal place. Ties go to even on the exact binary value,
/// so 6.25 becomes 6.2 and 0.15 (stored just below) becomes 0.1.
pub fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// Whole-percent label, rounding halves to even.
pub fn percent_label(value: f64) -> String {
    format!("{}%", value.round_ties_even() as i64)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64().filter(|v| v.is_finite()))
}
