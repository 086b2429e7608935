//! Live Analysis
//!
//! Delegates scoring to the model backend and coerces its answer into the
//! same `AnalysisReport` contract the heuristic engine produces.

use serde::Deserialize;

use super::error::AnalysisError;
use super::heuristic;
use super::types::{
    AnalysisReport, CommunicationPattern, ConversationSummary, Exchange, Metrics,
    NeuralCorrelation, NeuralTelemetry,
};
use crate::core::llm::{BackendClient, ChatMessage, ChatRequest};

const ANALYSIS_SYSTEM_PROMPT: &str = "You are a communication coach reviewing a \
conflict-resolution practice conversation. Evaluate only the USER's messages for empathy, \
defensiveness, emotional regulation and overall effectiveness.\n\
Respond with a single JSON object and nothing else, using exactly this shape:\n\
{\n\
  \"conversation_summary\": {\"empathetic_responses\": <int>, \"defensive_responses\": <int>},\n\
  \"metrics\": {\"empathy_score\": <0-100>, \"stress_reduction\": <0-100>, \
\"emotional_regulation\": <0-100>, \"communication_effectiveness\": <0-100>},\n\
  \"insights\": [<string>, ...],\n\
  \"recommendations\": [<string>, ...]\n\
}";

#[derive(Debug, Deserialize)]
struct LiveSummary {
    empathetic_responses: usize,
    defensive_responses: usize,
}

#[derive(Debug, Deserialize)]
struct LivePayload {
    #[serde(default)]
    conversation_summary: Option<LiveSummary>,
    metrics: Metrics,
    insights: Vec<String>,
    recommendations: Vec<String>,
}

/// Plain-text transcript of the conversation for the prompt.
pub fn render_transcript(history: &[Exchange]) -> String {
    if history.is_empty() {
        return "(the user has not said anything yet)".to_string();
    }

    let mut transcript = String::new();
    for (i, exchange) in history.iter().enumerate() {
        transcript.push_str(&format!("Exchange {}\nUser: {}\n", i + 1, exchange.user_message));
        if let Some(reply) = &exchange.ai_response {
            transcript.push_str(&format!("Partner: {}\n", reply));
        }
    }
    transcript
}

pub fn build_request(history: &[Exchange], max_tokens: u32) -> ChatRequest {
    ChatRequest::new(vec![ChatMessage::user(render_transcript(history))])
        .with_system(ANALYSIS_SYSTEM_PROMPT)
        .with_temperature(0.0)
        .with_max_tokens(max_tokens)
}

/// Locate the JSON object in a completion that may be wrapped in prose or
/// a Markdown code fence.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a completion into a report.
///
/// Metrics are clamped and rounded, counts are bounded by the real number of
/// exchanges, and the pattern and improvement figures are recomputed from
/// those counts and metrics. Telemetry is echoed from the input, never taken
/// from the model.
pub fn parse_report(
    content: &str,
    history: &[Exchange],
    telemetry: Option<&NeuralTelemetry>,
) -> Result<AnalysisReport, AnalysisError> {
    let json = extract_json_object(content)
        .ok_or_else(|| AnalysisError::malformed("no JSON object in completion"))?;
    let payload: LivePayload =
        serde_json::from_str(json).map_err(|e| AnalysisError::malformed(e.to_string()))?;

    let insights = non_blank(payload.insights);
    let recommendations = non_blank(payload.recommendations);
    if insights.is_empty() || recommendations.is_empty() {
        return Err(AnalysisError::malformed("empty insights or recommendations"));
    }

    let counts = heuristic::count_keywords(history);
    let total = counts.total;
    let (empathetic, defensive) = match payload.conversation_summary {
        Some(summary) => (
            summary.empathetic_responses.min(total),
            summary.defensive_responses.min(total),
        ),
        None => (counts.empathetic, counts.defensive),
    };

    let metrics = payload.metrics.normalized();
    let neural_improvements = heuristic::neural_improvements(
        total,
        empathetic,
        metrics.empathy_score,
        metrics.stress_reduction,
    );

    Ok(AnalysisReport {
        conversation_summary: ConversationSummary {
            total_exchanges: total,
            empathetic_responses: empathetic,
            defensive_responses: defensive,
            communication_pattern: CommunicationPattern::from_counts(empathetic, defensive),
        },
        metrics,
        insights,
        recommendations,
        neural_improvements,
        neural_correlation: telemetry.map(NeuralCorrelation::from_telemetry),
    })
}

fn non_blank(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Run one live analysis round trip.
pub async fn analyze(
    client: &BackendClient,
    history: &[Exchange],
    telemetry: Option<&NeuralTelemetry>,
    max_tokens: u32,
) -> Result<AnalysisReport, AnalysisError> {
    let response = client.chat(build_request(history, max_tokens)).await?;
    parse_report(&response.content, history, telemetry)
}
