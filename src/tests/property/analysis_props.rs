//! Property-based tests for heuristic conversation analysis
//!
//! Tests invariants:
//! - Metrics in [0, 100], stress reduction >= 20, effectiveness <= 95
//! - Pattern is "improving" iff empathetic > defensive
//! - Counts never exceed the number of exchanges
//! - Identical input yields byte-identical output
//! - Embedding a keyword anywhere in a message counts it

use proptest::prelude::*;

use crate::core::analysis::heuristic::{self, DEFENSIVE_KEYWORDS, EMPATHY_KEYWORDS};
use crate::core::analysis::types::round1;
use crate::core::analysis::{CommunicationPattern, Exchange, NeuralTelemetry};

// ============================================================================
// Strategies
// ============================================================================

/// Messages drawn from keyword-bearing and neutral fragments.
fn arb_message() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ,.!?']{0,60}",
        prop::sample::select(EMPATHY_KEYWORDS.to_vec()).prop_map(|k| format!("I {} you", k)),
        prop::sample::select(DEFENSIVE_KEYWORDS.to_vec()).prop_map(|k| format!("That is {}", k)),
        Just("I understand, but you're wrong".to_string()),
        Just(String::new()),
    ]
}

fn arb_history() -> impl Strategy<Value = Vec<Exchange>> {
    prop::collection::vec(
        (arb_message(), proptest::option::of("[a-z ]{0,30}")).prop_map(|(user, ai)| Exchange {
            user_message: user,
            ai_response: ai,
            timestamp: None,
        }),
        0..40,
    )
}

/// Casing variants of a keyword, e.g. "FeEl".
fn arb_cased_keyword() -> impl Strategy<Value = String> {
    (prop::sample::select(EMPATHY_KEYWORDS.to_vec()), any::<u64>()).prop_map(|(k, mask)| {
        k.chars()
            .enumerate()
            .map(|(i, c)| if mask >> (i % 64) & 1 == 1 { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn metrics_within_bounds(history in arb_history()) {
        let report = heuristic::analyze(&history, None);
        let m = &report.metrics;
        for value in [m.empathy_score, m.stress_reduction, m.emotional_regulation, m.communication_effectiveness] {
            prop_assert!((0.0..=100.0).contains(&value), "out of range: {}", value);
            prop_assert_eq!(round1(value), value);
        }
        prop_assert!(m.stress_reduction >= 20.0);
        prop_assert!(m.communication_effectiveness <= 95.0);
    }

    #[test]
    fn pattern_iff_more_empathetic(history in arb_history()) {
        let summary = heuristic::analyze(&history, None).conversation_summary;
        let improving = summary.empathetic_responses > summary.defensive_responses;
        prop_assert_eq!(
            summary.communication_pattern == CommunicationPattern::Improving,
            improving
        );
    }

    #[test]
    fn counts_bounded_by_total(history in arb_history()) {
        let report = heuristic::analyze(&history, None);
        let summary = &report.conversation_summary;
        prop_assert_eq!(summary.total_exchanges, history.len());
        prop_assert!(summary.empathetic_responses <= summary.total_exchanges);
        prop_assert!(summary.defensive_responses <= summary.total_exchanges);
        prop_assert_eq!(
            report.neural_improvements.new_pathways_formed,
            (summary.total_exchanges * 3 + summary.empathetic_responses * 2) as u64
        );
    }

    #[test]
    fn analysis_is_byte_identical(history in arb_history()) {
        let a = serde_json::to_string(&heuristic::analyze(&history, None)).unwrap();
        let b = serde_json::to_string(&heuristic::analyze(&history, None)).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn keyword_anywhere_counts(prefix in "[a-z ]{0,20}", keyword in arb_cased_keyword(), suffix in "[a-z ]{0,20}") {
        let message = format!("{}{}{}", prefix, keyword, suffix);
        let report = heuristic::analyze(&[Exchange::user_only(message)], None);
        prop_assert_eq!(report.conversation_summary.empathetic_responses, 1);
    }

    #[test]
    fn telemetry_values_echoed(stress in 0.0f64..100.0, empathy in 0.0f64..100.0) {
        let telemetry = NeuralTelemetry {
            avg_stress: Some(stress),
            peak_empathy: Some(empathy),
            ..NeuralTelemetry::default()
        };
        let correlation = heuristic::analyze(&[], Some(&telemetry)).neural_correlation.unwrap();
        prop_assert_eq!(correlation.avg_stress, stress);
        prop_assert_eq!(correlation.peak_empathy, empathy);
        prop_assert_eq!(correlation.regulation, 78.0);
    }
}
