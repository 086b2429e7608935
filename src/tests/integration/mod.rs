//! Integration Tests
//!
//! End-to-end flows through the analysis engine and dialogue generator with
//! a scripted backend provider.

mod engine_integration;
