//! Unit Tests
//!
//! Backend client retry/timeout policy and the HTTP provider.
