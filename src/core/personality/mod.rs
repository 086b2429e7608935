//! Personality Module
//!
//! Static catalog of communicator archetypes (`emotional`, `direct`,
//! `passive-aggressive`, `logical`) used to set the tone of rehearsal
//! dialogue.

pub mod catalog;
pub mod errors;
pub mod types;

pub use catalog::{all, keys, lookup, profile};
pub use errors::PersonalityError;
pub use types::{PersonalityKind, PersonalityProfile};
