//! Personality Catalog
//!
//! Fixed registry of communicator archetypes. Built into the binary; there
//! is no insertion or removal.

use super::errors::PersonalityError;
use super::types::{PersonalityKind, PersonalityProfile};

static EMOTIONAL: PersonalityProfile = PersonalityProfile {
    kind: PersonalityKind::Emotional,
    name: "emotional",
    description: "Expressive and emotionally driven communicator",
    traits: &["emotional", "expressive", "sensitive", "reactive"],
    communication_style: "Uses emotional language, shares feelings openly, seeks emotional validation",
};

static DIRECT: PersonalityProfile = PersonalityProfile {
    kind: PersonalityKind::Direct,
    name: "direct",
    description: "Straightforward and blunt communicator",
    traits: &["direct", "honest", "no-nonsense", "confrontational"],
    communication_style: "Speaks plainly, gets to the point, doesn't sugarcoat messages",
};

static PASSIVE_AGGRESSIVE: PersonalityProfile = PersonalityProfile {
    kind: PersonalityKind::PassiveAggressive,
    name: "passive-aggressive",
    description: "Indirect and subtly hostile communicator",
    traits: &["indirect", "sarcastic", "resentful", "defensive"],
    communication_style: "Uses subtle digs, avoids direct confrontation, employs sarcasm",
};

static LOGICAL: PersonalityProfile = PersonalityProfile {
    kind: PersonalityKind::Logical,
    name: "logical",
    description: "Analytical and fact-based communicator",
    traits: &["logical", "analytical", "fact-focused", "methodical"],
    communication_style: "Focuses on facts and logic, seeks rational solutions, avoids emotional appeals",
};

/// Profile for a known archetype.
pub fn profile(kind: PersonalityKind) -> &'static PersonalityProfile {
    match kind {
        PersonalityKind::Emotional => &EMOTIONAL,
        PersonalityKind::Direct => &DIRECT,
        PersonalityKind::PassiveAggressive => &PASSIVE_AGGRESSIVE,
        PersonalityKind::Logical => &LOGICAL,
    }
}

/// Look up a profile by its case-sensitive key.
pub fn lookup(key: &str) -> Result<&'static PersonalityProfile, PersonalityError> {
    key.parse::<PersonalityKind>().map(profile)
}

/// All profiles in catalog order.
pub fn all() -> impl Iterator<Item = &'static PersonalityProfile> {
    PersonalityKind::ALL.into_iter().map(profile)
}

/// All catalog keys in catalog order.
pub fn keys() -> impl Iterator<Item = &'static str> {
    PersonalityKind::ALL.into_iter().map(|kind| kind.as_key())
}
