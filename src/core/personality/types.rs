//! Personality Types
//!
//! The closed set of communicator archetypes and the profile shape used to
//! condition dialogue tone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::PersonalityError;

/// Communicator archetypes the user can rehearse against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersonalityKind {
    Emotional,
    Direct,
    PassiveAggressive,
    Logical,
}

impl PersonalityKind {
    pub const ALL: [PersonalityKind; 4] = [
        PersonalityKind::Emotional,
        PersonalityKind::Direct,
        PersonalityKind::PassiveAggressive,
        PersonalityKind::Logical,
    ];

    /// Catalog key. Keys are case-sensitive.
    pub fn as_key(&self) -> &'static str {
        match self {
            PersonalityKind::Emotional => "emotional",
            PersonalityKind::Direct => "direct",
            PersonalityKind::PassiveAggressive => "passive-aggressive",
            PersonalityKind::Logical => "logical",
        }
    }
}

impl fmt::Display for PersonalityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl FromStr for PersonalityKind {
    type Err = PersonalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PersonalityKind::ALL
            .into_iter()
            .find(|kind| kind.as_key() == s)
            .ok_or_else(|| PersonalityError::not_found(s))
    }
}

/// Static description of one archetype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonalityProfile {
    pub kind: PersonalityKind,
    pub name: &'static str,
    pub description: &'static str,
    pub traits: &'static [&'static str],
    pub communication_style: &'static str,
}

impl PersonalityProfile {
    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.contains(&name)
    }

    /// System prompt that puts the model in character for a rehearsal.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are role-playing a person in a workplace conflict so the user can practise \
             conflict resolution. Stay in character.\n\
             Personality: {description}\n\
             Traits: {traits}\n\
             Communication style: {style}\n\
             Reply in one to three sentences and never mention that you are an AI.",
            description = self.description,
            traits = self.traits.join(", "),
            style = self.communication_style,
        )
    }
}
