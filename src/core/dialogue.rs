//! Rehearsal Dialogue
//!
//! Plays the counterpart in a practice conversation. In live mode the reply
//! comes from the model, conditioned on the selected personality; otherwise
//! (or when the backend call fails) a scripted line for that personality is
//! used. Every turn is appended to the session's cached history so it can be
//! analyzed later.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::core::analysis::{AnalysisEngine, ConversationHistory, Exchange};
use crate::core::llm::{ChatMessage, ChatRequest};
use crate::core::personality::{self, PersonalityError, PersonalityKind, PersonalityProfile};
use crate::core::session::ConversationCache;

const EMOTIONAL_LINES: [&str; 3] = [
    "I just feel like nobody listens to me when I raise this.",
    "Honestly, this whole situation has been really upsetting for me.",
    "I need to know that you actually care about how this affects me.",
];

const DIRECT_LINES: [&str; 3] = [
    "Let's be clear: the deadline was missed and that's a problem.",
    "I don't need the backstory. What are you going to do about it?",
    "That's not good enough. Give me a concrete plan.",
];

const PASSIVE_AGGRESSIVE_LINES: [&str; 3] = [
    "Oh, no, it's fine. I'm used to picking up the slack around here.",
    "Sure, whatever works best for you. It always does.",
    "I guess some of us just have different ideas of what 'done' means.",
];

const LOGICAL_LINES: [&str; 3] = [
    "Let's look at the facts: the timeline slipped by two weeks.",
    "What data supports that approach over the alternatives?",
    "If we break the problem into steps, which step failed first?",
];

/// Canned reply for `kind` at position `turn`. Deterministic.
pub fn scripted_reply(kind: PersonalityKind, turn: usize) -> &'static str {
    let lines: &[&str] = match kind {
        PersonalityKind::Emotional => &EMOTIONAL_LINES,
        PersonalityKind::Direct => &DIRECT_LINES,
        PersonalityKind::PassiveAggressive => &PASSIVE_AGGRESSIVE_LINES,
        PersonalityKind::Logical => &LOGICAL_LINES,
    };
    lines[turn % lines.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Live,
    Scripted,
}

/// One counterpart reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub response: String,
    pub personality: PersonalityKind,
    pub source: ResponseSource,
    /// Zero-based position of this exchange in the session history.
    pub exchange_index: usize,
}

/// Turns within one session are serialized; different sessions proceed
/// independently.
pub struct DialogueGenerator {
    engine: Arc<AnalysisEngine>,
    cache: Arc<dyn ConversationCache>,
    sessions: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DialogueGenerator {
    pub fn new(engine: Arc<AnalysisEngine>, cache: Arc<dyn ConversationCache>) -> Self {
        Self {
            engine,
            cache,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    async fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(session_id.to_string()).or_default().clone()
    }

    /// Produce the counterpart's reply to `user_message` and record the
    /// exchange. An unknown personality key is the only error.
    pub async fn respond(
        &self,
        session_id: &str,
        personality_key: &str,
        user_message: &str,
    ) -> Result<DialogueTurn, PersonalityError> {
        let profile = personality::lookup(personality_key)?;
        let lock = self.session_lock(session_id).await;
        let _turn = lock.lock().await;
        let mut history = self.history(session_id).await;

        let (response, source) = match self.live_reply(profile, &history, user_message).await {
            Some(reply) => (reply, ResponseSource::Live),
            None => (
                scripted_reply(profile.kind, history.len()).to_string(),
                ResponseSource::Scripted,
            ),
        };

        let exchange_index = history.len();
        history.push(Exchange::new(user_message, response.clone()).with_timestamp(Utc::now()));
        if let Err(e) = self.cache.set(session_id, history).await {
            log::warn!("Failed to store conversation {}: {}", session_id, e);
        }

        Ok(DialogueTurn {
            response,
            personality: profile.kind,
            source,
            exchange_index,
        })
    }

    /// Cached history for a session. Cache failures read as an empty history.
    pub async fn history(&self, session_id: &str) -> ConversationHistory {
        match self.cache.get(session_id).await {
            Ok(history) => history.unwrap_or_default(),
            Err(e) => {
                log::warn!("Conversation cache unavailable for {}: {}", session_id, e);
                ConversationHistory::new()
            }
        }
    }

    /// Drop a session's history, returning what was stored.
    pub async fn end_session(&self, session_id: &str) -> ConversationHistory {
        let lock = self.session_lock(session_id).await;
        let history = {
            let _turn = lock.lock().await;
            let history = self.history(session_id).await;
            if let Err(e) = self.cache.remove(session_id).await {
                log::warn!("Failed to remove conversation {}: {}", session_id, e);
            }
            history
        };
        self.sessions.lock().await.remove(session_id);
        history
    }

    async fn live_reply(
        &self,
        profile: &PersonalityProfile,
        history: &[Exchange],
        user_message: &str,
    ) -> Option<String> {
        self.engine.initialize().await;
        let client = self.engine.backend().await?;

        let request = build_request(profile, history, user_message)
            .with_max_tokens(self.engine.config().dialogue_max_tokens);
        match client.chat(request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                Some(response.content.trim().to_string())
            }
            Ok(_) => {
                log::warn!("Backend returned an empty {} reply, using scripted line", profile.name);
                None
            }
            Err(e) => {
                log::warn!("Live dialogue failed, using scripted line: {}", e);
                None
            }
        }
    }
}

/// Personality system prompt, prior exchanges replayed, new message last.
pub fn build_request(
    profile: &PersonalityProfile,
    history: &[Exchange],
    user_message: &str,
) -> ChatRequest {
    let mut messages = Vec::with_capacity(history.len() * 2 + 1);
    for exchange in history {
        messages.push(ChatMessage::user(exchange.user_message.as_str()));
        if let Some(reply) = &exchange.ai_response {
            messages.push(ChatMessage::assistant(reply.as_str()));
        }
    }
    messages.push(ChatMessage::user(user_message));

    ChatRequest::new(messages)
        .with_system(profile.system_prompt())
        .with_temperature(0.8)
}
