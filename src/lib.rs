pub mod cli;
pub mod config;
pub mod error;
pub mod question;
pub mod responder;
pub mod segment;
pub mod web;

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use serde::Serialize;
use uuid::Uuid;

use error::{fallback_message, RejectReason, TIMEOUT_MESSAGE};
use question::Question;
use responder::{build_system_prompt, Prompt, PromptMessage, Responder, GREETING};

/// How many trailing transcript turns a remote prompt may carry. Older
/// turns are dropped, never summarized.
pub const CONTEXT_TURNS: usize = 5;

// ---------------------------------------------------------------------------
// Turn types
// ---------------------------------------------------------------------------

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One exchange unit. Immutable once created; only the engine creates them.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: SystemTime,
}

impl Turn {
    fn new(role: Role, content: String) -> Self {
        Turn {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: SystemTime::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine configuration
// ---------------------------------------------------------------------------

/// Knobs the shell sets once at construction time.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum wait for one resolution before the fallback reply is
    /// substituted.
    pub response_timeout: Duration,
}

impl EngineConfig {
    /// Default wait budget: 15 s.
    pub fn new() -> Self {
        EngineConfig {
            response_timeout: Duration::from_secs(15),
        }
    }

    pub fn with_timeout(response_timeout: Duration) -> Self {
        EngineConfig { response_timeout }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// ConversationEngine: one session's turn-based state machine
// ---------------------------------------------------------------------------

struct EngineState {
    transcript: Vec<Turn>,
    pending: bool,
    student_answer: Option<String>,
}

/// Owns one session's transcript and enforces one-at-a-time resolution.
///
/// Two states: `Idle` (pending == false) and `AwaitingResponse`
/// (pending == true). A submission is only accepted while `Idle`; the
/// engine then appends the user turn, resolves exactly one assistant turn
/// through its [`Responder`] (bounded by `response_timeout`, falling back
/// to an apology turn on error or timeout), and returns to `Idle`. No
/// path leaves the engine stuck in `AwaitingResponse`.
///
/// The inner state sits behind a `Mutex` that is never held across an
/// await, so shells may share the engine via `Arc` across tasks.
pub struct ConversationEngine {
    state: Mutex<EngineState>,
    responder: Box<dyn Responder>,
    question: Question,
    config: EngineConfig,
}

impl ConversationEngine {
    /// Build a fresh session. The transcript starts with Jojo's greeting
    /// turn, so the role-alternation invariant holds from the first
    /// submission.
    pub fn new(responder: Box<dyn Responder>, question: Question, config: EngineConfig) -> Self {
        ConversationEngine {
            state: Mutex::new(EngineState {
                transcript: vec![Turn::new(Role::Assistant, GREETING.to_string())],
                pending: false,
                student_answer: None,
            }),
            responder,
            question,
            config,
        }
    }

    /// Accept one utterance and resolve its reply.
    ///
    /// Rejects with [`RejectReason::EmptyInput`] when the utterance is
    /// blank after trimming, and with [`RejectReason::Busy`] while a
    /// previous resolution is still in flight. On acceptance the
    /// transcript grows by exactly two turns (user, then assistant,
    /// real or fallback) before this returns.
    pub async fn submit(&self, utterance: &str) -> Result<(), RejectReason> {
        let trimmed = utterance.trim();
        if trimmed.is_empty() {
            return Err(RejectReason::EmptyInput);
        }

        let prompt = {
            let mut state = self.lock_state();
            if state.pending {
                return Err(RejectReason::Busy);
            }
            state.transcript.push(Turn::new(Role::User, trimmed.to_string()));
            state.pending = true;
            self.build_prompt(&state)
        };

        let reply_text = match tokio::time::timeout(
            self.config.response_timeout,
            self.responder.respond(&prompt),
        )
        .await
        {
            Ok(Ok(reply)) => {
                tracing::debug!(
                    responder = self.responder.name(),
                    tokens_used = reply.tokens_used,
                    "resolution complete"
                );
                reply.text
            }
            Ok(Err(err)) => {
                tracing::warn!(
                    responder = self.responder.name(),
                    error = %err,
                    "resolution failed, substituting fallback turn"
                );
                fallback_message(&err).to_string()
            }
            Err(_) => {
                tracing::warn!(
                    responder = self.responder.name(),
                    timeout_ms = self.config.response_timeout.as_millis() as u64,
                    "resolution exceeded wait budget, substituting fallback turn"
                );
                TIMEOUT_MESSAGE.to_string()
            }
        };

        let mut state = self.lock_state();
        state.transcript.push(Turn::new(Role::Assistant, reply_text));
        state.pending = false;
        Ok(())
    }

    /// Read-only snapshot of the transcript.
    pub fn history(&self) -> Vec<Turn> {
        self.lock_state().transcript.clone()
    }

    /// Whether a resolution is currently in flight.
    pub fn is_pending(&self) -> bool {
        self.lock_state().pending
    }

    /// The question this session revolves around.
    pub fn question(&self) -> &Question {
        &self.question
    }

    /// Record the student's current draft answer; included as context in
    /// subsequent resolutions.
    pub fn set_student_answer(&self, answer: Option<String>) {
        self.lock_state().student_answer = answer;
    }

    /// Assemble the bounded context window: instruction preamble plus the
    /// last [`CONTEXT_TURNS`] turns, the final one being the utterance
    /// under resolution.
    fn build_prompt(&self, state: &EngineState) -> Prompt {
        let skip = state.transcript.len().saturating_sub(CONTEXT_TURNS);
        let messages = state.transcript[skip..]
            .iter()
            .map(|t| PromptMessage {
                role: t.role,
                content: t.content.clone(),
            })
            .collect();
        Prompt {
            system: build_system_prompt(&self.question, state.student_answer.as_deref()),
            messages,
        }
    }

    // Recover rather than panic if a holder panicked; state mutations are
    // single-field pushes, so the recovered state is always well-formed.
    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
