//! Response resolution strategies.
//!
//! ## Design
//! - `Responder`: the polymorphic seam, one async call in and one reply out
//! - `CannedResponder`: ordered keyword table with first-match-wins, plus a
//!   simulated thinking delay (the demo path)
//! - `RemoteResponder`: forwards the bounded context window to an
//!   OpenAI-style chat-completions endpoint (the production path)
//!
//! The engine never learns which variant it holds; new strategies slot in
//! behind the same trait without touching the state machine.

use std::time::Duration;

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::TutorConfig;
use crate::error::ResponderError;
use crate::question::Question;
use crate::Role;

/// Which resolution strategy a shell should construct.
#[derive(Debug, Clone, ValueEnum, PartialEq)]
pub enum Mode {
    Canned,
    Remote,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Canned => write!(f, "canned"),
            Mode::Remote => write!(f, "remote"),
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt / reply shapes
// ---------------------------------------------------------------------------

/// One prior-conversation entry inside a [`Prompt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

/// The bounded context window handed to a responder: instruction preamble
/// (question context already interpolated) plus the most recent turns,
/// the final one being the utterance under resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub messages: Vec<PromptMessage>,
}

impl Prompt {
    /// The utterance currently being resolved.
    pub fn latest_user_message(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

/// A responder's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub tokens_used: u32,
}

/// A resolution strategy. Exactly one `respond` call happens per accepted
/// utterance; the engine bounds the wait and substitutes a fallback turn
/// on `Err`.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, prompt: &Prompt) -> Result<Reply, ResponderError>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// Fixed texts
// ---------------------------------------------------------------------------

/// Jojo's opening message, seeded into every fresh transcript.
pub const GREETING: &str = "Hi! I'm Jojo, your AI tutor. Need help with this question? \
     Try asking for a hint or the step-by-step solution!";

/// Quick-action literal: identical to the student typing it.
pub const HINT_REQUEST: &str = "Give me a hint";
/// Quick-action literal: identical to the student typing it.
pub const STEPS_REQUEST: &str = "Reveal the steps";

/// Instruction preamble for the remote completion service.
pub const JOJO_SYSTEM_PROMPT: &str = "You are Jojo, a friendly and helpful AI math tutor.

Your role:
- Help students understand math problems without giving away answers immediately
- Provide hints that guide thinking rather than solve directly
- Only reveal full solutions when explicitly asked for \"steps\" or \"solution\"
- Use encouraging, supportive language
- Break down complex concepts into simpler parts

Guidelines:
- For hint requests: Give subtle clues about approach
- For step requests: Provide detailed step-by-step solution
- For questions: Explain concepts clearly with examples
- Always relate back to the current problem
- Use appropriate math notation when helpful

Current problem context will be provided with each request.";

const HINT_RESPONSE: &str = "Here's a hint: think about how many places the decimal point \
     has to move so that exactly one non-zero digit sits in front of it. Since \
     $0.00000000031$ is less than $1$, will your exponent $n$ be positive or negative?";

const STEPS_RESPONSE: &str = "Let's work through it step by step:\n\n\
     1. Keep only the significant digits: $3.1$. That's your $a$, and $1 \\leq 3.1 < 10$ checks out.\n\
     2. Count how many places the decimal point moves to turn $0.00000000031$ into $3.1$: ten places to the right.\n\
     3. Moving right means the number is smaller than $1$, so the exponent is negative: $n = -10$.\n\n\
     $$0.00000000031 = 3.1 \\times 10^{-10}$$\n\n\
     Try entering that in the answer box!";

const DEFAULT_RESPONSE: &str = "Great question! I'm best at helping with the problem in \
     front of you. Try asking for a hint, or ask me to reveal the step-by-step solution.";

/// Build the full instruction preamble for one resolution call.
pub fn build_system_prompt(question: &Question, student_answer: Option<&str>) -> String {
    format!(
        "{}\n\nCurrent Question (ID: {}):\n{}\n\nStudent's Current Answer: {}\n\n\
         Remember: Guide the student's thinking, don't just give answers.",
        JOJO_SYSTEM_PROMPT,
        question.id,
        question.text,
        student_answer.unwrap_or("Not provided yet"),
    )
}

// ---------------------------------------------------------------------------
// Canned responder
// ---------------------------------------------------------------------------

/// Which canned reply a classified utterance maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Hint,
    Steps,
    Default,
}

/// Classify an utterance against the ordered, case-insensitive keyword
/// ruleset. First match wins: hint, then step/solution, then the default.
pub fn classify(utterance: &str) -> ResponseKind {
    let lower = utterance.to_lowercase();
    if lower.contains("hint") {
        ResponseKind::Hint
    } else if lower.contains("step") || lower.contains("solution") {
        ResponseKind::Steps
    } else {
        ResponseKind::Default
    }
}

fn canned_text(kind: ResponseKind) -> &'static str {
    match kind {
        ResponseKind::Hint => HINT_RESPONSE,
        ResponseKind::Steps => STEPS_RESPONSE,
        ResponseKind::Default => DEFAULT_RESPONSE,
    }
}

/// Table-lookup strategy with a simulated thinking delay.
pub struct CannedResponder {
    delay: Duration,
}

impl CannedResponder {
    /// Demo default: 1.5 s of pretend thinking.
    pub fn new() -> Self {
        CannedResponder {
            delay: Duration::from_millis(1500),
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        CannedResponder { delay }
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Responder for CannedResponder {
    async fn respond(&self, prompt: &Prompt) -> Result<Reply, ResponderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let kind = classify(prompt.latest_user_message());
        Ok(Reply {
            text: canned_text(kind).to_string(),
            tokens_used: 0,
        })
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}

// ---------------------------------------------------------------------------
// Remote completion wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionChoice {
    pub message: WireMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionUsage {
    pub total_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    pub usage: Option<ChatCompletionUsage>,
}

// ---------------------------------------------------------------------------
// Remote responder
// ---------------------------------------------------------------------------

/// Forwards the context window to a chat-completions endpoint.
pub struct RemoteResponder {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

impl RemoteResponder {
    /// Build from file config plus the resolved model name. Fails when the
    /// configured API-key environment variable is not set.
    pub fn from_config(config: &TutorConfig, model: String) -> Result<Self, Box<dyn std::error::Error>> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            format!(
                "{} not set. Export it or pass via environment.",
                config.api_key_env
            )
        })?;

        Ok(RemoteResponder {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            presence_penalty: config.presence_penalty,
            frequency_penalty: config.frequency_penalty,
        })
    }

    fn build_request(&self, prompt: &Prompt) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(prompt.messages.len() + 1);
        messages.push(WireMessage {
            role: "system".to_string(),
            content: prompt.system.clone(),
        });
        for m in &prompt.messages {
            messages.push(WireMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            });
        }
        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
        }
    }
}

#[async_trait]
impl Responder for RemoteResponder {
    async fn respond(&self, prompt: &Prompt) -> Result<Reply, ResponderError> {
        let request = self.build_request(prompt);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ResponderError::Unavailable(e.to_string()))?;

        match response.status().as_u16() {
            429 => return Err(ResponderError::RateLimited),
            401 | 403 => return Err(ResponderError::Auth),
            status if !(200..300).contains(&status) => {
                return Err(ResponderError::Unavailable(format!("HTTP {}", status)));
            }
            _ => {}
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ResponderError::Unavailable(e.to_string()))?;

        let tokens_used = parsed.usage.map(|u| u.total_tokens).unwrap_or(0);
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ResponderError::Unavailable("empty completion".to_string()))?;

        Ok(Reply { text, tokens_used })
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
