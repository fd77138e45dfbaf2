use thiserror::Error;

/// Why a submission was turned away at the door.
///
/// Both variants are caller-recoverable: the transcript is untouched and the
/// caller may simply try again (after typing something, or after the pending
/// response lands).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// The utterance was empty after trimming whitespace.
    #[error("Message is required")]
    EmptyInput,
    /// A response is already in flight; one question at a time.
    #[error("Jojo is still thinking, one question at a time")]
    Busy,
}

/// Failures surfaced by a responder during resolution.
///
/// None of these escape the engine: each is converted into a fallback
/// assistant turn carrying the matching user-visible apology.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponderError {
    /// The completion service replied HTTP 429.
    #[error("completion service rate limit exceeded")]
    RateLimited,
    /// The completion service rejected our credentials (401/403).
    #[error("completion service rejected credentials")]
    Auth,
    /// Transport failure, non-2xx status, or an empty completion.
    #[error("completion service unavailable: {0}")]
    Unavailable(String),
}

/// Strict-mode tokenizer failure.
///
/// The default tokenizer never produces this; it falls back to literal
/// text at the orphan marker instead. See [`crate::segment::tokenize_strict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MarkupError {
    /// An opening `$` or `$$` with no matching close.
    #[error("unterminated math delimiter at byte {offset}")]
    UnterminatedDelimiter { offset: usize },
}

/// User-visible apology substituted when resolution fails.
///
/// Rate limiting gets its own message so the student knows to wait; every
/// other failure (auth, outage, timeout) collapses into one generic retry
/// prompt.
pub fn fallback_message(err: &ResponderError) -> &'static str {
    match err {
        ResponderError::RateLimited => "Too many requests. Please wait a moment and ask me again.",
        ResponderError::Auth | ResponderError::Unavailable(_) => {
            "I'm having trouble generating a response. Please try again."
        }
    }
}

/// Apology used when the responder exceeds its wait budget.
pub const TIMEOUT_MESSAGE: &str = "I'm having trouble generating a response. Please try again.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_reason_display_empty_input() {
        assert_eq!(RejectReason::EmptyInput.to_string(), "Message is required");
    }

    #[test]
    fn test_reject_reason_display_busy() {
        let s = RejectReason::Busy.to_string();
        assert!(s.contains("one question at a time"), "unexpected: {}", s);
    }

    #[test]
    fn test_responder_error_display_rate_limited() {
        let s = ResponderError::RateLimited.to_string();
        assert!(s.contains("rate limit"), "unexpected: {}", s);
    }

    #[test]
    fn test_responder_error_display_unavailable_carries_detail() {
        let err = ResponderError::Unavailable("connection refused".to_string());
        let s = err.to_string();
        assert!(s.contains("unavailable"), "unexpected: {}", s);
        assert!(s.contains("connection refused"), "detail missing: {}", s);
    }

    #[test]
    fn test_markup_error_display_contains_offset() {
        let err = MarkupError::UnterminatedDelimiter { offset: 17 };
        assert!(err.to_string().contains("17"));
    }

    #[test]
    fn test_errors_are_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&RejectReason::Busy);
        assert_error(&ResponderError::RateLimited);
        assert_error(&MarkupError::UnterminatedDelimiter { offset: 0 });
    }

    #[test]
    fn test_fallback_message_rate_limited_mentions_waiting() {
        let msg = fallback_message(&ResponderError::RateLimited);
        assert!(msg.contains("wait"), "unexpected: {}", msg);
    }

    #[test]
    fn test_fallback_message_generic_for_auth_and_unavailable() {
        let auth = fallback_message(&ResponderError::Auth);
        let unavailable = fallback_message(&ResponderError::Unavailable("x".to_string()));
        assert_eq!(auth, unavailable);
        assert_eq!(auth, TIMEOUT_MESSAGE);
    }

    #[test]
    fn test_reject_reason_is_copy_and_eq() {
        let a = RejectReason::Busy;
        let b = a;
        assert_eq!(a, b);
        assert_ne!(RejectReason::Busy, RejectReason::EmptyInput);
    }
}
