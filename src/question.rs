//! The active question a tutoring session revolves around.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// One exam question, supplied by the presentation shell as immutable
/// context for every resolution call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub topic: String,
    pub difficulty: String,
    /// Question text with math regions marked up in `$...$` delimiters.
    pub text: String,
    pub answer_type: String,
}

/// The built-in demo question: scientific notation conversion.
pub static DEMO_QUESTION: Lazy<Question> = Lazy::new(|| Question {
    id: "q-sci-0031".to_string(),
    topic: "Scientific Notation".to_string(),
    difficulty: "Foundation".to_string(),
    text: "Convert the number $0.00000000031$ to the form $\\pm a \\times 10^{n}$, \
           where $1 \\leq a < 10$, and $n$ is an integer."
        .to_string(),
    answer_type: "numeric".to_string(),
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{tokenize, SegmentKind};

    #[test]
    fn test_demo_question_has_stable_id() {
        assert_eq!(DEMO_QUESTION.id, "q-sci-0031");
    }

    #[test]
    fn test_demo_question_text_carries_inline_math() {
        let math_count = tokenize(&DEMO_QUESTION.text)
            .iter()
            .filter(|s| s.kind == SegmentKind::Math)
            .count();
        assert_eq!(math_count, 4);
    }

    #[test]
    fn test_demo_question_mentions_target_form() {
        assert!(DEMO_QUESTION.text.contains("10^{n}"));
        assert!(DEMO_QUESTION.text.contains("0.00000000031"));
    }

    #[test]
    fn test_question_serde_roundtrip() {
        let json = serde_json::to_string(&*DEMO_QUESTION).expect("serialize");
        let back: Question = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, *DEMO_QUESTION);
    }
}
