//! Math-aware segment tokenizer.
//!
//! Splits free text into an ordered sequence of plain-text and math
//! segments. Block math is delimited by `$$...$$` (contents may span
//! lines), inline math by `$...$` (contents may not contain `$`). Both
//! match non-greedily to the nearest closing delimiter, and block is tried
//! before inline at every `$` so a doubled marker is never half-consumed
//! by the inline pattern.

use serde::Serialize;

use crate::error::MarkupError;

/// What a segment holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Text,
    Math,
}

/// How a math segment should be laid out. Meaningful only when
/// `kind == Math`; text segments carry `Inline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MathDisplay {
    Inline,
    Block,
}

/// One classified span of the input.
///
/// `content` is the render-ready payload: verbatim for text, delimiter-
/// stripped and whitespace-trimmed for math. `raw` is the exact source
/// span (delimiters included), so concatenating `raw` across a tokenized
/// sequence reproduces the input byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub content: String,
    pub display: MathDisplay,
    pub raw: String,
}

impl Segment {
    fn text(raw: &str) -> Self {
        Segment {
            kind: SegmentKind::Text,
            content: raw.to_string(),
            display: MathDisplay::Inline,
            raw: raw.to_string(),
        }
    }

    fn math(raw: &str, inner: &str, display: MathDisplay) -> Self {
        Segment {
            kind: SegmentKind::Math,
            content: inner.trim().to_string(),
            display,
            raw: raw.to_string(),
        }
    }

    pub fn is_math(&self) -> bool {
        self.kind == SegmentKind::Math
    }
}

/// Split `text` into text/math segments.
///
/// An empty input yields an empty sequence. An unterminated delimiter is
/// not an error here: everything from the orphan marker onward is emitted
/// as literal text. Use [`tokenize_strict`] to reject such input instead.
pub fn tokenize(text: &str) -> Vec<Segment> {
    scan(text).0
}

/// Like [`tokenize`], but an unterminated delimiter is a [`MarkupError`]
/// carrying the byte offset of the orphan marker.
pub fn tokenize_strict(text: &str) -> Result<Vec<Segment>, MarkupError> {
    match scan(text) {
        (_, Some(offset)) => Err(MarkupError::UnterminatedDelimiter { offset }),
        (segments, None) => Ok(segments),
    }
}

/// Re-assemble the original input from a tokenized sequence.
pub fn rejoin(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.raw.as_str()).collect()
}

/// Single left-to-right pass. Returns the segments (literal-fallback
/// policy applied) and the byte offset of the first unterminated marker,
/// if any.
fn scan(text: &str) -> (Vec<Segment>, Option<usize>) {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }

        // Block takes priority over inline at the same start position.
        if i + 1 < bytes.len() && bytes[i + 1] == b'$' {
            if let Some(close) = find_from(text, i + 2, "$$") {
                if literal_start < i {
                    segments.push(Segment::text(&text[literal_start..i]));
                }
                segments.push(Segment::math(
                    &text[i..close + 2],
                    &text[i + 2..close],
                    MathDisplay::Block,
                ));
                i = close + 2;
                literal_start = i;
                continue;
            }
            // No closing `$$`: fall through and let the inline pattern
            // try the leading `$` (so `$$` alone is empty inline math).
        }

        if let Some(close) = find_from(text, i + 1, "$") {
            if literal_start < i {
                segments.push(Segment::text(&text[literal_start..i]));
            }
            segments.push(Segment::math(
                &text[i..close + 1],
                &text[i + 1..close],
                MathDisplay::Inline,
            ));
            i = close + 1;
            literal_start = i;
            continue;
        }

        // Orphan marker: literal text from here onward.
        if literal_start < bytes.len() {
            segments.push(Segment::text(&text[literal_start..]));
        }
        return (segments, Some(i));
    }

    if literal_start < bytes.len() {
        segments.push(Segment::text(&text[literal_start..]));
    }
    (segments, None)
}

/// `str::find` starting at a byte offset, returning an absolute offset.
fn find_from(text: &str, start: usize, needle: &str) -> Option<usize> {
    if start > text.len() {
        return None;
    }
    text[start..].find(needle).map(|p| p + start)
}
