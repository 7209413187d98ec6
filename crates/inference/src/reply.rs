//! The structured reply contract.
//!
//! The agent instructs the model to answer with a JSON object:
//! `{"response": ..., "action_needed": "none"|"create_ticket"|"escalate",
//! "confidence": 0-1}`. Models wrap JSON in markdown fences, prepend
//! prose, or ignore the contract entirely, so parsing is tolerant:
//! fences are stripped, the outermost `{...}` slice is tried, and when
//! nothing parses the raw text becomes the response with conservative
//! defaults. Parsing never fails.

use serde::{Deserialize, Serialize};

/// What the model asked the workflow to do next. Unrecognized values
/// read as `None`, so a confused model cannot trigger side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyAction {
    None,
    CreateTicket,
    Escalate,
}

/// A parsed model reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredReply {
    pub response: String,
    pub action_needed: ReplyAction,
    pub confidence: f32,
}

/// Confidence reported when the reply followed the contract but left
/// the field out.
const DEFAULT_CONFIDENCE: f32 = 0.7;

/// Confidence reported when the reply ignored the contract entirely.
const FALLBACK_CONFIDENCE: f32 = 0.6;

/// How much of a free-text reply survives the fallback path.
const FALLBACK_TRUNCATE_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
struct RawReply {
    response: Option<String>,
    action_needed: Option<String>,
    confidence: Option<f32>,
}

/// Parse a model completion into a [`StructuredReply`].
pub fn parse_reply(text: &str) -> StructuredReply {
    let candidate = strip_fences(text);

    if let Some(object) = outer_object(candidate)
        && let Ok(raw) = serde_json::from_str::<RawReply>(object)
    {
        return StructuredReply {
            response: raw
                .response
                .unwrap_or_else(|| truncate(text.trim(), FALLBACK_TRUNCATE_CHARS)),
            action_needed: match raw.action_needed.as_deref() {
                Some("create_ticket") => ReplyAction::CreateTicket,
                Some("escalate") => ReplyAction::Escalate,
                _ => ReplyAction::None,
            },
            confidence: raw.confidence.unwrap_or(DEFAULT_CONFIDENCE).clamp(0.0, 1.0),
        };
    }

    StructuredReply {
        response: truncate(text.trim(), FALLBACK_TRUNCATE_CHARS),
        action_needed: ReplyAction::None,
        confidence: FALLBACK_CONFIDENCE,
    }
}

/// Pull the contents out of the first ```-fenced block, dropping an
/// optional `json` language tag. Text without fences passes through.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_open) = trimmed.split_once("```").map(|(_, rest)| rest) else {
        return trimmed;
    };
    let inner = match after_open.split_once("```") {
        Some((inner, _)) => inner,
        None => after_open,
    };
    let inner = inner.trim();
    inner.strip_prefix("json").map(str::trim).unwrap_or(inner)
}

/// The slice from the first `{` to the last `}`, if both exist in order.
fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
