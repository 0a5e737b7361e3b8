/*!
 * Reconciliation of model answers with the request.
 *
 * The request carries an index → text map; the answer should be a JSON
 * object with the same indices. Answers are frequently wrapped in a code
 * fence, cover only some indices, carry non-string values or are refusals
 * in prose. None of these is an error: every index simply either has a
 * usable translation or not, and the share of matched indices is the
 * confidence of the answer.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// @const: Fenced block, optionally tagged with a language
static FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\n?(.*?)```").unwrap());

// @const: Typical refusal phrasing
static APOLOGY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(sorry|apolog|unable to|cannot|can't|as an ai)").unwrap()
});

/// Parsed answer for one request
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    /// Translation per request index, `None` where the answer had nothing usable
    pub translations: Vec<Option<String>>,
    /// Share of indices with a usable translation, 0.0 to 1.0
    pub confidence: f64,
    /// The answer looked like a refusal
    pub apology: bool,
}

impl ParsedResponse {
    /// Number of matched indices
    pub fn matched(&self) -> usize {
        self.translations.iter().filter(|t| t.is_some()).count()
    }
}

/// Parse an answer expected to cover indices `0..expected`
pub fn parse_response(text: &str, expected: usize) -> ParsedResponse {
    let body = strip_fence(text);
    let object = json_object(body);

    let translations: Vec<Option<String>> = (0..expected)
        .map(|index| {
            object
                .as_ref()
                .and_then(|map| map.get(&index.to_string()))
                .and_then(Value::as_str)
                .filter(|value| !value.trim().is_empty())
                .map(str::to_string)
        })
        .collect();

    let matched = translations.iter().filter(|t| t.is_some()).count();
    let confidence = if expected == 0 {
        1.0
    } else {
        matched as f64 / expected as f64
    };
    let apology = object.is_none() && APOLOGY_REGEX.is_match(text);

    if object.is_none() {
        debug!(
            "Answer is not an index map{}",
            if apology { " (refusal)" } else { "" }
        );
    }

    ParsedResponse {
        translations,
        confidence,
        apology,
    }
}

/// Body of the first code fence, or the trimmed text when there is none
pub fn strip_fence(text: &str) -> &str {
    FENCE_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str().trim())
        .unwrap_or_else(|| text.trim())
}

fn json_object(body: &str) -> Option<serde_json::Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        return Some(map);
    }

    // tolerate prose around the object
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&body[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
