/*!
 * Position-based scanning of language files.
 *
 * Language files are never parsed into a tree. Instead a template is scanned
 * into a span list: the ordered key/value occurrences plus the literal text
 * between them. Extraction reads keys and values from the spans, and the
 * regenerator rewrites only the value spans, so whitespace, comments, key
 * order and any unusual syntax survive untouched.
 */

use std::ops::Range;

use indexmap::IndexMap;
use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::LangFormat;

// @const: Quoted key followed by a quoted string value, escape aware
static JSON_PAIR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""((?:[^"\\\n]|\\.)*)"\s*:\s*"((?:[^"\\\n]|\\.)*)""#).unwrap()
});

// @const: One `key = value` line; comment lines never start a key
static LANG_PAIR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)([^#=\s][^=\n]*?)[ \t]*=[ \t]*([^\n]*)$").unwrap()
});

/// One recognized key/value occurrence in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Decoded key
    pub key: String,
    /// Decoded value
    pub value: String,
    /// Byte range of the whole occurrence
    pub range: Range<usize>,
    /// Byte range of the key token (including quotes for JSON)
    pub key_range: Range<usize>,
    /// Byte range of the raw value (inside the quotes for JSON)
    pub value_range: Range<usize>,
    /// Leading indentation (flat format only)
    pub indent: String,
}

/// A piece of a template in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text between recognized spans, copied through verbatim
    Literal(&'a str),
    /// A recognized key/value occurrence
    Pair(&'a Span),
}

/// Ordered list of spans over a borrowed template
#[derive(Debug, Clone)]
pub struct SpanList<'a> {
    text: &'a str,
    format: LangFormat,
    spans: Vec<Span>,
}

impl<'a> SpanList<'a> {
    /// Scan a template with the pattern for its format
    pub fn scan(text: &'a str, format: LangFormat) -> Self {
        let spans = match format {
            LangFormat::Json => scan_json(text),
            LangFormat::Lang => scan_lang(text),
        };
        trace!("Scanned {} {} spans", spans.len(), format);
        Self { text, format, spans }
    }

    /// The scanned template
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Format used for scanning
    pub fn format(&self) -> LangFormat {
        self.format
    }

    /// Recognized spans in document order
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Whether nothing was recognized
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Keys in on-disk order, duplicates reported once at their first position
    pub fn keys(&self) -> Vec<String> {
        let mut seen = IndexMap::new();
        for span in &self.spans {
            seen.entry(span.key.clone()).or_insert(());
        }
        seen.into_keys().collect()
    }

    /// Decoded key → value map; a repeated key keeps its first position and last value
    pub fn pairs(&self) -> IndexMap<String, String> {
        let mut pairs = IndexMap::with_capacity(self.spans.len());
        for span in &self.spans {
            pairs.insert(span.key.clone(), span.value.clone());
        }
        pairs
    }

    /// Literal text and spans interleaved in document order
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::with_capacity(self.spans.len() * 2 + 1);
        let mut cursor = 0;
        for span in &self.spans {
            if span.range.start > cursor {
                segments.push(Segment::Literal(&self.text[cursor..span.range.start]));
            }
            segments.push(Segment::Pair(span));
            cursor = span.range.end;
        }
        if cursor < self.text.len() {
            segments.push(Segment::Literal(&self.text[cursor..]));
        }
        segments
    }

    /// Raw key token of a span as it appears in the template
    pub fn key_token(&self, span: &Span) -> &'a str {
        &self.text[span.key_range.clone()]
    }

    /// Raw text of a whole span
    pub fn raw(&self, span: &Span) -> &'a str {
        &self.text[span.range.clone()]
    }
}

/// Convenience: decoded pairs of a template
pub fn extract_pairs(text: &str, format: LangFormat) -> IndexMap<String, String> {
    SpanList::scan(text, format).pairs()
}

/// Convenience: on-disk key order of a template
pub fn key_order(text: &str, format: LangFormat) -> Vec<String> {
    SpanList::scan(text, format).keys()
}

/// Decode the body of a JSON string literal, keeping the raw text if it is not valid JSON
pub fn decode_json_string(body: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", body)).unwrap_or_else(|_| body.to_string())
}

/// Encode a value as a JSON string literal, including the quotes
pub fn encode_json_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

fn scan_json(text: &str) -> Vec<Span> {
    JSON_PAIR_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let key = caps.get(1)?;
            let value = caps.get(2)?;
            Some(Span {
                key: decode_json_string(key.as_str()),
                value: decode_json_string(value.as_str()),
                range: whole.range(),
                // include the surrounding quotes in the key token
                key_range: key.start() - 1..key.end() + 1,
                value_range: value.range(),
                indent: String::new(),
            })
        })
        .collect()
}

fn scan_lang(text: &str) -> Vec<Span> {
    LANG_PAIR_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let indent = caps.get(1)?;
            let key = caps.get(2)?;
            let value = caps.get(3)?;

            let raw_value = value.as_str();
            let trimmed_value = raw_value.strip_suffix('\r').unwrap_or(raw_value);
            let value_end = value.start() + trimmed_value.len();
            let range_end = whole.end() - (raw_value.len() - trimmed_value.len());

            Some(Span {
                key: key.as_str().to_string(),
                value: trimmed_value.to_string(),
                range: whole.start()..range_end,
                key_range: key.range(),
                value_range: value.start()..value_end,
                indent: indent.as_str().to_string(),
            })
        })
        .collect()
}
