/*!
 * Format-preserving regeneration of language files.
 *
 * The original file text is the template. Only value spans with a provided
 * translation are rewritten; every other byte (comments, blank lines, key
 * order, unusual syntax) is copied through. Regeneration never fails:
 * content the scanner does not recognize is passed through unchanged.
 */

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::lang_file::{Segment, Span, SpanList, encode_json_string};
use crate::model::LangFormat;

/// Rewrite the translated spans of a template
pub fn regenerate(template: &str, format: LangFormat, translations: &IndexMap<String, String>) -> String {
    let normalized = normalize_newlines(template);
    let spans = SpanList::scan(&normalized, format);
    render(&spans, translations)
}

/// Like [`regenerate`], and also append translated keys the template lacks.
///
/// Appended keys follow the order of `translations`.
pub fn regenerate_robust(
    template: &str,
    format: LangFormat,
    translations: &IndexMap<String, String>,
) -> String {
    let normalized = normalize_newlines(template);
    let spans = SpanList::scan(&normalized, format);
    let rendered = render(&spans, translations);

    let present: HashSet<&str> = spans.spans().iter().map(|span| span.key.as_str()).collect();
    let missing: Vec<(&String, &String)> = translations
        .iter()
        .filter(|(key, value)| !present.contains(key.as_str()) && !value.is_empty())
        .collect();

    if missing.is_empty() {
        return rendered;
    }
    debug!("Appending {} keys missing from the template", missing.len());

    match format {
        LangFormat::Json => append_json(rendered, &missing),
        LangFormat::Lang => append_lang(rendered, &missing),
    }
}

/// Convert `\r\n` and lone `\r` line endings to `\n`
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn render(spans: &SpanList<'_>, translations: &IndexMap<String, String>) -> String {
    let mut out = String::with_capacity(spans.text().len());

    for segment in spans.segments() {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Pair(span) => match translations.get(&span.key).filter(|value| !value.is_empty()) {
                Some(value) => out.push_str(&rewrite_span(spans, span, value)),
                None => out.push_str(spans.raw(span)),
            },
        }
    }

    out
}

fn rewrite_span(spans: &SpanList<'_>, span: &Span, value: &str) -> String {
    match spans.format() {
        LangFormat::Json => format!("{}:{}", spans.key_token(span), encode_json_string(value)),
        LangFormat::Lang => format!("{}{} = {}", span.indent, span.key, flatten_lang_value(value)),
    }
}

fn append_json(rendered: String, missing: &[(&String, &String)]) -> String {
    let entries: Vec<String> = missing
        .iter()
        .map(|(key, value)| format!("\n  {}: {}", encode_json_string(key), encode_json_string(value)))
        .collect();

    let Some(close) = rendered.rfind('}') else {
        if rendered.trim().is_empty() {
            return format!("{{{}\n}}\n", entries.join(","));
        }
        warn!(
            "Template has no closing brace, skipping {} missing keys",
            missing.len()
        );
        return rendered;
    };

    let head = rendered[..close].trim_end();
    let separator = match head.chars().last() {
        Some('{') | Some(',') => "",
        _ => ",",
    };

    format!(
        "{}{}{}\n{}",
        head,
        separator,
        entries.join(","),
        &rendered[close..]
    )
}

fn append_lang(mut rendered: String, missing: &[(&String, &String)]) -> String {
    if !rendered.is_empty() && !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    for (key, value) in missing {
        rendered.push_str(&format!("{} = {}\n", key, flatten_lang_value(value)));
    }
    rendered
}

// the flat format is line based
fn flatten_lang_value(value: &str) -> String {
    value.replace('\n', "\\n")
}
