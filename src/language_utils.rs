use anyhow::{Result, anyhow};
use isolang::Language;

/// Script and locale utilities
///
/// This module classifies text by script (Latin letters, CJK ideographs) for
/// the translation validity check, and validates and names game locale codes
/// such as `en_us` or `zh_cn`.

/// Check whether a character is a Latin letter (basic, Latin-1 and Extended-A/B)
pub fn is_latin_letter(c: char) -> bool {
    if c.is_ascii_alphabetic() {
        return true;
    }
    matches!(c, '\u{00C0}'..='\u{024F}') && c != '\u{00D7}' && c != '\u{00F7}'
}

/// Check whether a character is a CJK unified or compatibility ideograph
pub fn is_cjk_ideograph(c: char) -> bool {
    matches!(
        c,
        '\u{4E00}'..='\u{9FFF}'
            | '\u{3400}'..='\u{4DBF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{20000}'..='\u{2A6DF}'
            | '\u{2A700}'..='\u{2EBEF}'
            | '\u{2F800}'..='\u{2FA1F}'
            | '\u{30000}'..='\u{3134F}'
    )
}

/// Whether the text contains at least one Latin letter
pub fn contains_latin(text: &str) -> bool {
    text.chars().any(is_latin_letter)
}

/// Whether the text contains at least one CJK ideograph
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk_ideograph)
}

/// Validity check applied to every translation candidate.
///
/// A candidate is accepted when it is non-empty after trimming and either
/// contains a CJK ideograph or contains no Latin letters at all. Anything with
/// Latin letters but no ideographs is an untranslated copy.
pub fn is_valid_translation(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return false;
    }
    contains_cjk(trimmed) || !contains_latin(trimmed)
}

/// Normalize a game locale code (`zh_CN`, `zh-cn`) to the lowercase underscore form
pub fn normalize_locale(code: &str) -> String {
    code.trim().to_lowercase().replace('-', "_")
}

/// Validate a game locale code of the form `ll_rr`
pub fn validate_locale(code: &str) -> Result<()> {
    let normalized = normalize_locale(code);
    let (language, region) = normalized
        .split_once('_')
        .ok_or_else(|| anyhow!("Invalid locale code: {}", code))?;

    if region.is_empty() || !region.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(anyhow!("Invalid locale region in: {}", code));
    }

    if Language::from_639_1(language).is_none() && Language::from_639_3(language).is_none() {
        return Err(anyhow!("Invalid locale language in: {}", code));
    }

    Ok(())
}

/// Get a human readable language name for a locale, used in translation prompts
pub fn locale_display_name(code: &str) -> Result<String> {
    let normalized = normalize_locale(code);
    let language = normalized.split('_').next().unwrap_or_default();

    let lang = Language::from_639_1(language)
        .or_else(|| Language::from_639_3(language))
        .ok_or_else(|| anyhow!("Unknown language in locale: {}", code))?;

    let name = match normalized.as_str() {
        "zh_cn" | "zh_sg" => "Simplified Chinese".to_string(),
        "zh_tw" | "zh_hk" => "Traditional Chinese".to_string(),
        _ => lang.to_name().to_string(),
    };

    Ok(name)
}
