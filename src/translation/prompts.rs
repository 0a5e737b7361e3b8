/*!
 * Prompt templates for game text translation.
 *
 * A request is one user message: the rendered instructions, a blank line,
 * then the JSON index map to translate on the final line, so the answer can
 * be matched back by index.
 */

use indexmap::IndexMap;

/// Instruction template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default instructions for game mod text.
    pub const GAME_TEXT_TRANSLATOR: &'static str = r#"You translate user interface text from Minecraft mods from {source_language} into {target_language}.

## Input
The last line of this message is a JSON object mapping numeric indices to source strings.

## Output Requirements
- Return ONLY a JSON object with exactly the same indices
- Every value must be the {target_language} translation of the source string with that index
- Do not include any text outside the JSON structure

## Preservation Rules
- Keep formatting codes such as §a, §l and §r exactly where they are
- Keep placeholders such as %s, %d, %1$s and {0} unchanged
- Keep escape sequences such as \n unchanged
- Keep proper names of mods, items and characters when there is no established translation"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default game text template.
    pub fn game_text_translator() -> Self {
        Self::new(Self::GAME_TEXT_TRANSLATOR)
    }

    /// Render the template with the given variables.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

impl PromptTemplate {
    /// Full user message: instructions followed by the index map of `texts`
    pub fn compose<S: AsRef<str>>(&self, source_language: &str, target_language: &str, texts: &[S]) -> String {
        format!(
            "{}\n\n{}",
            self.render(source_language, target_language).trim_end(),
            build_payload(texts)
        )
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::game_text_translator()
    }
}

/// Index map payload; indices start at 0. Always a single line.
pub fn build_payload<S: AsRef<str>>(texts: &[S]) -> String {
    let map: IndexMap<String, &str> = texts
        .iter()
        .enumerate()
        .map(|(index, text)| (index.to_string(), text.as_ref()))
        .collect();
    serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string())
}
