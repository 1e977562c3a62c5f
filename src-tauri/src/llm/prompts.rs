//! Prompt Selector — task mode → instruction sent with the screenshot.
//!
//! The fixed instructions are product copy, not structure: they can be
//! reworded freely without touching anything else.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "llama-3.2-90b-vision-preview";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TRANSLATE_LANGUAGE: &str = "English";

pub const SUMMARY_PROMPT: &str = "Summarize the content of this screenshot into a concise and clear overview. Make a short answer and go straight to the point. Include the key points or highlights.";

pub const EXPLAIN_PROMPT: &str = "Provide a detailed explanation of the content, focusing on its context, background, and key ideas. Clarify any important terms and explain the significance of the events or concepts mentioned. Avoid describing the screenshot or app interface.";

pub const ANSWER_PROMPT: &str = "Answer the question or provide the information requested in this screenshot. Be concise and clear. Include only the relevant information needed to answer the question or provide the requested information. Do not include any additional information or explanations.";

/// Used when a custom prompt is blank.
pub const GENERIC_PROMPT: &str =
    "Analyze the content of this screenshot and provide relevant insights or actions.";

/// One of the built-in tasks offered by the overlay's buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "lowercase")]
pub enum Task {
    Summary,
    Translate { language: String },
    Explain,
    Answer,
}

/// What the user asked for: a built-in task or their own words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    Fixed(Task),
    Custom(String),
}

impl PromptMode {
    /// Parse the raw mode string sent by the overlay.
    ///
    /// `summary`, `explain`, `answer` and `translate [language]` are tags
    /// (case-insensitive); everything else is the user's own prompt.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (head, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (trimmed, ""),
        };

        let task = match head.to_ascii_lowercase().as_str() {
            "translate" => Some(Task::Translate {
                language: if rest.is_empty() {
                    DEFAULT_TRANSLATE_LANGUAGE.to_string()
                } else {
                    rest.to_string()
                },
            }),
            "summary" if rest.is_empty() => Some(Task::Summary),
            "explain" if rest.is_empty() => Some(Task::Explain),
            "answer" if rest.is_empty() => Some(Task::Answer),
            _ => None,
        };

        match task {
            Some(task) => PromptMode::Fixed(task),
            None => PromptMode::Custom(raw.to_string()),
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> String {
        match self {
            PromptMode::Fixed(Task::Summary) => "summary".to_string(),
            PromptMode::Fixed(Task::Translate { language }) => format!("translate:{}", language),
            PromptMode::Fixed(Task::Explain) => "explain".to_string(),
            PromptMode::Fixed(Task::Answer) => "answer".to_string(),
            PromptMode::Custom(_) => "custom".to_string(),
        }
    }
}

/// Resolve a mode to the instruction string. Pure and deterministic.
pub fn build_prompt(mode: &PromptMode) -> String {
    match mode {
        PromptMode::Fixed(Task::Summary) => SUMMARY_PROMPT.to_string(),
        PromptMode::Fixed(Task::Translate { language }) => format!(
            "Translate the text in this screenshot into {language} exactly, with no rephrasing or modifications. Provide only the translation, without explanations or additional comments."
        ),
        PromptMode::Fixed(Task::Explain) => EXPLAIN_PROMPT.to_string(),
        PromptMode::Fixed(Task::Answer) => ANSWER_PROMPT.to_string(),
        PromptMode::Custom(text) if text.trim().is_empty() => GENERIC_PROMPT.to_string(),
        PromptMode::Custom(text) => format!(
            "The user captured this screenshot and asks:\n\n{text}\n\nRespond using the content of the screenshot. Be concise and clear."
        ),
    }
}

/// `parse` + `build_prompt` for raw overlay input.
pub fn prompt_for(raw_mode: &str) -> String {
    build_prompt(&PromptMode::parse(raw_mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_is_stable() {
        assert_eq!(prompt_for("summary"), prompt_for("summary"));
        assert_eq!(prompt_for("summary"), SUMMARY_PROMPT);
        assert_eq!(prompt_for("  SUMMARY "), SUMMARY_PROMPT);
    }

    #[test]
    fn translate_carries_the_language() {
        assert_eq!(
            PromptMode::parse("translate French"),
            PromptMode::Fixed(Task::Translate {
                language: "French".to_string()
            })
        );
        assert!(prompt_for("translate French").contains("French"));
        assert!(prompt_for("Translate  Brazilian Portuguese").contains("Brazilian Portuguese"));
    }

    #[test]
    fn bare_translate_defaults_to_english() {
        let prompt = prompt_for("translate");
        assert!(prompt.contains("into English"));
    }

    #[test]
    fn each_fixed_tag_maps_to_its_instruction() {
        assert_eq!(prompt_for("explain"), EXPLAIN_PROMPT);
        assert_eq!(prompt_for("answer"), ANSWER_PROMPT);
    }

    #[test]
    fn unknown_mode_is_echoed_verbatim() {
        let raw = "What year was this chart's data collected?";
        assert_eq!(PromptMode::parse(raw), PromptMode::Custom(raw.to_string()));
        assert!(prompt_for(raw).contains(raw));
    }

    #[test]
    fn custom_text_keeps_its_surrounding_whitespace() {
        let raw = "  what does\tthis error mean?\n";
        assert_eq!(PromptMode::parse(raw), PromptMode::Custom(raw.to_string()));
        assert!(prompt_for(raw).contains(raw));
    }

    #[test]
    fn tag_followed_by_text_is_custom() {
        let raw = "explain the second paragraph only";
        assert_eq!(PromptMode::parse(raw), PromptMode::Custom(raw.to_string()));
        assert!(prompt_for(raw).contains(raw));
    }

    #[test]
    fn blank_custom_prompt_uses_generic_instruction() {
        assert_eq!(prompt_for(""), GENERIC_PROMPT);
        assert_eq!(build_prompt(&PromptMode::Custom("   ".into())), GENERIC_PROMPT);
    }

    #[test]
    fn labels_are_short() {
        assert_eq!(PromptMode::parse("translate German").label(), "translate:German");
        assert_eq!(PromptMode::parse("hello").label(), "custom");
    }
}
