//! Prompt templates.
//!
//! Every style maps to one instruction template. Presets with a dedicated
//! template use it, other presets (regional dialects) share the dialect
//! template, and anything outside the catalog gets the custom-style template.
//! Templates may contain a `{style}` placeholder.

use gateway_core::PresetStyleCatalog;
use std::collections::HashMap;

/// System-level framing shared by every provider
pub const SYSTEM_INSTRUCTION: &str = "You are a document conversion specialist. \
Convert the text into the requested style while preserving its original meaning and \
information accurately, producing natural, readable output.";

const STYLE_PLACEHOLDER: &str = "{style}";

const DIALECT_TEMPLATE: &str = "Rewrite the following text in the {style}, keeping its \
meaning unchanged and using natural expressions of that dialect.";

const CUSTOM_TEMPLATE: &str = "Convert the following text into the style \"{style}\", \
keeping its meaning unchanged.";

const DEDICATED_TEMPLATES: [(&str, &str); 6] = [
    (
        "summary",
        "Summarize the following text concisely, keeping its key points.",
    ),
    (
        "bullet-list",
        "Reorganize the following text as a clear, well-structured bullet-point list.",
    ),
    (
        "english",
        "Translate the following text into natural, fluent English.",
    ),
    (
        "keigo",
        "Rewrite the following text in polite Japanese honorific language (keigo) \
suitable for business correspondence.",
    ),
    (
        "casual",
        "Rewrite the following text in a casual, friendly tone.",
    ),
    (
        "formal",
        "Rewrite the following text in a formal, professional tone.",
    ),
];

/// System and user messages for chat-style providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    /// System message
    pub system: String,
    /// User message: instruction, blank line, content
    pub user: String,
}

/// Style-to-instruction mapping
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    system: String,
    dedicated: HashMap<String, String>,
    presets: PresetStyleCatalog,
    dialect: String,
    custom: String,
}

impl PromptTemplates {
    /// Built-in templates for the given catalog
    #[must_use]
    pub fn new(presets: PresetStyleCatalog) -> Self {
        Self {
            system: SYSTEM_INSTRUCTION.to_string(),
            dedicated: DEDICATED_TEMPLATES
                .iter()
                .map(|(style, template)| ((*style).to_string(), (*template).to_string()))
                .collect(),
            presets,
            dialect: DIALECT_TEMPLATE.to_string(),
            custom: CUSTOM_TEMPLATE.to_string(),
        }
    }

    /// Replace or add per-style templates
    #[must_use]
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (style, template) in overrides {
            self.dedicated.insert(style.clone(), template.clone());
        }
        self
    }

    /// Instruction for `style`, with the placeholder filled in
    #[must_use]
    pub fn instruction(&self, style: &str) -> String {
        let template = match self.dedicated.get(style) {
            Some(template) => template,
            None if self.presets.contains(style) => &self.dialect,
            None => &self.custom,
        };
        template.replace(STYLE_PLACEHOLDER, style)
    }

    /// Prompt for providers with separate system and user messages
    #[must_use]
    pub fn chat_prompt(&self, content: &str, style: &str) -> ChatPrompt {
        ChatPrompt {
            system: self.system.clone(),
            user: format!("{}\n\n{content}", self.instruction(style)),
        }
    }

    /// Prompt for providers taking a single text part
    #[must_use]
    pub fn single_prompt(&self, content: &str, style: &str) -> String {
        format!(
            "{}\n\n{}\n\n[Text to convert]\n{content}",
            self.system,
            self.instruction(style)
        )
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::new(PresetStyleCatalog::default())
    }
}
