//! Preset style catalog and style resolution.

use serde::{Deserialize, Serialize};

/// Minimum input length (in characters) for substring matching
const MIN_PARTIAL_MATCH_LEN: usize = 2;

/// Ordered, immutable set of known style names.
///
/// Order matters: when several presets match a partial input, the first wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetStyleCatalog {
    styles: Vec<String>,
}

/// Outcome of resolving a caller-supplied style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStyle {
    /// Preset name, or the truncated custom style
    pub name: String,
    /// Whether `name` came from the catalog
    pub is_preset: bool,
}

impl PresetStyleCatalog {
    /// Build a catalog from style names, dropping blanks and duplicates
    pub fn new<I, S>(styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for style in styles {
            let style = style.into().trim().to_string();
            if !style.is_empty() && !out.contains(&style) {
                out.push(style);
            }
        }
        Self { styles: out }
    }

    /// Whether `style` is exactly one of the presets
    #[must_use]
    pub fn contains(&self, style: &str) -> bool {
        self.styles.iter().any(|s| s == style)
    }

    /// Iterate presets in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.styles.iter().map(String::as_str)
    }

    /// Number of presets
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Resolve a caller-supplied style.
    ///
    /// Exact case-insensitive match wins. Otherwise, for inputs of at least two
    /// characters, the first preset that contains the input or is contained by
    /// it wins. Anything else is a custom style, truncated to `max_custom_len`
    /// characters.
    #[must_use]
    pub fn resolve(&self, input: &str, max_custom_len: usize) -> ResolvedStyle {
        let trimmed = input.trim();
        let lower = trimmed.to_lowercase();

        if let Some(preset) = self.styles.iter().find(|s| s.to_lowercase() == lower) {
            return ResolvedStyle::preset(preset);
        }

        if lower.chars().count() >= MIN_PARTIAL_MATCH_LEN {
            let partial = self.styles.iter().find(|s| {
                let preset = s.to_lowercase();
                preset.contains(&lower) || lower.contains(&preset)
            });
            if let Some(preset) = partial {
                return ResolvedStyle::preset(preset);
            }
        }

        ResolvedStyle {
            name: trimmed.chars().take(max_custom_len).collect(),
            is_preset: false,
        }
    }
}

impl ResolvedStyle {
    fn preset(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_preset: true,
        }
    }
}
