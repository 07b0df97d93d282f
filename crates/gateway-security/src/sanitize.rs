//! Input sanitization utilities.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Anything shaped like a markup tag.
#[allow(clippy::expect_used)]
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Remove every `<...>` tag-shaped substring and trim the result.
#[must_use]
pub fn strip_html(input: &str) -> String {
    HTML_TAG.replace_all(input, "").trim().to_string()
}

/// Case-insensitive patterns whose presence rejects a request outright
#[derive(Debug, Clone, Default)]
pub struct DangerousPatterns {
    patterns: Vec<Regex>,
}

impl DangerousPatterns {
    /// Compile patterns case-insensitively.
    ///
    /// # Errors
    /// Returns the first pattern that fails to compile.
    pub fn compile<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| RegexBuilder::new(p.as_ref()).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// First pattern matching `input`, if any
    #[must_use]
    pub fn find(&self, input: &str) -> Option<&Regex> {
        self.patterns.iter().find(|p| p.is_match(input))
    }

    /// Whether any pattern matches `input`
    #[must_use]
    pub fn is_match(&self, input: &str) -> bool {
        self.find(input).is_some()
    }

    /// Number of compiled patterns
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether no patterns are configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
