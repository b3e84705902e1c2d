//! Skill Tokenizer: turns free-text skill fields into ordered token lists.
//!
//! Display tokens keep the author's casing; lower-cased keys are used for matching only.

use std::collections::HashSet;

fn is_delimiter(c: char) -> bool {
    matches!(c, ',' | ';' | '/' | '\n')
}

/// Splits on runs of `,` `;` `/` or newline, trims, drops empties.
/// Order and casing are preserved.
pub fn tokenize(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    raw.split(is_delimiter)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lower-cased parallel of [`tokenize`].
pub fn normalize(raw: Option<&str>) -> Vec<String> {
    tokenize(raw).into_iter().map(|t| t.to_lowercase()).collect()
}

/// Parsed skills of one profile or job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSet {
    tokens: Vec<String>,
    keys: Vec<String>,
}

impl SkillSet {
    pub fn parse(raw: Option<&str>) -> Self {
        let tokens = tokenize(raw);
        let keys = tokens.iter().map(|t| t.to_lowercase()).collect();
        Self { tokens, keys }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn key_set(&self) -> HashSet<&str> {
        self.keys.iter().map(String::as_str).collect()
    }

    /// Display tokens whose key is in `keys`, in this set's order, first casing wins.
    pub fn display_for(&self, keys: &HashSet<&str>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut display = Vec::new();
        for (token, key) in self.tokens.iter().zip(&self.keys) {
            if keys.contains(key.as_str()) && seen.insert(key.as_str()) {
                display.push(token.clone());
            }
        }
        display
    }
}
