//! Case-insensitive text matching for terms.

use memchr::memmem;

use super::ast::TextValue;

/// A lowercased needle ready to test against field values.
///
/// Unquoted needles match as substrings. Quoted needles must line up with
/// whitespace (or the ends of the value) on both sides.
#[derive(Debug, Clone)]
pub struct TextNeedle {
    needle: String,
    whole_token: bool,
}

impl TextNeedle {
    pub fn new(value: &TextValue) -> Self {
        Self {
            needle: value.text.to_lowercase(),
            whole_token: value.quoted,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, haystack: &str) -> bool {
        if self.needle.is_empty() {
            return true;
        }

        let lowered = haystack.to_lowercase();
        let finder = memmem::Finder::new(self.needle.as_bytes());
        if !self.whole_token {
            return finder.find(lowered.as_bytes()).is_some();
        }

        finder
            .find_iter(lowered.as_bytes())
            .any(|start| is_token_aligned(&lowered, start, start + self.needle.len()))
    }
}

fn is_token_aligned(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start]
        .chars()
        .next_back()
        .map_or(true, char::is_whitespace);
    let after = text[end..].chars().next().map_or(true, char::is_whitespace);
    before && after
}

/// Field terms name a field by its exact name, ignoring case.
pub fn field_name_matches(query_field: &str, field_name: &str) -> bool {
    query_field.to_lowercase() == field_name.to_lowercase()
}
