//! Category Slug
//!
//! URL-safe identifier derived from a category name: lower-case ASCII
//! letters, digits and single hyphens, never starting or ending with a
//! hyphen. Accented letters are transliterated by dropping their
//! combining marks (`"Fogões a Gás"` becomes `"fogoes-a-gas"`).

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from free text. `None` when nothing usable remains.
    pub fn derive(text: &str) -> Option<Self> {
        let mut slug = String::with_capacity(text.len());
        let mut pending_hyphen = false;

        for c in text
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
        {
            match c {
                'a'..='z' | '0'..='9' => {
                    if pending_hyphen && !slug.is_empty() {
                        slug.push('-');
                    }
                    pending_hyphen = false;
                    slug.push(c);
                }
                '-' => pending_hyphen = true,
                c if c.is_whitespace() => pending_hyphen = true,
                _ => {}
            }
        }

        if slug.is_empty() { None } else { Some(Self(slug)) }
    }

    /// Accept a caller-supplied slug only if it is already canonical
    pub fn parse(value: &str) -> Result<Self, &'static str> {
        let value = value.trim();
        if value.is_empty() {
            return Err("Slug cannot be empty");
        }

        match Self::derive(value) {
            Some(slug) if slug.0 == value => Ok(slug),
            _ => Err("Slug may only contain lowercase letters, numbers and single hyphens"),
        }
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
