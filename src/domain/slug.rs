//! Deterministic, URL-safe slugs derived from titles.
//!
//! Slugs are lowercase ASCII with every run of non-alphanumeric characters
//! collapsed to a single `-` and no leading or trailing `-`. Non-ASCII letters
//! are transliterated by the `slug` crate (`"Æúű"` → `"aeuu"`).

use slug::slugify;
use thiserror::Error;

/// Errors that can occur while generating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
}

/// Derive a slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(input);
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Derive a slug from `title`, falling back to a slug of `fallback` (usually the entry id).
pub fn slug_or_fallback(title: &str, fallback: &str) -> String {
    derive_slug(title)
        .or_else(|_| derive_slug(fallback))
        .unwrap_or_else(|_| fallback.to_string())
}
