//! URL-safe slug generation.

use std::sync::LazyLock;

use regex::Regex;

use crate::{ErrorKind, Result};

/// Matches every maximal run of characters outside `[a-z0-9]`.
static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));

/// Creates a slug from `s`.
///
/// The input is lower-cased, every run of characters outside `[a-z0-9]` is
/// replaced with a single `-`, and leading/trailing hyphens are trimmed.
///
/// # Errors
///
/// - [`ErrorKind::EmptyInput`] when `s` is empty.
/// - [`ErrorKind::EmptyResult`] when nothing survives the transformation,
///   e.g. input made only of symbols or non-Latin script.
pub fn slugify(s: &str) -> Result<String> {
    if s.is_empty() {
        return Err(ErrorKind::EmptyInput.with_message("empty string not permitted"));
    }

    let lowered = s.to_lowercase();
    let slug = NON_SLUG_CHARS.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        return Err(ErrorKind::EmptyResult
            .with_message("after removing characters, slug is zero length"));
    }

    Ok(slug.to_owned())
}
